//! Skill normalization: deterministic string cleanup plus a fixed synonym table.
//!
//! Every comparison in the scorer goes through `canonical_skill`, so two spellings
//! of the same skill ("JS", "JavaScript (ES6)", "javascript") compare equal.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Canonical skill → accepted aliases. Aliases are written in normalized form.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("javascript", &["js", "ecmascript", "es6", "es2015", "vanilla js"]),
    ("typescript", &["ts"]),
    ("python", &["python3", "py"]),
    ("go", &["golang"]),
    ("c++", &["cpp", "c plus plus"]),
    ("c#", &["csharp", "c sharp"]),
    (".net", &["dotnet", ".net core", "dot net"]),
    ("node.js", &["node", "nodejs", "node js"]),
    ("react", &["reactjs", "react.js", "react js"]),
    ("vue", &["vuejs", "vue.js"]),
    ("angular", &["angularjs", "angular.js"]),
    ("next.js", &["nextjs"]),
    ("express", &["expressjs", "express.js"]),
    ("postgresql", &["postgres", "psql", "postgre sql"]),
    ("mysql", &["my sql"]),
    ("mongodb", &["mongo"]),
    ("kubernetes", &["k8s", "kube"]),
    ("aws", &["amazon web services"]),
    ("gcp", &["google cloud", "google cloud platform"]),
    ("azure", &["microsoft azure"]),
    ("machine learning", &["ml"]),
    ("artificial intelligence", &["ai"]),
    ("natural language processing", &["nlp"]),
    ("deep learning", &["dl"]),
    (
        "ci/cd",
        &[
            "cicd",
            "ci cd",
            "continuous integration",
            "continuous delivery",
            "continuous deployment",
        ],
    ),
    (
        "rest api",
        &["rest", "restful", "restful api", "rest apis", "restful apis"],
    ),
    ("graphql", &["gql"]),
    ("html", &["html5"]),
    ("css", &["css3"]),
    ("sql", &["structured query language"]),
    ("nosql", &["no sql"]),
    ("scikit-learn", &["sklearn", "scikit learn"]),
    ("tensorflow", &["tf"]),
    ("pytorch", &["torch"]),
    (
        "object-oriented programming",
        &["oop", "object oriented programming"],
    ),
    (
        "data structures and algorithms",
        &[
            "dsa",
            "data structures & algorithms",
            "algorithms and data structures",
        ],
    ),
    ("microsoft excel", &["excel", "ms excel"]),
    ("power bi", &["powerbi"]),
    ("linux", &["gnu/linux"]),
    ("agile", &["agile methodology", "agile methodologies"]),
    ("communication", &["communication skills"]),
];

static ALIAS_TO_CANONICAL: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (canonical, aliases) in SYNONYMS {
        for alias in aliases.iter() {
            map.insert(*alias, *canonical);
        }
    }
    map
});

static CANONICAL_TO_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| SYNONYMS.iter().copied().collect());

/// Shortest term (in alphanumeric chars) searched for as a free-text mention.
/// Two-letter words like "go" or "ai" occur too often in prose to be evidence.
const MIN_MENTION_LEN: usize = 3;

/// Lowercases, strips qualifiers and version numbers, and collapses whitespace.
///
/// `"Python 3.11"` → `"python"`, `"JavaScript (ES6)"` → `"javascript"`,
/// `"node_js"` → `"node js"`, `"C++"` → `"c++"`.
pub fn normalize_skill(raw: &str) -> String {
    let lowered = strip_parenthesized(&raw.to_lowercase()).replace('_', " ");

    let mut tokens: Vec<&str> = lowered
        .split_whitespace()
        .map(trim_token)
        .filter(|t| !t.is_empty())
        .collect();

    while tokens.len() > 1 && tokens.last().is_some_and(|t| is_version_token(t)) {
        tokens.pop();
    }

    tokens.join(" ")
}

/// Normalized form mapped through the synonym table.
pub fn canonical_skill(raw: &str) -> String {
    let normalized = normalize_skill(raw);
    match ALIAS_TO_CANONICAL.get(normalized.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => normalized,
    }
}

/// True when both spellings resolve to the same canonical skill.
pub fn is_synonym(a: &str, b: &str) -> bool {
    let a = canonical_skill(a);
    !a.is_empty() && a == canonical_skill(b)
}

/// The canonical form plus every alias, for free-text searches.
pub fn surface_forms(canonical: &str) -> Vec<&str> {
    let mut forms = vec![canonical];
    if let Some(aliases) = CANONICAL_TO_ALIASES.get(canonical) {
        forms.extend(aliases.iter().copied());
    }
    forms
}

/// Case-insensitive whole-term search. A boundary is any non-alphanumeric
/// char, except that `+` and `#` after the term extend it ("c" does not match "c++").
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();

    haystack.match_indices(&term).any(|(start, matched)| {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[start + matched.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric() && c != '+' && c != '#');
        before_ok && after_ok
    })
}

/// Whether `text` mentions the skill under its canonical name or any alias.
pub fn mentions_skill(text: &str, canonical: &str) -> bool {
    surface_forms(canonical)
        .into_iter()
        .filter(|form| form.chars().filter(|c| c.is_alphanumeric()).count() >= MIN_MENTION_LEN)
        .any(|form| contains_term(text, form))
}

fn strip_parenthesized(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Trims punctuation around a token but keeps `+`/`#` suffixes and a leading `.`.
fn trim_token(token: &str) -> &str {
    let keep_inner = |c: char| c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '/' | '&' | '-');
    let token = token.trim_matches(|c: char| !keep_inner(c));
    let token = token.trim_end_matches(['.', '/', '-']);
    token.trim_start_matches(['/', '-'])
}

fn is_version_token(token: &str) -> bool {
    let digits = token.strip_prefix('v').unwrap_or(token);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.' || c == 'x')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize_skill("  Machine   Learning "), "machine learning");
    }

    #[test]
    fn test_normalize_drops_version_numbers() {
        assert_eq!(normalize_skill("Python 3.11"), "python");
        assert_eq!(normalize_skill("Java v17"), "java");
        assert_eq!(normalize_skill("Angular 2.x"), "angular");
    }

    #[test]
    fn test_normalize_keeps_lone_number_skill() {
        // Nothing to fall back to, so the token stays.
        assert_eq!(normalize_skill("5"), "5");
    }

    #[test]
    fn test_normalize_strips_parenthesized_qualifiers() {
        assert_eq!(normalize_skill("JavaScript (ES6+)"), "javascript");
        assert_eq!(normalize_skill("SQL [advanced]"), "sql");
    }

    #[test]
    fn test_normalize_keeps_symbol_skills() {
        assert_eq!(normalize_skill("C++"), "c++");
        assert_eq!(normalize_skill("C#,"), "c#");
        assert_eq!(normalize_skill(".NET"), ".net");
        assert_eq!(normalize_skill("Node.js."), "node.js");
        assert_eq!(normalize_skill("CI/CD"), "ci/cd");
    }

    #[test]
    fn test_normalize_underscores_become_spaces() {
        assert_eq!(normalize_skill("data_science"), "data science");
    }

    #[test]
    fn test_canonical_resolves_aliases() {
        assert_eq!(canonical_skill("JS"), "javascript");
        assert_eq!(canonical_skill("k8s"), "kubernetes");
        assert_eq!(canonical_skill("Postgres"), "postgresql");
        assert_eq!(canonical_skill("ReactJS"), "react");
        assert_eq!(canonical_skill("Golang"), "go");
        assert_eq!(canonical_skill("Amazon Web Services"), "aws");
    }

    #[test]
    fn test_canonical_passes_unknown_skills_through() {
        assert_eq!(canonical_skill("Elixir"), "elixir");
    }

    #[test]
    fn test_is_synonym() {
        assert!(is_synonym("Node", "node.js"));
        assert!(is_synonym("CI CD", "Continuous Integration"));
        assert!(!is_synonym("Java", "JavaScript"));
        assert!(!is_synonym("", ""));
    }

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        assert!(contains_term("Built APIs in Rust and Go", "rust"));
        assert!(!contains_term("Trusted by users", "rust"));
        assert!(!contains_term("Java and Kotlin", "javascript"));
        assert!(!contains_term("JavaScript", "java"));
    }

    #[test]
    fn test_contains_term_symbol_suffixes() {
        assert!(contains_term("Wrote C++ and C# tools", "c++"));
        assert!(contains_term("Wrote C++ and C# tools", "c#"));
        assert!(!contains_term("Wrote C++ tools", "c"));
        assert!(contains_term("Ported to .NET 6", ".net"));
    }

    #[test]
    fn test_mentions_skill_uses_aliases() {
        assert!(mentions_skill("Deployed services on k8s clusters", "kubernetes"));
        assert!(mentions_skill("Migrated Postgres schemas", "postgresql"));
    }

    #[test]
    fn test_mentions_skill_ignores_short_words() {
        // "go" and "ai" are too common in prose to count.
        assert!(!mentions_skill("Ready to go the extra mile", "go"));
        assert!(mentions_skill("Rewrote the scheduler in golang", "go"));
    }
}
