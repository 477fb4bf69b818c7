//! Skill comparison: resolves every JD skill against the resume's skill pool.
//!
//! Match ladder, first hit wins:
//! 1. exact normalized spelling        → `Exact`
//! 2. same canonical skill via synonyms → `Synonym`
//! 3. whole-term mention in resume text → `TextMention`
//! 4. one skill names the other         → `Partial` ("spring" vs "spring boot")
//!
//! Only `Partial` earns half credit.

use std::collections::{BTreeSet, HashSet};

use crate::ats::models::{
    MatchKind, NormalizedResume, ParsedJobDescription, SkillComparisonResult, SkillMatch,
};
use crate::ats::normalize::{
    canonical_skill, contains_term, is_synonym, mentions_skill, normalize_skill,
};

/// Shortest skill allowed to satisfy a `Partial` match; "c" must not cover "objective-c".
const MIN_PARTIAL_LEN: usize = 3;

struct PoolSkill<'a> {
    original: &'a str,
    normalized: String,
    canonical: String,
}

pub fn compare_skills(
    job: &ParsedJobDescription,
    resume: &NormalizedResume,
    resume_text: &str,
) -> SkillComparisonResult {
    let pool: Vec<PoolSkill<'_>> = resume
        .skill_pool()
        .map(|original| PoolSkill {
            original,
            normalized: normalize_skill(original),
            canonical: canonical_skill(original),
        })
        .filter(|s| !s.canonical.is_empty())
        .collect();

    let evidence = format!("{resume_text}\n{}", resume.bullet_text());

    let required = dedupe_by_canonical(&job.required_skills);
    // A skill listed as both required and preferred is only scored as required.
    let preferred: Vec<&str> = dedupe_by_canonical(&job.preferred_skills)
        .into_iter()
        .filter(|p| !required.iter().any(|r| is_synonym(r, p)))
        .collect();

    let (matched_required, missing_required) = resolve_all(&required, &pool, &evidence);
    let (matched_preferred, missing_preferred) = resolve_all(&preferred, &pool, &evidence);

    let jd_canonicals: Vec<String> = required
        .iter()
        .chain(preferred.iter())
        .map(|s| canonical_skill(s))
        .collect();
    let additional_skills: Vec<String> = pool
        .iter()
        .filter(|s| !jd_canonicals.iter().any(|jd| related(jd, &s.canonical)))
        .map(|s| s.canonical.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    SkillComparisonResult {
        required_coverage: coverage(&matched_required, required.len()),
        preferred_coverage: coverage(&matched_preferred, preferred.len()),
        matched_required,
        missing_required,
        matched_preferred,
        missing_preferred,
        additional_skills,
    }
}

/// Resolves a single JD skill. `None` means the resume shows no evidence of it.
fn resolve_skill(jd_skill: &str, pool: &[PoolSkill<'_>], evidence: &str) -> Option<SkillMatch> {
    let normalized = normalize_skill(jd_skill);
    let canonical = canonical_skill(jd_skill);

    let found = |kind: MatchKind, resume_skill: &str| SkillMatch {
        jd_skill: jd_skill.to_string(),
        resume_skill: resume_skill.to_string(),
        canonical: canonical.clone(),
        kind,
    };

    if let Some(hit) = pool.iter().find(|s| s.normalized == normalized) {
        return Some(found(MatchKind::Exact, hit.original));
    }
    if let Some(hit) = pool.iter().find(|s| s.canonical == canonical) {
        return Some(found(MatchKind::Synonym, hit.original));
    }
    if mentions_skill(evidence, &canonical)
        || (normalized != canonical && mentions_skill(evidence, &normalized))
    {
        return Some(found(MatchKind::TextMention, jd_skill));
    }
    if let Some(hit) = pool.iter().find(|s| related(&canonical, &s.canonical)) {
        return Some(found(MatchKind::Partial, hit.original));
    }
    None
}

fn resolve_all(
    skills: &[&str],
    pool: &[PoolSkill<'_>],
    evidence: &str,
) -> (Vec<SkillMatch>, Vec<String>) {
    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for skill in skills {
        match resolve_skill(skill, pool, evidence) {
            Some(m) => matched.push(m),
            None => missing.push((*skill).to_string()),
        }
    }
    (matched, missing)
}

/// Equal, or the shorter skill appears as a whole term inside the longer one.
fn related(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.chars().filter(|c| c.is_alphanumeric()).count() >= MIN_PARTIAL_LEN
        && contains_term(long, short)
}

fn dedupe_by_canonical(skills: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(String::as_str)
        .filter(|s| {
            let canonical = canonical_skill(s);
            !canonical.is_empty() && seen.insert(canonical)
        })
        .collect()
}

fn coverage(matched: &[SkillMatch], total: usize) -> f32 {
    if total == 0 {
        return 1.0;
    }
    let credit: f32 = matched
        .iter()
        .map(|m| if m.kind.is_full() { 1.0 } else { 0.5 })
        .sum();
    credit / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::models::ExperienceEntry;

    fn jd(required: &[&str], preferred: &[&str]) -> ParsedJobDescription {
        ParsedJobDescription {
            title: "Software Engineering Intern".to_string(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn resume(skills: &[&str]) -> NormalizedResume {
        NormalizedResume {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn kinds(matches: &[SkillMatch]) -> Vec<MatchKind> {
        matches.iter().map(|m| m.kind).collect()
    }

    #[test]
    fn test_exact_and_synonym_matches() {
        let result = compare_skills(&jd(&["Python", "JavaScript"], &[]), &resume(&["python", "JS"]), "");
        assert_eq!(kinds(&result.matched_required), vec![MatchKind::Exact, MatchKind::Synonym]);
        assert_eq!(result.matched_required[1].resume_skill, "JS");
        assert_eq!(result.matched_required[1].canonical, "javascript");
        assert!(result.missing_required.is_empty());
        assert!((result.required_coverage - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_mention_counts_as_full_match() {
        let result = compare_skills(
            &jd(&["Docker"], &[]),
            &resume(&["Python"]),
            "Containerized the ingestion service with Docker.",
        );
        assert_eq!(kinds(&result.matched_required), vec![MatchKind::TextMention]);
        assert!((result.required_coverage - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bullets_are_searched_for_mentions() {
        let mut candidate = resume(&["Python"]);
        candidate.experience.push(ExperienceEntry {
            title: "Data Intern".to_string(),
            bullets: vec!["Tuned slow PostgreSQL queries".to_string()],
            ..Default::default()
        });
        let result = compare_skills(&jd(&["Postgres"], &[]), &candidate, "");
        assert_eq!(kinds(&result.matched_required), vec![MatchKind::TextMention]);
    }

    #[test]
    fn test_partial_match_earns_half_credit() {
        let result = compare_skills(&jd(&["Spring Boot"], &[]), &resume(&["Spring"]), "");
        assert_eq!(kinds(&result.matched_required), vec![MatchKind::Partial]);
        assert!((result.required_coverage - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_short_skill_does_not_partially_match() {
        let result = compare_skills(&jd(&["Objective-C"], &[]), &resume(&["C"]), "");
        assert_eq!(result.missing_required, vec!["Objective-C"]);
    }

    #[test]
    fn test_missing_skills_reported_in_jd_order() {
        let result = compare_skills(&jd(&["Rust", "Kafka", "Python"], &[]), &resume(&["Python"]), "");
        assert_eq!(result.missing_required, vec!["Rust", "Kafka"]);
        assert!((result.required_coverage - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_jd_skills_collapse() {
        let result = compare_skills(&jd(&["Kubernetes", "k8s", "K8S"], &[]), &resume(&[]), "");
        assert_eq!(result.missing_required, vec!["Kubernetes"]);
    }

    #[test]
    fn test_preferred_duplicate_of_required_is_dropped() {
        let result = compare_skills(&jd(&["React"], &["ReactJS", "GraphQL"]), &resume(&[]), "");
        assert_eq!(result.missing_preferred, vec!["GraphQL"]);
    }

    #[test]
    fn test_additional_skills_exclude_jd_skills() {
        let result = compare_skills(
            &jd(&["Python"], &["AWS"]),
            &resume(&["Python", "Figma", "AWS Lambda", "figma"]),
            "",
        );
        assert_eq!(result.additional_skills, vec!["figma"]);
    }

    #[test]
    fn test_empty_lists_have_full_coverage() {
        let result = compare_skills(&jd(&[], &[]), &resume(&["Rust"]), "");
        assert!((result.required_coverage - 1.0).abs() < f32::EPSILON);
        assert!((result.preferred_coverage - 1.0).abs() < f32::EPSILON);
    }
}
