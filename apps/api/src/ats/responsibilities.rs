//! Responsibility classification: pluggable, trait-based matcher that decides
//! whether the resume demonstrates each responsibility in the posting.
//!
//! Default: `LlmResponsibilityMatcher` (one model call per scan).
//! Fallback: `KeywordResponsibilityMatcher` (pure-Rust, deterministic, no network).
//!
//! `AppState` holds an `Arc<dyn ResponsibilityMatcher>`, chosen at startup via config.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ats::extractor::llm_failure;
use crate::ats::models::{NormalizedResume, ResponsibilityMatch, ResponsibilityStatus};
use crate::ats::normalize::normalize_skill;
use crate::ats::prompts::{RESPONSIBILITY_MATCH_PROMPT_TEMPLATE, RESPONSIBILITY_MATCH_ROLE};
use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{complete_json, LlmBackend};

/// Swap backends without touching the pipeline or handlers.
#[async_trait]
pub trait ResponsibilityMatcher: Send + Sync {
    async fn match_responsibilities(
        &self,
        responsibilities: &[String],
        resume: &NormalizedResume,
        resume_text: &str,
    ) -> Result<Vec<ResponsibilityMatch>, AppError>;

    /// Label reported in logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResponsibilityMatcher
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResponsibilityMatcher {
    llm: Arc<dyn LlmBackend>,
}

impl LlmResponsibilityMatcher {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self { llm }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MatchEnvelope {
    #[serde(default)]
    matches: Vec<ResponsibilityMatch>,
}

#[async_trait]
impl ResponsibilityMatcher for LlmResponsibilityMatcher {
    async fn match_responsibilities(
        &self,
        responsibilities: &[String],
        resume: &NormalizedResume,
        _resume_text: &str,
    ) -> Result<Vec<ResponsibilityMatch>, AppError> {
        if responsibilities.is_empty() {
            return Ok(Vec::new());
        }

        let responsibilities_json =
            serde_json::to_string_pretty(responsibilities).map_err(anyhow::Error::from)?;
        let resume_json = serde_json::to_string_pretty(resume).map_err(anyhow::Error::from)?;
        let prompt = RESPONSIBILITY_MATCH_PROMPT_TEMPLATE
            .replace("{responsibilities_json}", &responsibilities_json)
            .replace("{resume_json}", &resume_json);

        let envelope: MatchEnvelope = complete_json(
            self.llm.as_ref(),
            &prompt,
            &json_system(RESPONSIBILITY_MATCH_ROLE),
        )
        .await
        .map_err(|e| llm_failure("Responsibility matching", e))?;

        Ok(align_verdicts(responsibilities, envelope.matches))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Returns exactly one verdict per responsibility, in posting order.
/// Verdicts for unknown responsibilities are dropped; missing ones become `NotMet`.
fn align_verdicts(
    responsibilities: &[String],
    verdicts: Vec<ResponsibilityMatch>,
) -> Vec<ResponsibilityMatch> {
    let mut by_key: HashMap<String, ResponsibilityMatch> = HashMap::new();
    for verdict in verdicts {
        by_key
            .entry(verdict_key(&verdict.responsibility))
            .or_insert(verdict);
    }

    responsibilities
        .iter()
        .map(|text| match by_key.remove(&verdict_key(text)) {
            Some(mut verdict) => {
                verdict.responsibility = text.clone();
                if verdict.status == ResponsibilityStatus::NotMet {
                    verdict.evidence = None;
                }
                verdict
            }
            None => ResponsibilityMatch {
                responsibility: text.clone(),
                status: ResponsibilityStatus::NotMet,
                evidence: None,
            },
        })
        .collect()
}

fn verdict_key(text: &str) -> String {
    normalize_skill(text)
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordResponsibilityMatcher
// ────────────────────────────────────────────────────────────────────────────

/// Content-word overlap between a responsibility and the resume.
///
/// Algorithm:
/// 1. Tokenize the responsibility, dropping stopwords and tokens under 3 chars.
/// 2. ratio = tokens found in resume text / tokens
/// 3. ≥ 0.6 met, ≥ 0.3 partial, else not_met
pub struct KeywordResponsibilityMatcher;

const MET_THRESHOLD: f32 = 0.6;
const PARTIAL_THRESHOLD: f32 = 0.3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "our", "your", "you", "will", "are", "that", "this", "from",
    "into", "across", "other", "their", "work", "working", "help", "using", "use", "new", "all",
    "team", "teams", "about", "such", "as", "well", "within", "including", "ensure", "able",
];

#[async_trait]
impl ResponsibilityMatcher for KeywordResponsibilityMatcher {
    async fn match_responsibilities(
        &self,
        responsibilities: &[String],
        resume: &NormalizedResume,
        resume_text: &str,
    ) -> Result<Vec<ResponsibilityMatch>, AppError> {
        let corpus = format!("{resume_text}\n{}", resume.bullet_text()).to_lowercase();
        let resume_words: HashSet<String> = tokenize(&corpus).map(stem).collect();

        Ok(responsibilities
            .iter()
            .map(|r| classify_by_overlap(r, &resume_words))
            .collect())
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

fn classify_by_overlap(responsibility: &str, resume_words: &HashSet<String>) -> ResponsibilityMatch {
    let lowered = responsibility.to_lowercase();
    let content: HashSet<String> = tokenize(&lowered)
        .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(w))
        .map(stem)
        .collect();

    if content.is_empty() {
        return ResponsibilityMatch {
            responsibility: responsibility.to_string(),
            status: ResponsibilityStatus::NotMet,
            evidence: None,
        };
    }

    let mut found: Vec<&String> = content.iter().filter(|w| resume_words.contains(*w)).collect();
    found.sort();
    let ratio = found.len() as f32 / content.len() as f32;

    let status = if ratio >= MET_THRESHOLD {
        ResponsibilityStatus::Met
    } else if ratio >= PARTIAL_THRESHOLD {
        ResponsibilityStatus::Partial
    } else {
        ResponsibilityStatus::NotMet
    };

    let evidence = (status != ResponsibilityStatus::NotMet).then(|| {
        let words: Vec<&str> = found.iter().map(|w| w.as_str()).collect();
        format!("Resume mentions: {}", words.join(", "))
    });

    ResponsibilityMatch {
        responsibility: responsibility.to_string(),
        status,
        evidence,
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|w| !w.is_empty())
}

/// Crude suffix folding so "building"/"built"/"builds" and "tests"/"testing" meet.
fn stem(word: &str) -> String {
    for suffix in ["ing", "ed", "es", "s"] {
        if let Some(root) = word.strip_suffix(suffix) {
            if root.chars().count() >= 3 {
                return root.to_string();
            }
        }
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::models::ExperienceEntry;
    use crate::llm_client::testing::ScriptedBackend;

    fn resume_with_bullets(bullets: &[&str]) -> NormalizedResume {
        NormalizedResume {
            skills: vec!["Python".to_string()],
            experience: vec![ExperienceEntry {
                title: "Software Engineering Intern".to_string(),
                bullets: bullets.iter().map(|b| b.to_string()).collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_keyword_matcher_classifies_by_overlap() {
        let resume = resume_with_bullets(&[
            "Designed and built REST APIs for the billing service",
            "Wrote unit tests in pytest",
        ]);
        let responsibilities = owned(&[
            "Build REST APIs for billing",
            "Write unit tests and monitor production dashboards",
            "Negotiate vendor contracts",
        ]);

        let matches = KeywordResponsibilityMatcher
            .match_responsibilities(&responsibilities, &resume, "")
            .await
            .unwrap();

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].status, ResponsibilityStatus::Met);
        assert!(matches[0].evidence.as_deref().unwrap().contains("rest"));
        assert_eq!(matches[1].status, ResponsibilityStatus::Partial);
        assert_eq!(matches[2].status, ResponsibilityStatus::NotMet);
        assert_eq!(matches[2].evidence, None);
    }

    #[tokio::test]
    async fn test_keyword_matcher_stopword_only_responsibility_is_not_met() {
        let resume = resume_with_bullets(&["Worked with the team"]);
        let matches = KeywordResponsibilityMatcher
            .match_responsibilities(&owned(&["Work with the team"]), &resume, "")
            .await
            .unwrap();
        assert_eq!(matches[0].status, ResponsibilityStatus::NotMet);
    }

    #[test]
    fn test_stem_folds_common_suffixes() {
        assert_eq!(stem("building"), "build");
        assert_eq!(stem("tests"), "test");
        assert_eq!(stem("deployed"), "deploy");
        assert_eq!(stem("apis"), "api");
        // Too short to fold
        assert_eq!(stem("red"), "red");
    }

    #[test]
    fn test_align_verdicts_fills_gaps_and_drops_unknowns() {
        let responsibilities = owned(&["Build APIs", "Write docs"]);
        let verdicts = vec![
            ResponsibilityMatch {
                responsibility: "write docs".to_string(),
                status: ResponsibilityStatus::Partial,
                evidence: Some("README contributions".to_string()),
            },
            ResponsibilityMatch {
                responsibility: "Plan offsites".to_string(),
                status: ResponsibilityStatus::Met,
                evidence: None,
            },
        ];
        let aligned = align_verdicts(&responsibilities, verdicts);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].responsibility, "Build APIs");
        assert_eq!(aligned[0].status, ResponsibilityStatus::NotMet);
        assert_eq!(aligned[1].responsibility, "Write docs");
        assert_eq!(aligned[1].status, ResponsibilityStatus::Partial);
    }

    #[test]
    fn test_align_verdicts_clears_evidence_on_not_met() {
        let aligned = align_verdicts(
            &owned(&["Ship features"]),
            vec![ResponsibilityMatch {
                responsibility: "Ship features".to_string(),
                status: ResponsibilityStatus::NotMet,
                evidence: Some("nothing really".to_string()),
            }],
        );
        assert_eq!(aligned[0].evidence, None);
    }

    #[tokio::test]
    async fn test_llm_matcher_skips_call_for_empty_list() {
        let backend = Arc::new(ScriptedBackend::replying(&[]));
        let matcher = LlmResponsibilityMatcher::new(backend.clone());
        let matches = matcher
            .match_responsibilities(&[], &NormalizedResume::default(), "")
            .await
            .unwrap();
        assert!(matches.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_llm_matcher_parses_envelope() {
        let backend = Arc::new(ScriptedBackend::replying(&[r#"{
            "matches": [
                {"responsibility": "Build APIs", "status": "met", "evidence": "Built REST APIs"}
            ]
        }"#]));
        let matcher = LlmResponsibilityMatcher::new(backend.clone());
        let matches = matcher
            .match_responsibilities(&owned(&["Build APIs"]), &resume_with_bullets(&[]), "")
            .await
            .unwrap();
        assert_eq!(matches[0].status, ResponsibilityStatus::Met);
        assert_eq!(matches[0].evidence.as_deref(), Some("Built REST APIs"));
        assert_eq!(matcher.backend(), "llm");
    }
}
