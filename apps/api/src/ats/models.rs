//! Flat records passed between pipeline stages.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ats::education::EducationLevel;
use crate::llm_client::Validate;

// ────────────────────────────────────────────────────────────────────────────
// Job description
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationRequirement {
    /// Free-text degree as written in the posting, e.g. "Bachelor's degree".
    pub minimum_degree: Option<String>,
    pub fields_of_study: Vec<String>,
    pub is_required: bool,
}

/// Structured output of JD extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedJobDescription {
    pub title: String,
    pub company: Option<String>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub responsibilities: Vec<String>,
    pub education: EducationRequirement,
    pub min_years_experience: Option<f32>,
    pub employment_type: Option<String>,
}

impl Validate for ParsedJobDescription {
    fn validate(&mut self) -> Result<(), String> {
        self.title = self.title.trim().to_string();
        drop_blank(&mut self.required_skills);
        drop_blank(&mut self.preferred_skills);
        drop_blank(&mut self.responsibilities);
        drop_blank(&mut self.education.fields_of_study);
        blank_to_none(&mut self.company);
        blank_to_none(&mut self.employment_type);
        blank_to_none(&mut self.education.minimum_degree);

        if let Some(years) = self.min_years_experience {
            if !years.is_finite() || years < 0.0 {
                return Err(format!("min_years_experience must be >= 0, got {years}"));
            }
        }

        if self.required_skills.is_empty()
            && self.preferred_skills.is_empty()
            && self.responsibilities.is_empty()
        {
            return Err("job description contained no skills or responsibilities".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub organization: Option<String>,
    pub start_date: Option<String>,
    /// `None`, "Present" or "Current" mean ongoing.
    pub end_date: Option<String>,
    pub bullets: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub graduation_date: Option<String>,
    pub in_progress: bool,
}

/// Structured output of resume extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedResume {
    pub name: Option<String>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub total_years_experience: f32,
}

impl NormalizedResume {
    /// Every skill-like string the candidate claims, in document order.
    pub fn skill_pool(&self) -> impl Iterator<Item = &str> {
        self.skills
            .iter()
            .chain(self.experience.iter().flat_map(|e| e.technologies.iter()))
            .chain(self.certifications.iter())
            .map(String::as_str)
    }

    /// All experience bullets joined, used as evidence text.
    pub fn bullet_text(&self) -> String {
        self.experience
            .iter()
            .flat_map(|e| std::iter::once(&e.title).chain(e.bullets.iter()))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Validate for NormalizedResume {
    fn validate(&mut self) -> Result<(), String> {
        blank_to_none(&mut self.name);
        drop_blank(&mut self.skills);
        drop_blank(&mut self.certifications);
        for entry in &mut self.experience {
            entry.title = entry.title.trim().to_string();
            drop_blank(&mut entry.bullets);
            drop_blank(&mut entry.technologies);
            blank_to_none(&mut entry.organization);
            blank_to_none(&mut entry.start_date);
            blank_to_none(&mut entry.end_date);
        }
        for entry in &mut self.education {
            entry.institution = entry.institution.trim().to_string();
            blank_to_none(&mut entry.degree);
            blank_to_none(&mut entry.field_of_study);
            blank_to_none(&mut entry.graduation_date);
        }

        if !self.total_years_experience.is_finite() || self.total_years_experience < 0.0 {
            return Err(format!(
                "total_years_experience must be >= 0, got {}",
                self.total_years_experience
            ));
        }

        if self.skills.is_empty() && self.experience.is_empty() && self.education.is_empty() {
            return Err("resume contained no skills, experience, or education".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage outputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Synonym,
    TextMention,
    Partial,
}

impl MatchKind {
    pub fn is_full(self) -> bool {
        !matches!(self, MatchKind::Partial)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub jd_skill: String,
    /// The resume skill that satisfied it, or the JD skill itself for text mentions.
    pub resume_skill: String,
    pub canonical: String,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillComparisonResult {
    pub matched_required: Vec<SkillMatch>,
    pub missing_required: Vec<String>,
    pub matched_preferred: Vec<SkillMatch>,
    pub missing_preferred: Vec<String>,
    pub additional_skills: Vec<String>,
    pub required_coverage: f32,
    pub preferred_coverage: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsibilityStatus {
    Met,
    Partial,
    NotMet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsibilityMatch {
    pub responsibility: String,
    pub status: ResponsibilityStatus,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationAssessment {
    pub required_level: EducationLevel,
    pub resume_level: EducationLevel,
    pub is_required: bool,
    /// `None` when the posting names no field of study.
    pub field_matched: Option<bool>,
    pub meets_requirement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    RequiredSkills,
    PreferredSkills,
    Responsibilities,
    Education,
    Experience,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 5] = [
        ScoreCategory::RequiredSkills,
        ScoreCategory::PreferredSkills,
        ScoreCategory::Responsibilities,
        ScoreCategory::Education,
        ScoreCategory::Experience,
    ];

    /// Maximum points a category can lose. Sums to 100.
    pub fn max_points(self) -> u32 {
        match self {
            ScoreCategory::RequiredSkills => 40,
            ScoreCategory::PreferredSkills => 10,
            ScoreCategory::Responsibilities => 25,
            ScoreCategory::Education => 15,
            ScoreCategory::Experience => 10,
        }
    }
}

/// One traceable point loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub category: ScoreCategory,
    pub reason: String,
    pub nominal_points: u32,
    /// Points actually taken after the category cap.
    pub points: u32,
    pub capped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: ScoreCategory,
    pub max_points: u32,
    pub deducted: u32,
    pub earned: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsScoreResult {
    pub score: u32,
    pub rating: Rating,
    pub categories: Vec<CategoryScore>,
    pub deductions: Vec<Deduction>,
    pub skill_comparison: SkillComparisonResult,
    pub responsibility_matches: Vec<ResponsibilityMatch>,
    pub education: EducationAssessment,
    pub recommendation: String,
}

/// Everything returned to the caller for one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsReport {
    pub scan_id: Uuid,
    pub job: ParsedJobDescription,
    pub resume: NormalizedResume,
    pub result: AtsScoreResult,
}

fn drop_blank(items: &mut Vec<String>) {
    items.retain(|s| !s.trim().is_empty());
    for item in items.iter_mut() {
        *item = item.trim().to_string();
    }
}

fn blank_to_none(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_jd_tolerates_missing_fields() {
        let json = r#"{"title": "Backend Intern", "required_skills": ["Rust"]}"#;
        let jd: ParsedJobDescription = serde_json::from_str(json).unwrap();
        assert_eq!(jd.title, "Backend Intern");
        assert!(jd.preferred_skills.is_empty());
        assert!(!jd.education.is_required);
        assert_eq!(jd.min_years_experience, None);
    }

    #[test]
    fn test_jd_validate_drops_blank_items() {
        let mut jd = ParsedJobDescription {
            title: "  SWE Intern ".to_string(),
            required_skills: vec!["Python".into(), "  ".into(), " SQL ".into()],
            company: Some("   ".into()),
            ..Default::default()
        };
        jd.validate().unwrap();
        assert_eq!(jd.title, "SWE Intern");
        assert_eq!(jd.required_skills, vec!["Python", "SQL"]);
        assert_eq!(jd.company, None);
    }

    #[test]
    fn test_jd_validate_rejects_empty_posting() {
        let mut jd = ParsedJobDescription {
            title: "Intern".to_string(),
            required_skills: vec!["".into()],
            ..Default::default()
        };
        assert!(jd.validate().is_err());
    }

    #[test]
    fn test_jd_validate_rejects_negative_years() {
        let mut jd = ParsedJobDescription {
            required_skills: vec!["Go".into()],
            min_years_experience: Some(-1.0),
            ..Default::default()
        };
        assert!(jd.validate().is_err());
    }

    #[test]
    fn test_resume_validate_rejects_empty_extraction() {
        let mut resume = NormalizedResume {
            name: Some("Ada".into()),
            ..Default::default()
        };
        assert!(resume.validate().is_err());
    }

    #[test]
    fn test_resume_validate_rejects_nan_years() {
        let mut resume = NormalizedResume {
            skills: vec!["Rust".into()],
            total_years_experience: f32::NAN,
            ..Default::default()
        };
        assert!(resume.validate().is_err());
    }

    #[test]
    fn test_skill_pool_includes_technologies_and_certifications() {
        let resume = NormalizedResume {
            skills: vec!["Python".into()],
            certifications: vec!["AWS Certified Developer".into()],
            experience: vec![ExperienceEntry {
                title: "Intern".into(),
                technologies: vec!["Docker".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let pool: Vec<&str> = resume.skill_pool().collect();
        assert_eq!(pool, vec!["Python", "Docker", "AWS Certified Developer"]);
    }

    #[test]
    fn test_category_caps_sum_to_100() {
        let total: u32 = ScoreCategory::ALL.iter().map(|c| c.max_points()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_match_kind_serializes_snake_case() {
        let json = serde_json::to_string(&MatchKind::TextMention).unwrap();
        assert_eq!(json, "\"text_mention\"");
        assert!(MatchKind::TextMention.is_full());
        assert!(!MatchKind::Partial.is_full());
    }

    #[test]
    fn test_responsibility_status_deserializes() {
        let json = r#"{"responsibility": "Write tests", "status": "not_met"}"#;
        let m: ResponsibilityMatch = serde_json::from_str(json).unwrap();
        assert_eq!(m.status, ResponsibilityStatus::NotMet);
        assert_eq!(m.evidence, None);
    }
}
