//! Capped-deduction scoring.
//!
//! Every candidate starts at 100. Each gap found by the earlier stages becomes a
//! `Deduction` in one of five categories; a category can never lose more than its
//! cap, and the caps sum to 100. The final score is `100 - Σ points`, so the
//! deduction list alone explains the number.

use std::collections::HashMap;

use crate::ats::models::{
    AtsScoreResult, CategoryScore, Deduction, EducationAssessment, MatchKind, Rating,
    ResponsibilityMatch, ResponsibilityStatus, ScoreCategory, SkillComparisonResult,
};

const REQUIRED_SKILL_MISSING: u32 = 8;
const REQUIRED_SKILL_PARTIAL: u32 = 4;
const PREFERRED_SKILL_MISSING: u32 = 2;
const PREFERRED_SKILL_PARTIAL: u32 = 1;
const RESPONSIBILITY_NOT_MET: u32 = 5;
const RESPONSIBILITY_PARTIAL: u32 = 2;
const EDUCATION_ONE_LEVEL_REQUIRED: u32 = 8;
const EDUCATION_ONE_LEVEL_PREFERRED: u32 = 4;
const EDUCATION_FAR_BELOW_REQUIRED: u32 = 15;
const EDUCATION_FAR_BELOW_PREFERRED: u32 = 6;
const EDUCATION_FIELD_MISMATCH: u32 = 4;
const EXPERIENCE_PER_MISSING_YEAR: u32 = 3;

/// Everything the scorer needs, borrowed from the pipeline.
pub struct ScoreInputs<'a> {
    pub skills: &'a SkillComparisonResult,
    pub responsibilities: &'a [ResponsibilityMatch],
    pub education: &'a EducationAssessment,
    pub min_years_experience: Option<f32>,
    pub resume_years_experience: f32,
}

/// Accumulates deductions while enforcing per-category caps.
#[derive(Debug, Default)]
struct DeductionLedger {
    taken: HashMap<ScoreCategory, u32>,
    deductions: Vec<Deduction>,
}

impl DeductionLedger {
    fn deduct(&mut self, category: ScoreCategory, nominal_points: u32, reason: String) {
        let taken = self.taken.entry(category).or_insert(0);
        let remaining = category.max_points() - *taken;
        let points = nominal_points.min(remaining);
        *taken += points;
        self.deductions.push(Deduction {
            category,
            reason,
            nominal_points,
            points,
            capped: points < nominal_points,
        });
    }

    fn total(&self) -> u32 {
        self.taken.values().sum()
    }

    fn categories(&self) -> Vec<CategoryScore> {
        ScoreCategory::ALL
            .iter()
            .map(|&category| {
                let deducted = self.taken.get(&category).copied().unwrap_or(0);
                CategoryScore {
                    category,
                    max_points: category.max_points(),
                    deducted,
                    earned: category.max_points() - deducted,
                }
            })
            .collect()
    }
}

pub fn compute_score(inputs: &ScoreInputs<'_>) -> AtsScoreResult {
    let mut ledger = DeductionLedger::default();

    deduct_skills(&mut ledger, inputs.skills);
    deduct_responsibilities(&mut ledger, inputs.responsibilities);
    deduct_education(&mut ledger, inputs.education);
    deduct_experience(
        &mut ledger,
        inputs.min_years_experience,
        inputs.resume_years_experience,
    );

    let score = 100 - ledger.total();
    let rating = rating_for(score);
    let recommendation = build_recommendation(score, inputs.skills);

    AtsScoreResult {
        score,
        rating,
        categories: ledger.categories(),
        deductions: ledger.deductions,
        skill_comparison: inputs.skills.clone(),
        responsibility_matches: inputs.responsibilities.to_vec(),
        education: inputs.education.clone(),
        recommendation,
    }
}

fn deduct_skills(ledger: &mut DeductionLedger, skills: &SkillComparisonResult) {
    for skill in &skills.missing_required {
        ledger.deduct(
            ScoreCategory::RequiredSkills,
            REQUIRED_SKILL_MISSING,
            format!("Missing required skill: {skill}"),
        );
    }
    for m in skills
        .matched_required
        .iter()
        .filter(|m| m.kind == MatchKind::Partial)
    {
        ledger.deduct(
            ScoreCategory::RequiredSkills,
            REQUIRED_SKILL_PARTIAL,
            format!(
                "Required skill {} only partially covered by {}",
                m.jd_skill, m.resume_skill
            ),
        );
    }
    for skill in &skills.missing_preferred {
        ledger.deduct(
            ScoreCategory::PreferredSkills,
            PREFERRED_SKILL_MISSING,
            format!("Missing preferred skill: {skill}"),
        );
    }
    for m in skills
        .matched_preferred
        .iter()
        .filter(|m| m.kind == MatchKind::Partial)
    {
        ledger.deduct(
            ScoreCategory::PreferredSkills,
            PREFERRED_SKILL_PARTIAL,
            format!(
                "Preferred skill {} only partially covered by {}",
                m.jd_skill, m.resume_skill
            ),
        );
    }
}

fn deduct_responsibilities(ledger: &mut DeductionLedger, matches: &[ResponsibilityMatch]) {
    for m in matches {
        let (points, label) = match m.status {
            ResponsibilityStatus::Met => continue,
            ResponsibilityStatus::Partial => (RESPONSIBILITY_PARTIAL, "Partially demonstrated"),
            ResponsibilityStatus::NotMet => (RESPONSIBILITY_NOT_MET, "No evidence for"),
        };
        ledger.deduct(
            ScoreCategory::Responsibilities,
            points,
            format!("{label} responsibility: {}", m.responsibility),
        );
    }
}

fn deduct_education(ledger: &mut DeductionLedger, education: &EducationAssessment) {
    let below = education
        .resume_level
        .levels_below(education.required_level);
    let points = match (below, education.is_required) {
        (0, _) => 0,
        (1, true) => EDUCATION_ONE_LEVEL_REQUIRED,
        (1, false) => EDUCATION_ONE_LEVEL_PREFERRED,
        (_, true) => EDUCATION_FAR_BELOW_REQUIRED,
        (_, false) => EDUCATION_FAR_BELOW_PREFERRED,
    };
    if points > 0 {
        ledger.deduct(
            ScoreCategory::Education,
            points,
            format!(
                "Education {} is below the {} {}",
                education.resume_level.label(),
                if education.is_required {
                    "required"
                } else {
                    "preferred"
                },
                education.required_level.label()
            ),
        );
    }
    if education.field_matched == Some(false) {
        ledger.deduct(
            ScoreCategory::Education,
            EDUCATION_FIELD_MISMATCH,
            "Field of study does not match the posting".to_string(),
        );
    }
}

fn deduct_experience(ledger: &mut DeductionLedger, required: Option<f32>, actual: f32) {
    let Some(required) = required else {
        return;
    };
    let gap = required - actual;
    if gap <= 0.0 {
        return;
    }
    // Anything past the category cap deducts the same; clamp before the cast.
    let max_years = ScoreCategory::Experience.max_points() as f32;
    let missing_years = gap.ceil().min(max_years) as u32;
    ledger.deduct(
        ScoreCategory::Experience,
        missing_years.saturating_mul(EXPERIENCE_PER_MISSING_YEAR),
        format!("{actual:.1} years of experience, posting asks for {required:.1}"),
    );
}

pub fn rating_for(score: u32) -> Rating {
    if score >= 85 {
        Rating::Excellent
    } else if score >= 70 {
        Rating::Strong
    } else if score >= 50 {
        Rating::Moderate
    } else {
        Rating::Weak
    }
}

/// Builds a human-readable recommendation from the score and missing required skills.
fn build_recommendation(score: u32, skills: &SkillComparisonResult) -> String {
    let top_gaps: Vec<&str> = skills
        .missing_required
        .iter()
        .take(3)
        .map(String::as_str)
        .collect();

    if score >= 85 {
        "Excellent match. Your resume covers the key requirements of this posting.".to_string()
    } else if top_gaps.is_empty() {
        format!(
            "Score {score}/100. Required skills are covered; strengthen responsibilities, \
             education, or experience evidence to improve."
        )
    } else if score >= 50 {
        format!(
            "Moderate match ({score}/100). Consider adding evidence for: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Weak match ({score}/100). Significant gaps: {}. Tailor your resume before applying.",
            top_gaps.join(", ")
        )
    }
}
