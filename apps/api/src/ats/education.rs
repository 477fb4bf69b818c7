//! Education level comparison.

use serde::{Deserialize, Serialize};

use crate::ats::models::{EducationAssessment, EducationEntry, EducationRequirement};
use crate::ats::normalize::{contains_term, normalize_skill};

/// Ordered degree ladder. Derives `Ord` so comparisons read naturally.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    #[default]
    None,
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    fn rank(self) -> u8 {
        self as u8
    }

    /// Human-readable name used in deduction reasons.
    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::None => "no degree",
            EducationLevel::HighSchool => "high school",
            EducationLevel::Associate => "associate degree",
            EducationLevel::Bachelor => "bachelor's degree",
            EducationLevel::Master => "master's degree",
            EducationLevel::Doctorate => "doctorate",
        }
    }

    /// How many rungs `self` sits below `required` (0 when it meets it).
    pub fn levels_below(self, required: EducationLevel) -> u8 {
        required.rank().saturating_sub(self.rank())
    }
}

// Checked top-down so "Master of Business" wins over a stray "bachelor" later in the string.
const DOCTORATE_MARKERS: &[&str] = &["phd", "ph.d", "doctorate", "doctoral", "doctor of", "dphil"];
const MASTER_MARKERS: &[&str] = &[
    "master", "masters", "msc", "m.sc", "ms", "m.s", "mba", "meng", "m.eng", "ma", "m.a", "mtech",
    "m.tech", "mcs",
];
const BACHELOR_MARKERS: &[&str] = &[
    "bachelor", "bachelors", "bsc", "b.sc", "bs", "b.s", "ba", "b.a", "beng", "b.eng", "btech",
    "b.tech", "bba", "undergraduate", "baccalaureate",
];
const ASSOCIATE_MARKERS: &[&str] = &["associate", "associates", "aas", "a.a.s", "a.s", "a.a"];
const HIGH_SCHOOL_MARKERS: &[&str] = &["high school", "ged", "secondary school", "diploma"];

/// Classifies a free-text degree ("B.S. in Computer Science", "Ph.D.") onto the ladder.
pub fn classify_degree(text: &str) -> EducationLevel {
    let lowered = text.to_lowercase().replace('\'', "");
    let has_any = |markers: &[&str]| markers.iter().any(|m| contains_term(&lowered, m));

    if has_any(DOCTORATE_MARKERS) {
        EducationLevel::Doctorate
    } else if has_any(MASTER_MARKERS) {
        EducationLevel::Master
    } else if has_any(BACHELOR_MARKERS) {
        EducationLevel::Bachelor
    } else if has_any(ASSOCIATE_MARKERS) {
        EducationLevel::Associate
    } else if has_any(HIGH_SCHOOL_MARKERS) {
        EducationLevel::HighSchool
    } else {
        EducationLevel::None
    }
}

/// Highest level across all entries. In-progress degrees count: applicants to
/// internships are usually still enrolled.
pub fn highest_level(entries: &[EducationEntry]) -> EducationLevel {
    entries
        .iter()
        .filter_map(|e| e.degree.as_deref())
        .map(classify_degree)
        .max()
        .unwrap_or_default()
}

const FIELD_ALIASES: &[(&str, &str)] = &[
    ("cs", "computer science"),
    ("cse", "computer science"),
    ("comp sci", "computer science"),
    ("ce", "computer engineering"),
    ("ee", "electrical engineering"),
    ("ece", "electrical and computer engineering"),
    ("swe", "software engineering"),
    ("is", "information systems"),
    ("it", "information technology"),
    ("math", "mathematics"),
    ("maths", "mathematics"),
    ("stats", "statistics"),
];

fn normalize_field(field: &str) -> String {
    let normalized = normalize_skill(field);
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, full)| (*full).to_string())
        .unwrap_or(normalized)
}

/// A resume field satisfies a required one when either contains the other as a term
/// ("computer science" satisfies "computer science or related field").
pub fn field_matches(resume_field: &str, required_field: &str) -> bool {
    let resume_field = normalize_field(resume_field);
    let required_field = normalize_field(required_field);
    if resume_field.is_empty() || required_field.is_empty() {
        return false;
    }
    contains_term(&required_field, &resume_field) || contains_term(&resume_field, &required_field)
}

pub fn assess_education(
    requirement: &EducationRequirement,
    entries: &[EducationEntry],
) -> EducationAssessment {
    let required_level = requirement
        .minimum_degree
        .as_deref()
        .map(classify_degree)
        .unwrap_or_default();
    let resume_level = highest_level(entries);

    let field_matched = if requirement.fields_of_study.is_empty() {
        None
    } else {
        Some(entries.iter().any(|entry| {
            let declared = entry.field_of_study.iter().chain(entry.degree.iter());
            declared
                .flat_map(|f| requirement.fields_of_study.iter().map(move |r| (f, r)))
                .any(|(f, r)| field_matches(f, r))
        }))
    };

    let meets_requirement = resume_level >= required_level && field_matched != Some(false);

    EducationAssessment {
        required_level,
        resume_level,
        is_required: requirement.is_required,
        field_matched,
        meets_requirement,
    }
}
