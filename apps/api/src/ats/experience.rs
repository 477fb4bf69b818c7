//! Deterministic experience-duration helpers used when the LLM leaves gaps.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ats::models::ExperienceEntry;

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})(?:[-/.]\d{1,2})?$").unwrap());
static MONTH_SLASH_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").unwrap());
static MONTH_NAME_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+)\.?,?\s+(\d{4})$").unwrap());
static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").unwrap());

static YEARS_OF_EXPERIENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2}(?:\.\d)?)\s*\+?\s*(?:(?:-|to)\s*\d{1,2}\s*\+?\s*)?(?:years?|yrs?)\b[^.\n]{0,40}?\bexperience",
    )
    .unwrap()
});

const OPEN_ENDED: &[&str] = &["present", "current", "now", "ongoing", "today"];

/// Month index (`year * 12 + month0`) for a loosely formatted resume date.
fn parse_month_index(raw: &str) -> Option<i32> {
    let s = raw.trim().to_lowercase();

    if let Some(caps) = YEAR_MONTH.captures(&s) {
        return month_index(caps[1].parse().ok()?, caps[2].parse().ok()?);
    }
    if let Some(caps) = MONTH_SLASH_YEAR.captures(&s) {
        return month_index(caps[2].parse().ok()?, caps[1].parse().ok()?);
    }
    if let Some(caps) = MONTH_NAME_YEAR.captures(&s) {
        return month_index(caps[2].parse().ok()?, month_from_name(&caps[1])?);
    }
    if let Some(caps) = YEAR_ONLY.captures(&s) {
        return month_index(caps[1].parse().ok()?, 1);
    }
    None
}

fn month_index(year: i32, month: u32) -> Option<i32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(year * 12 + month as i32 - 1)
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let prefix = name.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

fn is_open_ended(raw: Option<&str>) -> bool {
    raw.map_or(true, |s| OPEN_ENDED.contains(&s.trim().to_lowercase().as_str()))
}

/// Total years covered by dated entries, with overlapping ranges counted once.
/// Entries without a parseable start date are skipped. End months are inclusive.
pub fn years_from_entries(entries: &[ExperienceEntry], today: NaiveDate) -> f32 {
    let now = today.year() * 12 + today.month0() as i32;

    let mut ranges: Vec<(i32, i32)> = entries
        .iter()
        .filter_map(|entry| {
            let start = parse_month_index(entry.start_date.as_deref()?)?;
            let end = if is_open_ended(entry.end_date.as_deref()) {
                now
            } else {
                parse_month_index(entry.end_date.as_deref()?)?
            };
            (end >= start).then_some((start, end.min(now) + 1))
        })
        .filter(|(start, end)| end > start)
        .collect();

    ranges.sort_unstable();

    let mut total_months = 0;
    let mut current: Option<(i32, i32)> = None;
    for (start, end) in ranges {
        current = match current {
            Some((cs, ce)) if start <= ce => Some((cs, ce.max(end))),
            Some((cs, ce)) => {
                total_months += ce - cs;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((cs, ce)) = current {
        total_months += ce - cs;
    }

    total_months as f32 / 12.0
}

/// Smallest "N years ... experience" figure stated in a posting, if any.
pub fn years_required_from_text(jd_text: &str) -> Option<f32> {
    YEARS_OF_EXPERIENCE
        .captures_iter(jd_text)
        .filter_map(|caps| caps[1].parse::<f32>().ok())
        .reduce(f32::min)
}
