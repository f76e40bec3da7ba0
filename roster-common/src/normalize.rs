//! Raw sheet rows to canonical enrollment records
//!
//! Sheets are maintained by hand, so each canonical field looks through a
//! short list of header spellings and falls back to a default when none of
//! them holds a value.

use crate::config::ProgressFallbackConfig;
use crate::record::{is_canonical_field, EnrollmentRecord, RawRow};
use crate::time::parse_sheet_date;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STUDENT_NAME: &[&str] = &["Student Name", "Name"];
const EMAIL: &[&str] = &["Email", "Student Email"];
const COURSE: &[&str] = &["Course", "Course Name"];
const CATEGORY: &[&str] = &["Category", "Course Category"];
const ENROLLMENT_DATE: &[&str] = &["Enrollment Date", "Date"];
const STATUS: &[&str] = &["Status"];
const PROGRESS: &[&str] = &["Progress", "Completion %"];
const PAYMENT_STATUS: &[&str] = &["Payment Status", "Payment"];
const PHONE: &[&str] = &["Phone", "Phone Number"];
const ADDRESS: &[&str] = &["Address"];
const AGE: &[&str] = &["Age"];
const GENDER: &[&str] = &["Gender"];
const SOURCE: &[&str] = &["Source", "Lead Source"];
const AMOUNT: &[&str] = &["Amount", "Fee", "Course Fee"];

/// Source of `progress` values for rows without a readable one
#[derive(Debug, Clone)]
pub enum ProgressFallback {
    /// Same value every time
    Fixed(i64),
    /// Uniform in `[0, 100)`
    Random(StdRng),
}

impl ProgressFallback {
    pub fn from_config(config: ProgressFallbackConfig) -> Self {
        match config {
            ProgressFallbackConfig::Fixed { value } => ProgressFallback::Fixed(value),
            ProgressFallbackConfig::Random { seed: Some(seed) } => {
                ProgressFallback::Random(StdRng::seed_from_u64(seed))
            }
            ProgressFallbackConfig::Random { seed: None } => {
                ProgressFallback::Random(StdRng::from_entropy())
            }
        }
    }

    fn next_value(&mut self) -> i64 {
        match self {
            ProgressFallback::Fixed(value) => *value,
            ProgressFallback::Random(rng) => rng.gen_range(0..100),
        }
    }
}

impl Default for ProgressFallback {
    fn default() -> Self {
        ProgressFallback::Fixed(0)
    }
}

/// Maps raw rows onto [`EnrollmentRecord`]
///
/// One normalizer serves one sync generation. `today` stands in for missing
/// enrollment dates so a whole generation agrees on it.
#[derive(Debug, Clone)]
pub struct Normalizer {
    today: NaiveDate,
    fallback: ProgressFallback,
}

impl Normalizer {
    pub fn new(today: NaiveDate, fallback: ProgressFallback) -> Self {
        Self { today, fallback }
    }

    /// Normalize a row at 0-based position `index`
    pub fn normalize(&mut self, row: &RawRow, index: usize) -> EnrollmentRecord {
        let id = index as u64 + 1;
        let text = |candidates: &[&str]| row.first_non_empty(candidates).map(str::to_string);

        let progress = row
            .first_non_empty(PROGRESS)
            .and_then(parse_leading_int)
            .unwrap_or_else(|| self.fallback.next_value());

        let enrollment_date = match row.first_non_empty(ENROLLMENT_DATE) {
            Some(value) => parse_sheet_date(value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| value.to_string()),
            None => self.today.format("%Y-%m-%d").to_string(),
        };

        let extra: RawRow = row
            .iter()
            .filter(|(header, _)| !is_canonical_field(header))
            .collect();

        EnrollmentRecord {
            id,
            student_name: text(STUDENT_NAME).unwrap_or_else(|| format!("Student {}", id)),
            email: text(EMAIL).unwrap_or_else(|| format!("student{}@email.com", id)),
            course: text(COURSE).unwrap_or_else(|| "Unknown Course".to_string()),
            category: text(CATEGORY).unwrap_or_else(|| "General".to_string()),
            enrollment_date,
            status: text(STATUS).unwrap_or_else(|| "Active".to_string()),
            progress,
            payment_status: text(PAYMENT_STATUS).unwrap_or_else(|| "Paid".to_string()),
            phone: text(PHONE).unwrap_or_default(),
            address: text(ADDRESS).unwrap_or_default(),
            age: text(AGE).unwrap_or_default(),
            gender: text(GENDER).unwrap_or_default(),
            source: text(SOURCE).unwrap_or_else(|| "Direct".to_string()),
            amount: text(AMOUNT).unwrap_or_default(),
            extra,
        }
    }

    /// Normalize rows in order; ids follow row order
    pub fn normalize_all(&mut self, rows: &[RawRow]) -> Vec<EnrollmentRecord> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.normalize(row, index))
            .collect()
    }
}

/// Leading integer of a cell: `"75%"` → 75, `"42.5"` → 42, `"n/a"` → None
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign_len = usize::from(value.starts_with(['+', '-']));
    let digits = value[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    value[..sign_len + digits].parse().ok()
}
