//! Row and record types for the enrollment sheet
//!
//! A [`RawRow`] is what the CSV reader produces: header-keyed cells in sheet
//! order. An [`EnrollmentRecord`] is the canonical shape every endpoint
//! serves: a fixed set of fields plus the untouched sheet columns in
//! [`EnrollmentRecord::extra`].

use serde::{Serialize, Serializer};

/// JSON names of the canonical record fields, in serialization order
pub const CANONICAL_FIELDS: [&str; 15] = [
    "id",
    "studentName",
    "email",
    "course",
    "category",
    "enrollmentDate",
    "status",
    "progress",
    "paymentStatus",
    "phone",
    "address",
    "age",
    "gender",
    "source",
    "amount",
];

/// Returns true if `name` is one of the canonical JSON field names
pub fn is_canonical_field(name: &str) -> bool {
    CANONICAL_FIELDS.contains(&name)
}

/// One data line of the sheet, keyed by header
///
/// Keeps sheet column order. Inserting an existing header replaces the value
/// in place, so duplicated headers resolve to the rightmost cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Set a cell, replacing any earlier cell under the same header
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// First candidate column holding a non-empty value
    pub fn first_non_empty(&self, candidates: &[&str]) -> Option<&str> {
        candidates
            .iter()
            .filter_map(|c| self.get(c))
            .find(|v| !v.is_empty())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Serialized as a map in column order
impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Canonical enrollment record
///
/// Serialized with camelCase canonical keys followed by the sheet's own
/// columns, matching the shape the dashboard reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    /// 1-based position in the sync generation
    pub id: u64,
    pub student_name: String,
    pub email: String,
    pub course: String,
    pub category: String,
    /// `YYYY-MM-DD` when the sheet value could be read as a date, verbatim otherwise
    pub enrollment_date: String,
    pub status: String,
    pub progress: i64,
    pub payment_status: String,
    pub phone: String,
    pub address: String,
    pub age: String,
    pub gender: String,
    pub source: String,
    pub amount: String,
    /// Sheet columns as read, minus any header that shadows a canonical key
    #[serde(flatten)]
    pub extra: RawRow,
}

impl EnrollmentRecord {
    /// Key list as it appears in the serialized record
    pub fn field_names(&self) -> Vec<String> {
        CANONICAL_FIELDS
            .iter()
            .map(|f| f.to_string())
            .chain(self.extra.headers().map(str::to_string))
            .collect()
    }

    /// Case-insensitive substring match over name, email and course
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.student_name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
            || self.course.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EnrollmentRecord {
        EnrollmentRecord {
            id: 1,
            student_name: "Ada Lovelace".to_string(),
            email: "ada@x.com".to_string(),
            course: "Algorithms".to_string(),
            category: "General".to_string(),
            enrollment_date: "2024-12-01".to_string(),
            status: "Active".to_string(),
            progress: 10,
            payment_status: "Paid".to_string(),
            phone: String::new(),
            address: String::new(),
            age: String::new(),
            gender: String::new(),
            source: "Direct".to_string(),
            amount: String::new(),
            extra: vec![("Cohort", "A")].into_iter().collect(),
        }
    }

    #[test]
    fn test_raw_row_duplicate_header_keeps_position_takes_last_value() {
        let row: RawRow = vec![("A", "1"), ("B", "2"), ("A", "3")].into_iter().collect();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("A"), Some("3"));
        assert_eq!(row.headers().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_first_non_empty_skips_blank_candidates() {
        let row: RawRow = vec![("Student Name", ""), ("Name", "Grace")].into_iter().collect();
        assert_eq!(row.first_non_empty(&["Student Name", "Name"]), Some("Grace"));
        assert_eq!(row.first_non_empty(&["Missing"]), None);
    }

    #[test]
    fn test_record_serializes_canonical_and_extra_keys() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["studentName"], "Ada Lovelace");
        assert_eq!(json["paymentStatus"], "Paid");
        assert_eq!(json["progress"], 10);
        assert_eq!(json["Cohort"], "A");
        assert!(json.get("extra").is_none());
    }

    #[test]
    fn test_field_names_lists_canonical_then_extra() {
        let names = record().field_names();
        assert_eq!(names.first().map(String::as_str), Some("id"));
        assert_eq!(names.last().map(String::as_str), Some("Cohort"));
        assert_eq!(names.len(), CANONICAL_FIELDS.len() + 1);
    }

    #[test]
    fn test_extra_columns_keep_sheet_order() {
        let mut r = record();
        r.extra = vec![("Zeta", "1"), ("Alpha", "2"), ("Mid", "3")].into_iter().collect();

        let names = r.field_names();
        assert_eq!(&names[CANONICAL_FIELDS.len()..], ["Zeta", "Alpha", "Mid"]);

        let text = serde_json::to_string(&r).unwrap();
        let zeta = text.find("\"Zeta\"").unwrap();
        let alpha = text.find("\"Alpha\"").unwrap();
        let mid = text.find("\"Mid\"").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_matches_search_is_case_insensitive() {
        let r = record();
        assert!(r.matches_search("ada"));
        assert!(r.matches_search("algo"));
        assert!(!r.matches_search("zzz"));
    }
}
