//! Read-only projections over a cached record set
//!
//! Every function here takes the records by shared slice and builds a new
//! value; nothing writes back to the store.

use crate::pagination::{calculate_pagination, DEFAULT_PAGE_SIZE};
use crate::record::EnrollmentRecord;
use crate::time::{month_key, month_label, parse_sheet_date};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Colors assigned to categories in order of first appearance
pub const CATEGORY_PALETTE: [&str; 6] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4",
];

/// Number of monthly buckets the trend view keeps
pub const TREND_MONTHS: usize = 6;

/// Cap on student search results
pub const STUDENT_SEARCH_LIMIT: usize = 20;

/// Headline counts for the overview cards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_enrollments: usize,
    pub active_students: usize,
    pub completed_courses: usize,
    /// Mean `progress`; 0 for an empty set
    pub avg_progress: f64,
}

pub fn overview(records: &[EnrollmentRecord]) -> OverviewStats {
    let total_enrollments = records.len();
    let active_students = records.iter().filter(|r| r.status == "Active").count();
    let completed_courses = records.iter().filter(|r| r.status == "Completed").count();
    let avg_progress = if total_enrollments == 0 {
        0.0
    } else {
        records.iter().map(|r| r.progress as f64).sum::<f64>() / total_enrollments as f64
    };

    OverviewStats {
        total_enrollments,
        active_students,
        completed_courses,
        avg_progress,
    }
}

/// Filter, sort and page parameters for the recent list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentQuery {
    /// Substring matched against name, email and course; empty matches all
    pub search: String,
    /// Exact status (case-insensitive); `None` matches all
    pub status: Option<String>,
    pub limit: usize,
    pub page: usize,
}

impl Default for RecentQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            limit: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl RecentQuery {
    /// Build from request values; `"all"` or an empty status disables the filter
    pub fn new(search: &str, status: &str, limit: usize, page: usize) -> Self {
        let status = status.trim();
        Self {
            search: search.trim().to_string(),
            status: (!status.is_empty() && !status.eq_ignore_ascii_case("all"))
                .then(|| status.to_string()),
            limit,
            page,
        }
    }
}

/// One page of the recent list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPage {
    pub enrollments: Vec<EnrollmentRecord>,
    /// Records in the cache before filtering
    pub total: usize,
    /// Records left after filtering
    pub filtered: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

pub fn recent(records: &[EnrollmentRecord], query: &RecentQuery) -> RecentPage {
    let needle = query.search.to_lowercase();
    let status = query.status.as_deref().map(str::to_lowercase);

    let mut matched: Vec<(Option<NaiveDate>, &EnrollmentRecord)> = records
        .iter()
        .filter(|r| needle.is_empty() || r.matches_search(&needle))
        .filter(|r| match &status {
            Some(status) => r.status.to_lowercase() == *status,
            None => true,
        })
        .map(|r| (parse_sheet_date(&r.enrollment_date), r))
        .collect();

    // Newest first; unreadable dates after every readable one
    matched.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let filtered = matched.len();
    let pagination = calculate_pagination(filtered, query.page, query.limit);
    let enrollments = matched
        .into_iter()
        .skip(pagination.offset)
        .take(query.limit)
        .map(|(_, r)| r.clone())
        .collect();

    RecentPage {
        enrollments,
        total: records.len(),
        filtered,
        page: pagination.page,
        limit: query.limit,
        total_pages: pagination.total_pages,
    }
}

/// Share of records in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: usize,
    pub color: &'static str,
    /// Percent of all records, one decimal
    pub percentage: String,
}

/// Category distribution in order of first appearance
pub fn categories(records: &[EnrollmentRecord]) -> Vec<CategoryShare> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in records {
        let name = if record.category.is_empty() {
            "Other"
        } else {
            record.category.as_str()
        };
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 += 1,
            None => counts.push((name, 1)),
        }
    }

    let total = records.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(index, (name, value))| CategoryShare {
            name: name.to_string(),
            value,
            color: CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()],
            percentage: format!("{:.1}", value as f64 / total * 100.0),
        })
        .collect()
}

/// Enrollments for one calendar month
///
/// `new_students` and `completions` are fixed fractions of `enrollments`
/// (70% and 80%); the sheet carries no column for either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    /// `YYYY-MM`
    pub period: String,
    /// e.g. `Dec 2024`
    pub month: String,
    pub enrollments: usize,
    pub new_students: usize,
    pub completions: usize,
}

/// Monthly enrollment counts, oldest first, at most [`TREND_MONTHS`] buckets
///
/// Records whose enrollment date cannot be read are left out.
pub fn trends(records: &[EnrollmentRecord]) -> Vec<TrendBucket> {
    let mut months: BTreeMap<String, (NaiveDate, usize)> = BTreeMap::new();
    for date in records
        .iter()
        .filter_map(|r| parse_sheet_date(&r.enrollment_date))
    {
        months.entry(month_key(date)).or_insert((date, 0)).1 += 1;
    }

    let skip = months.len().saturating_sub(TREND_MONTHS);
    months
        .into_iter()
        .skip(skip)
        .map(|(period, (date, enrollments))| TrendBucket {
            period,
            month: month_label(date),
            enrollments,
            new_students: enrollments * 7 / 10,
            completions: enrollments * 8 / 10,
        })
        .collect()
}

/// Key list of the first record, empty when there are no records
pub fn field_names(records: &[EnrollmentRecord]) -> Vec<String> {
    records
        .first()
        .map(EnrollmentRecord::field_names)
        .unwrap_or_default()
}

pub fn find_student(records: &[EnrollmentRecord], id: u64) -> Option<&EnrollmentRecord> {
    records.iter().find(|r| r.id == id)
}

/// Name/email/course search capped at [`STUDENT_SEARCH_LIMIT`]; blank query matches nothing
pub fn search_students(records: &[EnrollmentRecord], query: &str) -> Vec<EnrollmentRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.matches_search(&needle))
        .take(STUDENT_SEARCH_LIMIT)
        .cloned()
        .collect()
}

/// Integer with thousands separators: `1234567` → `1,234,567`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Normalizer, ProgressFallback};
    use crate::record::RawRow;

    fn records(rows: &[&[(&str, &str)]]) -> Vec<EnrollmentRecord> {
        let rows: Vec<RawRow> = rows.iter().map(|r| r.iter().copied().collect()).collect();
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Normalizer::new(today, ProgressFallback::Fixed(0)).normalize_all(&rows)
    }

    fn roster() -> Vec<EnrollmentRecord> {
        records(&[
            &[("Name", "Ada Lovelace"), ("Email", "ada@x.com"), ("Course", "Algorithms"),
              ("Status", "Active"), ("Progress", "40"), ("Category", "Math"), ("Date", "2024-11-02")],
            &[("Name", "Grace Hopper"), ("Email", "grace@navy.mil"), ("Course", "Compilers"),
              ("Status", "Completed"), ("Progress", "100"), ("Category", "CS"), ("Date", "2024-12-10")],
            &[("Name", "Alan Turing"), ("Email", "alan@x.com"), ("Course", "Computability"),
              ("Status", "active"), ("Progress", "70"), ("Category", "Math"), ("Date", "not a date")],
        ])
    }

    #[test]
    fn test_overview_counts() {
        let stats = overview(&roster());
        assert_eq!(stats.total_enrollments, 3);
        // Exact match: "active" is not "Active"
        assert_eq!(stats.active_students, 1);
        assert_eq!(stats.completed_courses, 1);
        assert!((stats.avg_progress - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overview_empty_average_is_zero() {
        let stats = overview(&[]);
        assert_eq!(stats.total_enrollments, 0);
        assert_eq!(stats.avg_progress, 0.0);
    }

    #[test]
    fn test_recent_search_matches_any_field() {
        let page = recent(&roster(), &RecentQuery::new("ADA", "all", 50, 1));
        assert_eq!(page.filtered, 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.enrollments[0].student_name, "Ada Lovelace");

        let page = recent(&roster(), &RecentQuery::new("navy", "", 50, 1));
        assert_eq!(page.enrollments[0].student_name, "Grace Hopper");
    }

    #[test]
    fn test_recent_status_filter_case_insensitive() {
        let page = recent(&roster(), &RecentQuery::new("", "ACTIVE", 50, 1));
        assert_eq!(page.filtered, 2);
    }

    #[test]
    fn test_recent_sorted_newest_first_unreadable_last() {
        let page = recent(&roster(), &RecentQuery::default());
        let names: Vec<&str> = page.enrollments.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Grace Hopper", "Ada Lovelace", "Alan Turing"]);
    }

    #[test]
    fn test_recent_limit_and_page() {
        let first = recent(&roster(), &RecentQuery::new("", "all", 2, 1));
        assert_eq!(first.enrollments.len(), 2);
        assert_eq!(first.filtered, 3);
        assert_eq!(first.total_pages, 2);

        let second = recent(&roster(), &RecentQuery::new("", "all", 2, 2));
        assert_eq!(second.enrollments.len(), 1);
        assert_eq!(second.enrollments[0].student_name, "Alan Turing");

        let clamped = recent(&roster(), &RecentQuery::new("", "all", 2, 9));
        assert_eq!(clamped.page, 2);
    }

    #[test]
    fn test_recent_zero_limit_is_empty() {
        let page = recent(&roster(), &RecentQuery::new("", "all", 0, 1));
        assert!(page.enrollments.is_empty());
        assert_eq!(page.filtered, 3);
    }

    #[test]
    fn test_categories_first_appearance_order() {
        let shares = categories(&roster());
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].name, "Math");
        assert_eq!(shares[0].value, 2);
        assert_eq!(shares[0].percentage, "66.7");
        assert_eq!(shares[0].color, "#3b82f6");
        assert_eq!(shares[1].name, "CS");
        assert_eq!(shares[1].percentage, "33.3");
        assert_eq!(shares[1].color, "#10b981");
    }

    #[test]
    fn test_categories_palette_cycles_and_blank_is_other() {
        let mut rs = roster();
        rs[0].category = String::new();
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        for (i, name) in names.iter().enumerate() {
            let mut r = rs[1].clone();
            r.id = 10 + i as u64;
            r.category = name.to_string();
            rs.push(r);
        }
        let shares = categories(&rs);
        assert_eq!(shares[0].name, "Other");
        assert_eq!(shares[6].color, CATEGORY_PALETTE[0]);
    }

    #[test]
    fn test_categories_empty() {
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_trends_last_six_months_ascending() {
        let dates = [
            "2024-01-05", "2024-02-05", "2024-03-05", "2024-04-05",
            "2024-05-05", "2024-06-05", "2024-07-05", "2024-07-20", "garbage",
        ];
        let rows: Vec<Vec<(&str, &str)>> = dates.iter().map(|d| vec![("Date", *d)]).collect();
        let row_refs: Vec<&[(&str, &str)]> = rows.iter().map(Vec::as_slice).collect();
        let buckets = trends(&records(&row_refs));

        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[0].period, "2024-02");
        assert_eq!(buckets[0].month, "Feb 2024");
        let last = buckets.last().unwrap();
        assert_eq!(last.period, "2024-07");
        assert_eq!(last.enrollments, 2);
        assert_eq!(last.new_students, 1);
        assert_eq!(last.completions, 1);
    }

    #[test]
    fn test_trend_estimates_floor() {
        let rows: Vec<Vec<(&str, &str)>> = (0..10).map(|_| vec![("Date", "2024-03-01")]).collect();
        let row_refs: Vec<&[(&str, &str)]> = rows.iter().map(Vec::as_slice).collect();
        let buckets = trends(&records(&row_refs));
        assert_eq!(buckets[0].new_students, 7);
        assert_eq!(buckets[0].completions, 8);
    }

    #[test]
    fn test_field_names_from_first_record() {
        assert!(field_names(&[]).is_empty());
        let names = field_names(&roster());
        assert!(names.contains(&"studentName".to_string()));
        assert!(names.contains(&"Name".to_string()));
    }

    #[test]
    fn test_find_and_search_students() {
        let rs = roster();
        assert_eq!(find_student(&rs, 2).map(|r| r.student_name.as_str()), Some("Grace Hopper"));
        assert!(find_student(&rs, 99).is_none());
        assert_eq!(search_students(&rs, "x.com").len(), 2);
        assert!(search_students(&rs, "  ").is_empty());
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
