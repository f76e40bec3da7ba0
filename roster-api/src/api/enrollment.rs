//! Enrollment dashboard projections
//!
//! Each handler takes one cache snapshot and computes from it, so a response
//! never mixes two sync generations.

use axum::{
    extract::{Query, State},
    Json,
};
use roster_common::pagination::DEFAULT_PAGE_SIZE;
use roster_common::query::{self, CategoryShare, OverviewStats, RecentPage, RecentQuery, TrendBucket};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, AppState};

/// One overview card
///
/// The sheet has no history to compare against, so `change`, `changeType`
/// and `trend` are always sent as `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub title: &'static str,
    pub value: String,
    pub icon: &'static str,
    pub subtitle: &'static str,
    pub change: Option<String>,
    pub change_type: Option<String>,
    pub trend: Option<Vec<i64>>,
}

impl Kpi {
    fn new(title: &'static str, value: String, icon: &'static str, subtitle: &'static str) -> Self {
        Self {
            title,
            value,
            icon,
            subtitle,
            change: None,
            change_type: None,
            trend: None,
        }
    }
}

/// Overview response: raw numbers plus display-ready cards
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub summary: OverviewStats,
    pub kpis: Vec<Kpi>,
}

/// GET /api/enrollment/overview
pub async fn enrollment_overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    let snapshot = state.store.snapshot().await;
    let summary = query::overview(&snapshot.records);

    let kpis = vec![
        Kpi::new(
            "Total Enrollments",
            query::format_count(summary.total_enrollments),
            "Users",
            "From Google Sheets",
        ),
        Kpi::new(
            "Active Students",
            query::format_count(summary.active_students),
            "UserPlus",
            "Currently enrolled",
        ),
        Kpi::new(
            "Completed Courses",
            query::format_count(summary.completed_courses),
            "Award",
            "Successfully finished",
        ),
        Kpi::new(
            "Average Progress",
            format!("{}%", summary.avg_progress.round() as i64),
            "TrendingUp",
            "Course completion",
        ),
    ];

    Json(OverviewResponse { summary, kpis })
}

/// Query parameters for the recent list
///
/// Kept as strings so a malformed number gets a JSON 400 instead of the
/// extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

/// GET /api/enrollment/recent?limit=50&page=1&search=&status=all
pub async fn recent_enrollments(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> ApiResult<Json<RecentPage>> {
    let limit = parse_count("limit", params.limit.as_deref(), DEFAULT_PAGE_SIZE)?;
    let page = parse_count("page", params.page.as_deref(), 1)?;
    let recent_query = RecentQuery::new(
        params.search.as_deref().unwrap_or(""),
        params.status.as_deref().unwrap_or("all"),
        limit,
        page,
    );

    let snapshot = state.store.snapshot().await;
    Ok(Json(query::recent(&snapshot.records, &recent_query)))
}

/// Categories response
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryShare>,
}

/// GET /api/enrollment/categories
pub async fn enrollment_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let snapshot = state.store.snapshot().await;
    Json(CategoriesResponse {
        categories: query::categories(&snapshot.records),
    })
}

/// Query parameters for trends
#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub period: Option<String>,
}

/// Trends response
///
/// `estimated` flags that `newStudents` and `completions` are derived from
/// enrollment counts, not read from the sheet.
#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub period: String,
    pub estimated: bool,
    pub trends: Vec<TrendBucket>,
}

/// GET /api/enrollment/trends?period=6months
///
/// `period` is echoed back; the bucket count is always the last six months.
pub async fn enrollment_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Json<TrendsResponse> {
    let snapshot = state.store.snapshot().await;
    Json(TrendsResponse {
        period: params.period.unwrap_or_else(|| "6months".to_string()),
        estimated: true,
        trends: query::trends(&snapshot.records),
    })
}

fn parse_count(name: &str, raw: Option<&str>, default: usize) -> ApiResult<usize> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            ApiError::BadRequest(format!(
                "{} must be a non-negative integer, got '{}'",
                name, value
            ))
        }),
    }
}
