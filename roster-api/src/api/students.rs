//! Student lookup endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use roster_common::normalize::parse_leading_int;
use roster_common::query;
use roster_common::EnrollmentRecord;
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub students: Vec<EnrollmentRecord>,
}

/// GET /api/students/search?q=
///
/// Empty or missing `q` returns no students.
pub async fn search_students(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let snapshot = state.store.snapshot().await;
    let students = query::search_students(&snapshot.records, params.q.as_deref().unwrap_or(""));
    Json(SearchResponse { students })
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub student: EnrollmentRecord,
}

/// GET /api/students/:id
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StudentResponse>> {
    let not_found = || ApiError::NotFound("Student not found".to_string());

    // Leading digits are the id, so `2abc` and `1.0` still resolve
    let id = parse_leading_int(&id)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(not_found)?;

    let snapshot = state.store.snapshot().await;
    let student = query::find_student(&snapshot.records, id)
        .cloned()
        .ok_or_else(not_found)?;

    Ok(Json(StudentResponse { student }))
}
