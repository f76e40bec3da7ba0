//! HTTP API handlers for roster-api

pub mod buildinfo;
pub mod debug;
pub mod enrollment;
pub mod health;
pub mod sheets;
pub mod students;
pub mod sync;

pub use buildinfo::get_build_info;
pub use debug::{probe_sheet_url, raw_csv_preview};
pub use enrollment::{
    enrollment_categories, enrollment_overview, enrollment_trends, recent_enrollments,
};
pub use health::health_routes;
pub use sheets::raw_sheet_data;
pub use students::{get_student, search_students};
pub use sync::trigger_sync;
