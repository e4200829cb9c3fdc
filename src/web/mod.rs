pub mod admin;
pub mod auth;
pub mod categories;
pub mod materials;
pub mod responses;
pub mod router;
pub mod state;
pub mod storage;
pub mod teachers;
pub mod uploads;

pub use responses::{ApiError, ApiSuccess, json_error};
pub use state::AppState;
