pub mod config;
pub mod seed;
pub mod store;
pub mod web;

pub use config::PortalConfig;
pub use store::Store;
pub use web::{AppState, router::build_router};
