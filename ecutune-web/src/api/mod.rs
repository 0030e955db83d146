//! HTTP API handlers for ecutune-web

pub mod admin;
pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod leads;
pub mod selector;
pub mod vehicles;

pub use admin::{get_lead, list_leads, update_lead_status, vehicle_stats};
pub use auth::admin_auth_middleware;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use leads::submit_lead;
pub use selector::{apply_choice, get_selector};
pub use vehicles::{list_brands, list_fuels, list_models, list_versions};
