//! # ecutune Common Library
//!
//! Shared code for the ecutune services including:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Database initialization and migrations
//! - Vehicle catalog queries and the cascading selector
//! - Lead capture and persistence
//! - Admin token verification

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod leads;
pub mod selector;
pub mod vehicles;

pub use error::{Error, Result};
pub use selector::{SelectError, SelectorView, VehicleSelection};
pub use vehicles::{Level, Vehicle, VehicleFilter};
