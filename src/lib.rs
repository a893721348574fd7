//! ParcelPoint Admin Client Library
//!
//! Typed client and view-controller layer for the ParcelPoint warehouse
//! admin REST API: package list/detail management, partial updates with
//! optional image upload, package creation, and the service-request
//! status workflow.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod uploads;
pub mod workflow;

pub use client::WarehouseClient;
pub use errors::{AdminError, AdminResult};
pub use store::PackageStore;
pub use workflow::PackageAdminView;

pub mod prelude {
    pub use crate::auth::*;
    pub use crate::client::WarehouseClient;
    pub use crate::errors::*;
    pub use crate::models::*;
    pub use crate::store::PackageStore;
    pub use crate::uploads::*;
    pub use crate::workflow::*;
}
