//! Inventory backend API module
//!
//! A thin JSON-over-HTTP client for the externally owned REST backend. The
//! backend's schema, auth and persistence are not modelled here; requests
//! mirror each entity's create payload.

pub mod client;
pub mod config;
pub mod operations;

pub use client::{ApiClient, EntityApi};
pub use config::ClientConfig;
pub use operations::Operation;
