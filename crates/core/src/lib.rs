//! Core types and shared functionality for sw-cache.
//!
//! This crate provides:
//! - Versioned cache stores with a SQLite backend
//! - Request and response types shared by the strategies
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheDb, CacheStore, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
pub use request::{Destination, Request, Response};
