//! SQLite-backed versioned cache stores.
//!
//! This module provides persistent, named cache stores using SQLite with
//! async access via tokio-rusqlite. It supports:
//!
//! - One named store per deployed version (`CacheDb` is the registry)
//! - Request-identity keys using SHA-256 hashing
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;
pub use stores::CacheStore;
