//! # Taskboard Shared Library
//!
//! This crate contains the entity models, query building, and validation
//! logic shared by the Taskboard API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their operations (tasks, users)
//! - `query`: List-query building (allow-lists, pagination, sorting, search)
//! - `validation`: Input normalization and field-level checks
//! - `db`: Connection pool management

pub mod db;
pub mod models;
pub mod query;
pub mod validation;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
