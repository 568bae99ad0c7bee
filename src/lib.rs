//! Core library surface for the dbform application.
//!
//! The public modules exposed here keep the API intentionally small: the
//! binary target wires them together, and the tests exercise the persistence
//! and seeding layers directly through the same re-exports.
pub mod cli;
pub mod db;
pub mod models;
pub mod seed;
pub mod ui;

/// Startup options and their validated form.
pub use cli::{Cli, Launch};

/// The persistence layer: one store per table, typed errors.
pub use db::{Store, StoreError};

/// The domain types threaded through every operation.
pub use models::{Column, ColumnType, Record, Schema, SearchCriteria, Value};

/// CSV bootstrap for a fresh table.
pub use seed::{seed_database, SeedError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
