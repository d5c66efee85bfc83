//! An in-memory database speaking the SQL the built-in dialects emit.
//!
//! It stands in for a real driver in tests, benchmarks and the CLI.

mod database;
mod engine;
mod record;
mod sql;

pub use database::*;
pub use record::*;
