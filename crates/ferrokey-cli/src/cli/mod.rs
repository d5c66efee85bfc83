//! Command handling for `ferrokey-cli`.
//!
//! ## Structure
//!
//! - [`config`] - command line parsing and validation (`AppConfig`).
//! - [`mapping`] - the JSON entity mapping file.
//! - [`commands`] - `schema` and `generate`.
//! - [`telemetry`] - log subscriber setup.

pub mod commands;
pub mod config;
pub mod mapping;
pub mod telemetry;
