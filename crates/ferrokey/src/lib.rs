#![doc = include_str!("../README.md")]

mod config;
mod dialect;
mod error;
mod factory;
mod generator;
mod holder;
mod insert;
mod jdbc;
mod memory;
mod schema;
mod value;

pub use crate::config::*;
pub use crate::dialect::*;
pub use crate::error::*;
pub use crate::factory::*;
pub use crate::generator::*;
pub use crate::holder::*;
pub use crate::insert::*;
pub use crate::jdbc::*;
pub use crate::memory::*;
pub use crate::schema::*;
pub use crate::value::*;
