mod h2;
mod interface;
mod mysql;
mod postgres;
mod sqlserver;

use std::sync::Arc;

pub use h2::*;
pub use interface::*;
pub use mysql::*;
pub use postgres::*;
pub use sqlserver::*;

use crate::error::{Error, Result};

/// Resolves a built-in dialect by name (`h2`, `postgresql`, `mysql`,
/// `sqlserver`).
///
/// # Errors
///
/// Returns [`Error::Mapping`] for unknown names.
pub fn dialect_for_name(name: &str) -> Result<Arc<dyn Dialect>> {
    let dialect: Arc<dyn Dialect> = match name.trim().to_ascii_lowercase().as_str() {
        "h2" => Arc::new(H2Dialect),
        "postgres" | "postgresql" | "pg" => Arc::new(PostgreSqlDialect),
        "mysql" => Arc::new(MySqlDialect),
        "sqlserver" | "mssql" => Arc::new(SqlServerDialect),
        other => return Err(Error::mapping(format!("unknown dialect [{other}]"))),
    };
    Ok(dialect)
}
