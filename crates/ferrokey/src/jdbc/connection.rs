use crate::jdbc::{Row, SqlValue};

/// An error raised by the database driver for a single statement.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SqlError {
    pub message: String,
    /// Vendor or ANSI SQL state, when the driver reports one.
    pub sql_state: Option<String>,
}

impl SqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
        }
    }

    pub fn with_state(message: impl Into<String>, sql_state: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: Some(sql_state.into()),
        }
    }
}

/// A minimal statement-execution interface over a database connection.
///
/// Parameters are positional (`?` placeholders, bound in order). All three
/// calls run a single statement; multi-statement text is driver-defined.
pub trait Connection {
    /// Executes a statement that produces a result set.
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, SqlError>;

    /// Executes a DML or DDL statement, returning the affected row count.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, SqlError>;

    /// Executes an insert and returns the driver's generated-keys set for
    /// `key_columns`.
    fn execute_returning_keys(
        &mut self,
        sql: &str,
        params: &[SqlValue],
        key_columns: &[&str],
    ) -> Result<Vec<Row>, SqlError>;
}
