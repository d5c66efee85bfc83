//! Logged, error-translating wrappers around [`Connection`] calls.
//!
//! Every statement issued by a generator goes through here so that it is
//! logged on the `ferrokey::sql` target and driver errors come back as
//! [`Error::Jdbc`] carrying the failing SQL.

use crate::{
    error::{Error, Result},
    jdbc::{Connection, Row, SqlError, SqlValue},
};

pub(crate) fn query(
    conn: &mut dyn Connection,
    sql: &str,
    params: &[SqlValue],
    context: &str,
) -> Result<Vec<Row>> {
    log_statement(sql);
    conn.query(sql, params)
        .map_err(|source| translate(source, context, sql))
}

pub(crate) fn execute(
    conn: &mut dyn Connection,
    sql: &str,
    params: &[SqlValue],
    context: &str,
) -> Result<u64> {
    log_statement(sql);
    conn.execute(sql, params)
        .map_err(|source| translate(source, context, sql))
}

pub(crate) fn execute_returning_keys(
    conn: &mut dyn Connection,
    sql: &str,
    params: &[SqlValue],
    key_columns: &[&str],
    context: &str,
) -> Result<Vec<Row>> {
    log_statement(sql);
    conn.execute_returning_keys(sql, params, key_columns)
        .map_err(|source| translate(source, context, sql))
}

fn log_statement(_sql: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "ferrokey::sql", "{}", _sql);
}

pub(crate) fn translate(source: SqlError, context: &str, sql: &str) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        sql_state = source.sql_state.as_deref().unwrap_or("none"),
        "{}: {}",
        context,
        source
    );
    Error::Jdbc {
        message: context.to_owned(),
        sql: sql.to_owned(),
        source,
    }
}
