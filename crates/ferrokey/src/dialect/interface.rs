use core::fmt;

use crate::error::{Error, Result};

/// Column types the generators need DDL names for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    SmallInt,
    Integer,
    BigInt,
    Numeric,
    Varchar(u32),
}

/// Database-product specific SQL syntax used by identifier generation.
///
/// Every method has a conservative default so a dialect only overrides the
/// capabilities its database actually has.
pub trait Dialect: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn supports_sequences(&self) -> bool {
        false
    }

    /// The query returning the next value of `sequence` as a single column.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Mapping`] when sequences are unsupported.
    fn sequence_next_val_string(&self, sequence: &str) -> Result<String> {
        Err(unsupported(self.name(), "sequences", sequence))
    }

    /// # Errors
    ///
    /// Fails with [`Error::Mapping`] when sequences are unsupported.
    fn create_sequence_strings(
        &self,
        sequence: &str,
        _initial_value: i64,
        _increment: i64,
    ) -> Result<Vec<String>> {
        Err(unsupported(self.name(), "sequences", sequence))
    }

    /// # Errors
    ///
    /// Fails with [`Error::Mapping`] when sequences are unsupported.
    fn drop_sequence_strings(&self, sequence: &str) -> Result<Vec<String>> {
        Err(unsupported(self.name(), "sequences", sequence))
    }

    fn supports_identity_columns(&self) -> bool {
        false
    }

    /// The column-definition suffix declaring an identity column.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Mapping`] when identity columns are unsupported.
    fn identity_column_string(&self) -> Result<&'static str> {
        Err(unsupported(self.name(), "identity columns", ""))
    }

    /// The query retrieving the identity value generated by the last insert
    /// on the current connection.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Mapping`] when identity columns are unsupported.
    fn identity_select_string(&self, table: &str, _column: &str) -> Result<String> {
        Err(unsupported(self.name(), "identity columns", table))
    }

    /// The value to insert into an identity column, or `None` to omit the
    /// column from the insert.
    fn identity_insert_string(&self) -> Option<&'static str> {
        None
    }

    /// Whether an insert can return the generated identity as a result set.
    fn supports_insert_select_identity(&self) -> bool {
        false
    }

    /// Rewrites `insert` so that executing it yields the generated identity.
    fn append_identity_select_to_insert(&self, insert: &str, _column: &str) -> String {
        insert.to_owned()
    }

    /// Suffix acquiring a pessimistic write lock on selected rows.
    fn for_update_string(&self) -> &'static str {
        " for update"
    }

    /// Table reference carrying a lock hint, for dialects that lock through
    /// table hints rather than [`Self::for_update_string`].
    fn append_lock_hint(&self, table: &str) -> String {
        table.to_owned()
    }

    /// The query returning a database-generated GUID.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Mapping`] when the database cannot generate GUIDs.
    fn select_guid_string(&self) -> Result<String> {
        Err(unsupported(self.name(), "GUID generation", ""))
    }

    fn create_table_string(&self) -> &'static str {
        "create table"
    }

    fn table_type_string(&self) -> &'static str {
        ""
    }

    fn drop_table_string(&self, table: &str) -> String {
        format!("drop table if exists {table}")
    }

    fn type_name(&self, ty: SqlType) -> String {
        match ty {
            SqlType::SmallInt => "smallint".to_owned(),
            SqlType::Integer => "integer".to_owned(),
            SqlType::BigInt => "bigint".to_owned(),
            SqlType::Numeric => "numeric(38, 0)".to_owned(),
            SqlType::Varchar(length) => format!("varchar({length})"),
        }
    }

    /// Insert tail used when a row has no explicit column values.
    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
    }

    /// The strategy the `native` generator resolves to.
    fn native_identifier_generator_strategy(&self) -> &'static str {
        if self.supports_identity_columns() {
            "identity"
        } else if self.supports_sequences() {
            "sequence"
        } else {
            "hilo"
        }
    }
}

fn unsupported(dialect: &str, feature: &str, object: &str) -> Error {
    if object.is_empty() {
        Error::mapping(format!("Dialect [{dialect}] does not support {feature}"))
    } else {
        Error::mapping(format!(
            "Dialect [{dialect}] does not support {feature} [{object}]"
        ))
    }
}
