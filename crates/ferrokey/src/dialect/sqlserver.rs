use crate::{
    dialect::{Dialect, SqlType},
    error::Result,
};

/// SQL Server: identity columns, trailing `scope_identity()` selects and
/// table lock hints instead of `for update`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn supports_identity_columns(&self) -> bool {
        true
    }

    fn identity_column_string(&self) -> Result<&'static str> {
        Ok("identity not null")
    }

    fn identity_select_string(&self, _table: &str, _column: &str) -> Result<String> {
        Ok("select scope_identity()".to_owned())
    }

    fn supports_insert_select_identity(&self) -> bool {
        true
    }

    fn append_identity_select_to_insert(&self, insert: &str, _column: &str) -> String {
        format!("{insert} select scope_identity()")
    }

    fn for_update_string(&self) -> &'static str {
        ""
    }

    fn append_lock_hint(&self, table: &str) -> String {
        format!("{table} with (updlock, rowlock)")
    }

    fn select_guid_string(&self) -> Result<String> {
        Ok("select newid()".to_owned())
    }

    fn drop_table_string(&self, table: &str) -> String {
        format!("drop table {table}")
    }

    fn type_name(&self, ty: SqlType) -> String {
        match ty {
            SqlType::SmallInt => "smallint".to_owned(),
            SqlType::Integer => "int".to_owned(),
            SqlType::BigInt => "bigint".to_owned(),
            SqlType::Numeric => "numeric(38, 0)".to_owned(),
            SqlType::Varchar(length) => format!("varchar({length})"),
        }
    }
}
