use crate::{
    dialect::{Dialect, SqlType},
    error::Result,
};

/// MySQL: `auto_increment` identity columns, no sequences.
#[derive(Clone, Copy, Debug, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supports_identity_columns(&self) -> bool {
        true
    }

    fn identity_column_string(&self) -> Result<&'static str> {
        Ok("not null auto_increment")
    }

    fn identity_select_string(&self, _table: &str, _column: &str) -> Result<String> {
        Ok("select last_insert_id()".to_owned())
    }

    fn select_guid_string(&self) -> Result<String> {
        Ok("select uuid()".to_owned())
    }

    fn table_type_string(&self) -> &'static str {
        " engine=InnoDB"
    }

    fn type_name(&self, ty: SqlType) -> String {
        match ty {
            SqlType::SmallInt => "smallint".to_owned(),
            SqlType::Integer => "integer".to_owned(),
            SqlType::BigInt => "bigint".to_owned(),
            SqlType::Numeric => "decimal(38, 0)".to_owned(),
            SqlType::Varchar(length) => format!("varchar({length})"),
        }
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "() values ( )"
    }
}
