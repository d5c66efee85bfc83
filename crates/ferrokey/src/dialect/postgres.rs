use crate::{
    dialect::{Dialect, SqlType},
    error::Result,
};

/// PostgreSQL: sequences, identity columns and `insert ... returning`.
///
/// `native` resolves to sequences here, as identity columns are only a thin
/// layer over an implicit sequence.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostgreSqlDialect;

impl Dialect for PostgreSqlDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn sequence_next_val_string(&self, sequence: &str) -> Result<String> {
        Ok(format!("select nextval('{sequence}')"))
    }

    fn create_sequence_strings(
        &self,
        sequence: &str,
        initial_value: i64,
        increment: i64,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "create sequence {sequence} start {initial_value} increment {increment}"
        )])
    }

    fn drop_sequence_strings(&self, sequence: &str) -> Result<Vec<String>> {
        Ok(vec![format!("drop sequence if exists {sequence}")])
    }

    fn supports_identity_columns(&self) -> bool {
        true
    }

    fn identity_column_string(&self) -> Result<&'static str> {
        Ok("generated by default as identity")
    }

    fn identity_select_string(&self, _table: &str, _column: &str) -> Result<String> {
        Ok("select lastval()".to_owned())
    }

    fn identity_insert_string(&self) -> Option<&'static str> {
        Some("default")
    }

    fn supports_insert_select_identity(&self) -> bool {
        true
    }

    fn append_identity_select_to_insert(&self, insert: &str, column: &str) -> String {
        format!("{insert} returning {column}")
    }

    fn select_guid_string(&self) -> Result<String> {
        Ok("select gen_random_uuid()".to_owned())
    }

    fn type_name(&self, ty: SqlType) -> String {
        match ty {
            SqlType::SmallInt => "int2".to_owned(),
            SqlType::Integer => "int4".to_owned(),
            SqlType::BigInt => "int8".to_owned(),
            SqlType::Numeric => "numeric(38, 0)".to_owned(),
            SqlType::Varchar(length) => format!("varchar({length})"),
        }
    }

    fn native_identifier_generator_strategy(&self) -> &'static str {
        "sequence"
    }
}
