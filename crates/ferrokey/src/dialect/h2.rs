use crate::{dialect::Dialect, error::Result};

/// H2: sequences and identity columns, no insert-returning.
#[derive(Clone, Copy, Debug, Default)]
pub struct H2Dialect;

impl Dialect for H2Dialect {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn sequence_next_val_string(&self, sequence: &str) -> Result<String> {
        Ok(format!("call next value for {sequence}"))
    }

    fn create_sequence_strings(
        &self,
        sequence: &str,
        initial_value: i64,
        increment: i64,
    ) -> Result<Vec<String>> {
        Ok(vec![format!(
            "create sequence {sequence} start with {initial_value} increment by {increment}"
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
        Ok("call identity()".to_owned())
    }

    fn identity_insert_string(&self) -> Option<&'static str> {
        Some("default")
    }

    fn select_guid_string(&self) -> Result<String> {
        Ok("call random_uuid()".to_owned())
    }
}
