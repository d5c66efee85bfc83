use std::sync::Arc;

use crate::dialect::Dialect;

/// An `insert` statement builder aware of database-generated identifiers.
///
/// Identity columns are either given the dialect's identity insert value or
/// left out of the column list, and when configured with
/// [`Self::select_identity`] the dialect's insert-select rewrite is applied
/// so executing the statement yields the generated key.
#[derive(Clone, Debug)]
pub struct IdentifierGeneratingInsert {
    dialect: Arc<dyn Dialect>,
    table_name: String,
    columns: Vec<(String, String)>,
    identity_column: Option<String>,
    select_identity: bool,
}

impl IdentifierGeneratingInsert {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            table_name: String::new(),
            columns: Vec::new(),
            identity_column: None,
            select_identity: false,
        }
    }

    /// An insert rewritten to return the generated identity.
    pub fn select_identity(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            select_identity: true,
            ..Self::new(dialect)
        }
    }

    pub fn set_table_name(&mut self, table_name: impl Into<String>) -> &mut Self {
        self.table_name = table_name.into();
        self
    }

    /// Adds a column bound to a positional parameter.
    pub fn add_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.add_column_with_value(column, "?")
    }

    pub fn add_columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.add_column(column);
        }
        self
    }

    /// Adds a column with a literal SQL value.
    pub fn add_column_with_value(
        &mut self,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    /// Declares the identity column.
    pub fn add_identity_column(&mut self, column: impl Into<String>) -> &mut Self {
        let column = column.into();
        if let Some(value) = self.dialect.identity_insert_string() {
            self.columns.push((column.clone(), value.to_owned()));
        }
        self.identity_column = Some(column);
        self
    }

    pub fn is_select_identity(&self) -> bool {
        self.select_identity
    }

    pub fn to_statement_string(&self) -> String {
        let mut sql = format!("insert into {}", self.table_name);
        if self.columns.is_empty() {
            sql.push(' ');
            sql.push_str(self.dialect.no_columns_insert_string());
        } else {
            let (names, values): (Vec<&str>, Vec<&str>) = self
                .columns
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .unzip();
            sql.push_str(&format!(
                " ({}) values ({})",
                names.join(", "),
                values.join(", ")
            ));
        }
        match (&self.identity_column, self.select_identity) {
            (Some(column), true) => self.dialect.append_identity_select_to_insert(&sql, column),
            _ => sql,
        }
    }
}
