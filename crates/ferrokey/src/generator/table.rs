use crate::{
    config::{Properties, params},
    dialect::{Dialect, SqlType},
    error::Result,
    generator::{
        GenerationOutcome, GeneratorKey, IdentifierGenerator, PersistentIdentifierGenerator,
        helper,
    },
    holder::IntegralDataTypeHolder,
    jdbc::{Connection, Entity, Session, SessionExt, SqlValue, statement},
    value::IdentifierType,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub const DEFAULT_TABLE_NAME: &str = "hibernate_unique_key";
pub const DEFAULT_COLUMN_NAME: &str = "next_hi";

/// Read-then-conditionally-advance access to a counter row.
///
/// The row is read under a write lock, created with value 0 if missing,
/// and advanced with `update ... where value = <read value>`. Zero updated
/// rows means another transaction advanced it first, and the whole cycle is
/// retried.
#[derive(Clone, Debug)]
pub(crate) struct CounterRow {
    pub(crate) select_sql: String,
    pub(crate) update_sql: String,
    pub(crate) insert_sql: String,
    pub(crate) key: Option<SqlValue>,
}

impl CounterRow {
    /// Returns the value read before the increment.
    pub(crate) fn fetch_and_advance(
        &self,
        conn: &mut dyn Connection,
        ty: IdentifierType,
    ) -> Result<IntegralDataTypeHolder> {
        let key: Vec<SqlValue> = self.key.iter().cloned().collect();
        loop {
            let rows = statement::query(conn, &self.select_sql, &key, "could not read a hi value")
                .inspect_err(|_e| {
                    #[cfg(feature = "tracing")]
                    tracing::error!("could not read a hi value: {}", _e);
                })?;
            let mut value = helper::holder_for(ty)?;
            match rows.first() {
                Some(row) => {
                    value.initialize_from_row(row, 0, 0)?;
                }
                None => {
                    value.initialize(0);
                    let mut insert = key.clone();
                    value.bind(&mut insert)?;
                    statement::execute(conn, &self.insert_sql, &insert, "could not initialize a hi value")?;
                }
            }

            let mut next = value.copy();
            next.increment()?;
            let mut update = Vec::with_capacity(3);
            next.bind(&mut update)?;
            value.bind(&mut update)?;
            update.extend(key.iter().cloned());
            let updated =
                statement::execute(conn, &self.update_sql, &update, "could not update hi value")
                    .inspect_err(|_e| {
                        #[cfg(feature = "tracing")]
                        tracing::error!("could not update hi value: {}", _e);
                    })?;
            if updated > 0 {
                return Ok(value);
            }
            #[cfg(feature = "tracing")]
            tracing::debug!("hi value was advanced concurrently, retrying");
        }
    }
}

/// A single-row table counter (`table` strategy).
///
/// Each call reads the stored value in an isolated transaction, advances it
/// by one and returns the value read. Values start at 0.
#[derive(Debug)]
pub struct TableGenerator {
    table_name: String,
    column_name: String,
    identifier_type: IdentifierType,
    counter: CounterRow,
}

impl Default for TableGenerator {
    fn default() -> Self {
        let mut generator = Self {
            table_name: DEFAULT_TABLE_NAME.to_owned(),
            column_name: DEFAULT_COLUMN_NAME.to_owned(),
            identifier_type: IdentifierType::Long,
            counter: CounterRow {
                select_sql: String::new(),
                update_sql: String::new(),
                insert_sql: String::new(),
                key: None,
            },
        };
        generator.prepare(&crate::dialect::H2Dialect);
        generator
    }
}

impl TableGenerator {
    /// Defaults to `hibernate_unique_key.next_hi`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// The type hi values are read as.
    pub fn identifier_type(&self) -> IdentifierType {
        self.identifier_type
    }

    /// Reads and advances the counter in an isolated transaction.
    ///
    /// # Errors
    ///
    /// Propagates translated database errors.
    pub fn generate_holder(&self, session: &dyn Session) -> Result<IntegralDataTypeHolder> {
        session.isolated_work(|conn: &mut dyn Connection| {
            self.counter.fetch_and_advance(conn, self.identifier_type)
        })
    }

    fn prepare(&mut self, dialect: &dyn Dialect) {
        let column = &self.column_name;
        let table = &self.table_name;
        self.counter = CounterRow {
            select_sql: format!(
                "select {column} from {}{}",
                dialect.append_lock_hint(table),
                dialect.for_update_string()
            ),
            update_sql: format!("update {table} set {column} = ? where {column} = ?"),
            insert_sql: format!("insert into {table} values ( ? )"),
            key: None,
        };
    }
}

impl IdentifierGenerator for TableGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        self.table_name = helper::qualify(
            params.get(params::CATALOG),
            params.get(params::SCHEMA),
            params.get_or(params::TABLE, DEFAULT_TABLE_NAME),
        );
        self.column_name = params.get_or(params::COLUMN, DEFAULT_COLUMN_NAME).to_owned();
        self.identifier_type = ty;
        helper::holder_for(ty)?;
        self.prepare(dialect);
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        Ok(GenerationOutcome::Value(
            self.generate_holder(session)?.make_value()?,
        ))
    }

    fn as_persistent(&self) -> Option<&dyn PersistentIdentifierGenerator> {
        Some(self)
    }
}

impl PersistentIdentifierGenerator for TableGenerator {
    fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        Ok(vec![
            format!(
                "{} {} ( {} {} ){}",
                dialect.create_table_string(),
                self.table_name,
                self.column_name,
                dialect.type_name(SqlType::Integer),
                dialect.table_type_string()
            ),
            format!("insert into {} values ( 0 )", self.table_name),
        ])
    }

    fn sql_drop_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        Ok(vec![dialect.drop_table_string(&self.table_name)])
    }

    fn generator_key(&self) -> GeneratorKey {
        GeneratorKey::new(self.table_name.clone())
    }
}
