use crate::{
    config::{Properties, params},
    dialect::{Dialect, SqlType},
    error::{Error, Result},
    generator::{
        GenerationOutcome, GeneratorKey, IdentifierGenerator, PersistentIdentifierGenerator,
        helper,
        hilo::{self, LockedHiLo, fetch_positive},
        table::CounterRow,
    },
    holder::IntegralDataTypeHolder,
    jdbc::{Connection, Entity, Session, SessionExt, SqlValue},
    value::IdentifierType,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub const DEFAULT_TABLE: &str = "hibernate_sequences";
pub const DEFAULT_PRIMARY_KEY_COLUMN: &str = "sequence_name";
pub const DEFAULT_VALUE_COLUMN: &str = "sequence_next_hi_value";
pub const DEFAULT_PRIMARY_KEY_LENGTH: i64 = 255;
pub const DEFAULT_MAX_LO: i64 = i16::MAX as i64;

/// The `multiple-hilo` strategy: hi/lo over one row per key in a shared
/// table.
///
/// The key defaults to the mapped target table, so every entity table gets
/// its own hi counter inside `hibernate_sequences`.
pub struct MultipleHiLoPerTableGenerator {
    table_name: String,
    primary_key_column: String,
    value_column: String,
    key_value: String,
    key_length: u32,
    max_lo: i64,
    identifier_type: IdentifierType,
    counter: Option<CounterRow>,
    state: LockedHiLo,
}

impl Default for MultipleHiLoPerTableGenerator {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE.to_owned(),
            primary_key_column: DEFAULT_PRIMARY_KEY_COLUMN.to_owned(),
            value_column: DEFAULT_VALUE_COLUMN.to_owned(),
            key_value: String::new(),
            key_length: DEFAULT_PRIMARY_KEY_LENGTH as u32,
            max_lo: DEFAULT_MAX_LO,
            identifier_type: IdentifierType::Long,
            counter: None,
            state: LockedHiLo::new(DEFAULT_MAX_LO),
        }
    }
}

impl MultipleHiLoPerTableGenerator {
    /// Uses the `hibernate_sequences` table; `configure` picks the row key.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The primary key value selecting this generator's row.
    pub fn key_value(&self) -> &str {
        &self.key_value
    }

    /// Block size minus one; values below 1 disable blocking.
    pub fn max_lo(&self) -> i64 {
        self.max_lo
    }

    fn fetch_hi(&self, session: &dyn Session) -> Result<IntegralDataTypeHolder> {
        let counter = self.counter.as_ref().ok_or_else(|| {
            Error::generation("multiple-hilo generator used before it was configured")
        })?;
        session.isolated_work(|conn: &mut dyn Connection| {
            counter.fetch_and_advance(conn, self.identifier_type)
        })
    }
}

impl IdentifierGenerator for MultipleHiLoPerTableGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        self.table_name = helper::qualify(
            params.get(params::CATALOG),
            params.get(params::SCHEMA),
            params.get_or(params::TABLE, DEFAULT_TABLE),
        );
        self.primary_key_column = params
            .get_or(params::PRIMARY_KEY_COLUMN, DEFAULT_PRIMARY_KEY_COLUMN)
            .to_owned();
        self.value_column = params
            .get_or(params::VALUE_COLUMN, DEFAULT_VALUE_COLUMN)
            .to_owned();
        self.key_value = params
            .get(params::PRIMARY_KEY_VALUE)
            .or_else(|| params.get(params::TARGET_TABLE))
            .ok_or_else(|| {
                Error::mapping(format!(
                    "multiple-hilo generator needs [{}] or [{}]",
                    params::PRIMARY_KEY_VALUE,
                    params::TARGET_TABLE
                ))
            })?
            .to_owned();
        let key_length =
            params.get_int(params::PRIMARY_KEY_LENGTH, DEFAULT_PRIMARY_KEY_LENGTH)?;
        self.key_length = u32::try_from(key_length)
            .ok()
            .filter(|len| *len > 0)
            .ok_or_else(|| {
                Error::mapping(format!(
                    "[{}] must be a positive length, was {key_length}",
                    params::PRIMARY_KEY_LENGTH
                ))
            })?;
        self.max_lo = hilo::max_lo(params, DEFAULT_MAX_LO)?;
        self.identifier_type = ty;
        helper::holder_for(ty)?;

        let (table, pk, value) = (&self.table_name, &self.primary_key_column, &self.value_column);
        self.counter = Some(CounterRow {
            select_sql: format!(
                "select {value} from {} where {pk} = ?{}",
                dialect.append_lock_hint(table),
                dialect.for_update_string()
            ),
            update_sql: format!("update {table} set {value} = ? where {value} = ? and {pk} = ?"),
            insert_sql: format!("insert into {table} ({pk}, {value}) values (?, ?)"),
            key: Some(SqlValue::Text(self.key_value.clone())),
        });
        self.state = LockedHiLo::new(self.max_lo);
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        let value = if self.max_lo < 1 {
            fetch_positive(|| self.fetch_hi(session))?
        } else {
            self.state.next(|| self.fetch_hi(session))?
        };
        Ok(GenerationOutcome::Value(value))
    }

    fn as_persistent(&self) -> Option<&dyn PersistentIdentifierGenerator> {
        Some(self)
    }
}

impl PersistentIdentifierGenerator for MultipleHiLoPerTableGenerator {
    fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} {} ( {} {}, {} {} ){}",
            dialect.create_table_string(),
            self.table_name,
            self.primary_key_column,
            dialect.type_name(SqlType::Varchar(self.key_length)),
            self.value_column,
            dialect.type_name(SqlType::Integer),
            dialect.table_type_string()
        )])
    }

    fn sql_drop_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        Ok(vec![dialect.drop_table_string(&self.table_name)])
    }

    fn generator_key(&self) -> GeneratorKey {
        GeneratorKey::new(self.table_name.clone())
    }
}
