use portable_atomic::{AtomicU64, Ordering};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    config::{Properties, params},
    dialect::{Dialect, SqlType},
    error::{Error, Result},
    generator::{
        GenerationOutcome, GeneratorKey, IdentifierGenerator, PersistentIdentifierGenerator,
        enhanced::{Optimizer, OptimizerKind},
        helper,
    },
    holder::IntegralDataTypeHolder,
    jdbc::{Connection, Entity, Session, SessionExt, SqlValue, statement},
    value::IdentifierType,
};

pub const TABLE_PARAM: &str = "table_name";
pub const DEFAULT_TABLE: &str = "hibernate_sequences";
pub const VALUE_COLUMN_PARAM: &str = "value_column_name";
pub const DEFAULT_VALUE_COLUMN: &str = "next_val";
pub const SEGMENT_COLUMN_PARAM: &str = "segment_column_name";
pub const DEFAULT_SEGMENT_COLUMN: &str = "sequence_name";
pub const SEGMENT_VALUE_PARAM: &str = "segment_value";
pub const DEFAULT_SEGMENT_VALUE: &str = "default";
pub const SEGMENT_LENGTH_PARAM: &str = "segment_value_length";
pub const DEFAULT_SEGMENT_LENGTH: i64 = 255;
pub const INITIAL_PARAM: &str = "initial_value";
pub const DEFAULT_INITIAL_VALUE: i64 = 1;
pub const INCREMENT_PARAM: &str = "increment_size";
pub const DEFAULT_INCREMENT_SIZE: i64 = 1;
pub const OPTIMIZER_PARAM: &str = "optimizer";
pub const PREFER_SEGMENT_PER_ENTITY_PARAM: &str = "prefer_entity_table_as_segment_value";
pub const PREFER_POOLED_LO_PARAM: &str = "prefer_pooled_values_lo";

#[derive(Debug)]
struct Statements {
    select: String,
    update: String,
    insert: String,
}

/// The `enhanced-table` strategy: one counter row per segment in a shared
/// table, dispensed through an [`Optimizer`].
///
/// ```text
/// hibernate_sequences
/// +---------------+----------+
/// | sequence_name | next_val |
/// +---------------+----------+
/// | default       | 21       |
/// | orders        | 1001     |
/// +---------------+----------+
/// ```
#[derive(Debug)]
pub struct EnhancedTableGenerator {
    identifier_type: IdentifierType,
    table_name: String,
    segment_column_name: String,
    segment_value: String,
    segment_value_length: u32,
    value_column_name: String,
    initial_value: i64,
    increment_size: i64,
    statements: Option<Statements>,
    optimizer: Option<Optimizer>,
    access_count: AtomicU64,
}

impl Default for EnhancedTableGenerator {
    fn default() -> Self {
        Self {
            identifier_type: IdentifierType::Long,
            table_name: DEFAULT_TABLE.to_owned(),
            segment_column_name: DEFAULT_SEGMENT_COLUMN.to_owned(),
            segment_value: DEFAULT_SEGMENT_VALUE.to_owned(),
            segment_value_length: DEFAULT_SEGMENT_LENGTH as u32,
            value_column_name: DEFAULT_VALUE_COLUMN.to_owned(),
            initial_value: DEFAULT_INITIAL_VALUE,
            increment_size: DEFAULT_INCREMENT_SIZE,
            statements: None,
            optimizer: None,
            access_count: AtomicU64::new(0),
        }
    }
}

impl EnhancedTableGenerator {
    /// Defaults to `hibernate_sequences` with the `default` segment.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier_type(&self) -> IdentifierType {
        self.identifier_type
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn segment_column_name(&self) -> &str {
        &self.segment_column_name
    }

    /// The row this generator owns in the shared table.
    pub fn segment_value(&self) -> &str {
        &self.segment_value
    }

    /// Declared length of the segment column.
    pub fn segment_value_length(&self) -> u32 {
        self.segment_value_length
    }

    pub fn value_column_name(&self) -> &str {
        &self.value_column_name
    }

    /// The value seeded into a fresh segment row.
    pub fn initial_value(&self) -> i64 {
        self.initial_value
    }

    pub fn increment_size(&self) -> i64 {
        self.increment_size
    }

    /// `None` until configured.
    pub fn optimizer(&self) -> Option<&Optimizer> {
        self.optimizer.as_ref()
    }

    /// Number of completed table round-trips.
    pub fn table_access_count(&self) -> u64 {
        self.access_count.load(Ordering::Relaxed)
    }

    fn determine_segment_value(&self, params: &Properties) -> Result<String> {
        if let Some(value) = params.get(SEGMENT_VALUE_PARAM) {
            return Ok(value.to_owned());
        }
        let default = if params.get_bool(PREFER_SEGMENT_PER_ENTITY_PARAM, false)? {
            params.get_or(params::TARGET_TABLE, DEFAULT_SEGMENT_VALUE)
        } else {
            DEFAULT_SEGMENT_VALUE
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "explicit segment value for id generator [{}.{}] suggested; using default [{}]",
            self.table_name,
            self.segment_column_name,
            default
        );
        Ok(default.to_owned())
    }

    fn fetch_next(&self, conn: &mut dyn Connection, optimizer: &Optimizer) -> Result<IntegralDataTypeHolder> {
        let statements = self.statements.as_ref().ok_or_else(|| {
            Error::generation("enhanced table generator used before it was configured")
        })?;
        let segment = SqlValue::Text(self.segment_value.clone());
        loop {
            let rows = statement::query(
                conn,
                &statements.select,
                core::slice::from_ref(&segment),
                "could not read a hi value",
            )
            .inspect_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::error!("could not read a hi value: {}", _e);
            })?;
            let mut value = helper::holder_for(self.identifier_type)?;
            match rows.first() {
                Some(row) => {
                    value.initialize_from_row(row, 0, 0)?;
                }
                None => {
                    value.initialize(self.initial_value);
                    let mut insert = vec![segment.clone()];
                    value.bind(&mut insert)?;
                    statement::execute(
                        conn,
                        &statements.insert,
                        &insert,
                        "could not insert initial hi value",
                    )?;
                }
            }

            let mut next = value.copy();
            if optimizer.applies_increment_size_to_source_values() {
                next.add(self.increment_size)?;
            } else {
                next.increment()?;
            }
            let mut update = Vec::with_capacity(3);
            next.bind(&mut update)?;
            value.bind(&mut update)?;
            update.push(segment.clone());
            let updated = statement::execute(
                conn,
                &statements.update,
                &update,
                "could not update hi value",
            )
            .inspect_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::error!("could not update hi value in: {}", self.table_name);
            })?;
            if updated > 0 {
                self.access_count.fetch_add(1, Ordering::Relaxed);
                return Ok(value);
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                segment = %self.segment_value,
                "segment row was advanced concurrently, retrying"
            );
        }
    }
}

impl IdentifierGenerator for EnhancedTableGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        helper::holder_for(ty)?;
        self.identifier_type = ty;
        self.table_name = helper::qualify(
            params.get(params::CATALOG),
            params.get(params::SCHEMA),
            params.get_or(TABLE_PARAM, DEFAULT_TABLE),
        );
        self.segment_column_name = params
            .get_or(SEGMENT_COLUMN_PARAM, DEFAULT_SEGMENT_COLUMN)
            .to_owned();
        self.segment_value = self.determine_segment_value(params)?;
        let length = params.get_int(SEGMENT_LENGTH_PARAM, DEFAULT_SEGMENT_LENGTH)?;
        self.segment_value_length = u32::try_from(length)
            .ok()
            .filter(|len| *len > 0)
            .ok_or_else(|| {
                Error::mapping(format!(
                    "[{SEGMENT_LENGTH_PARAM}] must be a positive length, was {length}"
                ))
            })?;
        self.value_column_name = params
            .get_or(VALUE_COLUMN_PARAM, DEFAULT_VALUE_COLUMN)
            .to_owned();
        self.initial_value = params.get_int(INITIAL_PARAM, DEFAULT_INITIAL_VALUE)?;
        self.increment_size = params.get_int(INCREMENT_PARAM, DEFAULT_INCREMENT_SIZE)?;

        let (table, segment, value) = (
            &self.table_name,
            &self.segment_column_name,
            &self.value_column_name,
        );
        self.statements = Some(Statements {
            select: format!(
                "select {value} from {} where {segment} = ?{}",
                dialect.append_lock_hint(table),
                dialect.for_update_string()
            ),
            update: format!("update {table} set {value} = ? where {value} = ? and {segment} = ?"),
            insert: format!("insert into {table} ({segment}, {value}) values (?, ?)"),
        });

        let default_kind = if self.increment_size <= 1 {
            OptimizerKind::None
        } else if params.get_bool(PREFER_POOLED_LO_PARAM, false)? {
            OptimizerKind::PooledLo
        } else {
            OptimizerKind::Pooled
        };
        let kind = match params.get(OPTIMIZER_PARAM) {
            Some(name) => name.parse()?,
            None => default_kind,
        };
        self.optimizer = Some(Optimizer::new(
            kind,
            ty,
            self.increment_size,
            params.get_int(INITIAL_PARAM, -1)?,
        )?);
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        let optimizer = self.optimizer.as_ref().ok_or_else(|| {
            Error::generation("enhanced table generator used before it was configured")
        })?;
        let value = optimizer.generate(&mut || {
            session.isolated_work(|conn: &mut dyn Connection| self.fetch_next(conn, optimizer))
        })?;
        Ok(GenerationOutcome::Value(value))
    }

    fn as_persistent(&self) -> Option<&dyn PersistentIdentifierGenerator> {
        Some(self)
    }
}

impl PersistentIdentifierGenerator for EnhancedTableGenerator {
    fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        Ok(vec![format!(
            "{} {} ( {} {} not null, {} {}, primary key ( {} ) ){}",
            dialect.create_table_string(),
            self.table_name,
            self.segment_column_name,
            dialect.type_name(SqlType::Varchar(self.segment_value_length)),
            self.value_column_name,
            dialect.type_name(SqlType::BigInt),
            self.segment_column_name,
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
