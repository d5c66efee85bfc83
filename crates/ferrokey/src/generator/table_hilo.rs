use crate::{
    config::Properties,
    dialect::Dialect,
    error::Result,
    generator::{
        GenerationOutcome, GeneratorKey, IdentifierGenerator, PersistentIdentifierGenerator,
        TableGenerator,
        hilo::{self, LockedHiLo, fetch_positive},
    },
    jdbc::{Entity, Session},
    value::IdentifierType,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub const DEFAULT_MAX_LO: i64 = i16::MAX as i64;

/// The `hilo` strategy: a [`TableGenerator`] supplying hi values to the
/// legacy hi/lo algorithm.
///
/// With `max_lo = 3` and a counter at 1 the generator yields `4, 5, 6, 7`
/// and then fetches again. A `max_lo` below 1 fetches on every call.
///
/// # Example
///
/// ```
/// use ferrokey::{
///     H2Dialect, IdentifierGenerator, IdentifierType, MemoryDatabase,
///     PersistentIdentifierGenerator, Properties, Record, TableHiLoGenerator, params,
/// };
///
/// let mut generator = TableHiLoGenerator::new();
/// generator.configure(
///     IdentifierType::Long,
///     &Properties::new().with(params::MAX_LO, "3"),
///     &H2Dialect,
/// )?;
///
/// let db = MemoryDatabase::new();
/// db.execute_script(&generator.sql_create_strings(&H2Dialect)?)?;
/// db.execute_script(&["update hibernate_unique_key set next_hi = 1"])?;
/// db.clear_statement_log();
///
/// let session = db.session();
/// let mut ids = Vec::new();
/// for _ in 0..5 {
///     let id = generator.generate(&session, &Record::new("Order"))?.into_value();
///     ids.extend(id.and_then(|id| id.as_i64()));
/// }
/// assert_eq!(ids, [4, 5, 6, 7, 8]);
/// // one counter round trip per block
/// assert_eq!(db.count_statements(|sql| sql.starts_with("update")), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct TableHiLoGenerator {
    table: TableGenerator,
    max_lo: i64,
    state: LockedHiLo,
}

impl Default for TableHiLoGenerator {
    fn default() -> Self {
        Self {
            table: TableGenerator::default(),
            max_lo: DEFAULT_MAX_LO,
            state: LockedHiLo::new(DEFAULT_MAX_LO),
        }
    }
}

impl TableHiLoGenerator {
    /// Uses the default counter table with a `max_lo` of 32767.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_lo(&self) -> i64 {
        self.max_lo
    }
}

impl IdentifierGenerator for TableHiLoGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        self.table.configure(ty, params, dialect)?;
        self.max_lo = hilo::max_lo(params, DEFAULT_MAX_LO)?;
        self.state = LockedHiLo::new(self.max_lo);
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        let value = if self.max_lo < 1 {
            fetch_positive(|| self.table.generate_holder(session))?
        } else {
            self.state.next(|| self.table.generate_holder(session))?
        };
        Ok(GenerationOutcome::Value(value))
    }

    fn as_persistent(&self) -> Option<&dyn PersistentIdentifierGenerator> {
        Some(self)
    }
}

impl PersistentIdentifierGenerator for TableHiLoGenerator {
    fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        self.table.sql_create_strings(dialect)
    }

    fn sql_drop_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        self.table.sql_drop_strings(dialect)
    }

    fn generator_key(&self) -> GeneratorKey {
        self.table.generator_key()
    }
}
