use crate::{
    config::{Properties, params},
    dialect::Dialect,
    error::{Error, Result},
    generator::{GenerationOutcome, IdentifierGenerator, Mutex, helper},
    holder::IntegralDataTypeHolder,
    jdbc::{Connection, Entity, Session, SessionExt, statement},
    value::IdentifierType,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The `increment` strategy: `max(column) + 1` read once, then counted up
/// in memory.
///
/// Only safe while no other process inserts into the same tables.
pub struct IncrementGenerator {
    identifier_type: IdentifierType,
    sql: Vec<String>,
    next: Mutex<Option<IntegralDataTypeHolder>>,
}

impl Default for IncrementGenerator {
    fn default() -> Self {
        Self {
            identifier_type: IdentifierType::Long,
            sql: Vec::new(),
            next: Mutex::new(None),
        }
    }
}

impl IncrementGenerator {
    /// Unconfigured; the first call reads the current maximum.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `select max(..)` statements, one per covered table.
    pub fn sql(&self) -> &[String] {
        &self.sql
    }

    fn initial_value(&self, session: &dyn Session) -> Result<IntegralDataTypeHolder> {
        let mut next = helper::holder_for(self.identifier_type)?;
        next.initialize(0);
        session.work(|conn: &mut dyn Connection| {
            for sql in &self.sql {
                let rows = statement::query(
                    conn,
                    sql,
                    &[],
                    "could not fetch initial value for increment generator",
                )?;
                if let Some(row) = rows.first() {
                    let mut max = helper::holder_for(self.identifier_type)?;
                    max.initialize_from_row(row, 0, 0)?;
                    if max.gt_holder(&next)? {
                        next = max;
                    }
                }
            }
            Ok(())
        })?;
        next.increment()?;
        #[cfg(feature = "tracing")]
        tracing::debug!("first free id: {}", next);
        Ok(next)
    }
}

impl IdentifierGenerator for IncrementGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        _dialect: &dyn Dialect,
    ) -> Result<()> {
        helper::holder_for(ty)?;
        self.identifier_type = ty;

        let column = params
            .get(params::COLUMN)
            .or_else(|| params.get(params::TARGET_COLUMN))
            .ok_or_else(|| {
                Error::mapping("increment generator needs [column] or [target_column]")
            })?;
        let tables = params
            .get(params::TABLES)
            .or_else(|| params.get(params::IDENTITY_TABLES))
            .or_else(|| params.get(params::TARGET_TABLE))
            .ok_or_else(|| {
                Error::mapping("increment generator needs [tables] or [target_table]")
            })?;
        let (catalog, schema) = (params.get(params::CATALOG), params.get(params::SCHEMA));
        self.sql = tables
            .split([',', ' ', '\t', '\n'])
            .filter(|t| !t.is_empty())
            .map(|t| format!("select max({column}) from {}", helper::qualify(catalog, schema, t)))
            .collect();
        if self.sql.is_empty() {
            return Err(Error::mapping("increment generator has no tables to scan"));
        }
        *self.next.get_mut() = None;
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        let mut next = self.next.lock();
        if next.is_none() {
            *next = Some(self.initial_value(session)?);
        }
        let holder = next
            .as_mut()
            .ok_or_else(|| Error::generation("increment generator was not initialized"))?;
        Ok(GenerationOutcome::Value(holder.make_value_then_increment()?))
    }
}
