use std::{
    sync::OnceLock,
    time::{SystemTime, UNIX_EPOCH},
};

use portable_atomic::{AtomicI16, Ordering};

use crate::{
    config::{Properties, params},
    dialect::Dialect,
    error::{Error, Result},
    generator::{GenerationOutcome, IdentifierGenerator},
    jdbc::{Connection, Entity, Session, SessionExt, SqlValue, statement},
    value::{IdentifierType, IdentifierValue},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

fn require_string(strategy: &str, ty: IdentifierType) -> Result<()> {
    if ty == IdentifierType::String {
        Ok(())
    } else {
        Err(Error::mapping(format!(
            "{strategy} generator produces string identifiers, not {ty}"
        )))
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Node component, fixed for the life of the process.
fn node_id() -> u32 {
    static NODE: OnceLock<u32> = OnceLock::new();
    *NODE.get_or_init(rand::random)
}

/// Process start component: start time in milliseconds shifted right by 8.
fn process_id() -> u32 {
    static PROCESS: OnceLock<u32> = OnceLock::new();
    *PROCESS.get_or_init(|| (current_millis() >> 8) as u32)
}

/// Counts 0 through `i16::MAX`, then wraps to 0.
fn next_count() -> i16 {
    static COUNTER: AtomicI16 = AtomicI16::new(0);
    match COUNTER.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
        Some(if c == i16::MAX { 0 } else { c.max(0) + 1 })
    }) {
        Ok(previous) | Err(previous) => previous.max(0),
    }
}

/// The `uuid.hex` (alias `uuid`) strategy: a 32-digit hex string built
/// from node, process start, time and a process-wide counter.
///
/// Layout is `node | process | hi-time | lo-time | count` with 8, 8, 4, 8
/// and 4 hex digits, joined by the optional `separator` parameter.
#[derive(Debug, Default)]
pub struct UuidHexGenerator {
    separator: String,
}

impl UuidHexGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text placed between the five hex groups; empty by default.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Builds the next 32 hex digit identifier, plus separators.
    pub fn next_hex(&self) -> String {
        let millis = current_millis();
        let sep = &self.separator;
        format!(
            "{:08x}{sep}{:08x}{sep}{:04x}{sep}{:08x}{sep}{:04x}",
            node_id(),
            process_id(),
            (millis >> 32) as u16,
            millis as u32,
            next_count() as u16,
        )
    }
}

impl IdentifierGenerator for UuidHexGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        _dialect: &dyn Dialect,
    ) -> Result<()> {
        require_string("uuid.hex", ty)?;
        // raw lookup: a blank separator is still a separator
        self.separator = params
            .iter()
            .find(|(k, _)| *k == params::SEPARATOR)
            .map(|(_, v)| v.to_owned())
            .unwrap_or_default();
        Ok(())
    }

    fn generate(&self, _session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        Ok(GenerationOutcome::Value(IdentifierValue::String(
            self.next_hex(),
        )))
    }
}

/// The `uuid2` strategy: random (version 4) UUIDs in 8-4-4-4-12 form.
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierGenerator for UuidGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        _params: &Properties,
        _dialect: &dyn Dialect,
    ) -> Result<()> {
        require_string("uuid2", ty)
    }

    fn generate(&self, _session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        Ok(GenerationOutcome::Value(IdentifierValue::String(
            ::uuid::Uuid::new_v4().hyphenated().to_string(),
        )))
    }
}

/// The `guid` strategy: asks the database for a GUID.
#[derive(Debug, Default)]
pub struct GuidGenerator {
    sql: String,
}

impl GuidGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentifierGenerator for GuidGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        _params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        require_string("guid", ty)?;
        self.sql = dialect.select_guid_string()?;
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        if self.sql.is_empty() {
            return Err(Error::generation("guid generator used before it was configured"));
        }
        let guid = session.work(|conn: &mut dyn Connection| {
            let rows = statement::query(conn, &self.sql, &[], "could not retrieve GUID")?;
            match rows.first().and_then(|row| row.get(0)) {
                Some(SqlValue::Text(guid)) => Ok(guid.clone()),
                Some(other) if !other.is_null() => Ok(other.to_string()),
                _ => Err(Error::generation("the database returned no GUID")),
            }
        })?;
        #[cfg(feature = "tracing")]
        tracing::debug!("GUID identifier generated: {}", guid);
        Ok(GenerationOutcome::Value(IdentifierValue::String(guid)))
    }
}
