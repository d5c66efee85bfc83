use crate::{
    config::Properties,
    dialect::Dialect,
    error::Result,
    generator::{
        GenerationOutcome, GeneratorKey, IdentifierGenerator, PersistentIdentifierGenerator,
        SequenceGenerator,
        hilo::{self, LockedHiLo, fetch_positive},
    },
    jdbc::{Entity, Session},
    value::IdentifierType,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub const DEFAULT_MAX_LO: i64 = 9;

/// The `seqhilo` strategy: a [`SequenceGenerator`] supplying hi values to
/// the legacy hi/lo algorithm.
pub struct SequenceHiLoGenerator {
    sequence: SequenceGenerator,
    max_lo: i64,
    state: LockedHiLo,
}

impl Default for SequenceHiLoGenerator {
    fn default() -> Self {
        Self {
            sequence: SequenceGenerator::default(),
            max_lo: DEFAULT_MAX_LO,
            state: LockedHiLo::new(DEFAULT_MAX_LO),
        }
    }
}

impl SequenceHiLoGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block size minus one.
    pub fn max_lo(&self) -> i64 {
        self.max_lo
    }
}

impl IdentifierGenerator for SequenceHiLoGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        self.sequence.configure(ty, params, dialect)?;
        self.max_lo = hilo::max_lo(params, DEFAULT_MAX_LO)?;
        self.state = LockedHiLo::new(self.max_lo);
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        let value = if self.max_lo < 1 {
            fetch_positive(|| self.sequence.generate_holder(session))?
        } else {
            self.state.next(|| self.sequence.generate_holder(session))?
        };
        Ok(GenerationOutcome::Value(value))
    }

    fn as_persistent(&self) -> Option<&dyn PersistentIdentifierGenerator> {
        Some(self)
    }
}

impl PersistentIdentifierGenerator for SequenceHiLoGenerator {
    fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        self.sequence.sql_create_strings(dialect)
    }

    fn sql_drop_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        self.sequence.sql_drop_strings(dialect)
    }

    fn generator_key(&self) -> GeneratorKey {
        self.sequence.generator_key()
    }
}
