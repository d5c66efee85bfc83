use crate::{
    config::{Properties, params},
    dialect::Dialect,
    error::{Error, Result},
    generator::{
        GenerationOutcome, GeneratorKey, IdentifierGenerator, PersistentIdentifierGenerator,
        helper,
    },
    holder::IntegralDataTypeHolder,
    jdbc::{Connection, Entity, Session, SessionExt, statement},
    value::IdentifierType,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

pub const DEFAULT_SEQUENCE_NAME: &str = "hibernate_sequence";

/// The `sequence` strategy: one database sequence call per identifier.
///
/// The call runs on the session's current connection, inside the caller's
/// transaction.
#[derive(Debug)]
pub struct SequenceGenerator {
    sequence_name: String,
    parameters: Option<String>,
    identifier_type: IdentifierType,
    sql: String,
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self {
            sequence_name: DEFAULT_SEQUENCE_NAME.to_owned(),
            parameters: None,
            identifier_type: IdentifierType::Long,
            sql: String::new(),
        }
    }
}

impl SequenceGenerator {
    /// Defaults to `hibernate_sequence` until configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence name, qualified by schema and catalog when configured.
    pub fn sequence_name(&self) -> &str {
        &self.sequence_name
    }

    /// The next sequence value as an integral holder.
    ///
    /// # Errors
    ///
    /// Fails when the sequence returns no row or the query fails.
    pub fn generate_holder(&self, session: &dyn Session) -> Result<IntegralDataTypeHolder> {
        if self.sql.is_empty() {
            return Err(Error::generation(
                "sequence generator used before it was configured",
            ));
        }
        session.work(|conn: &mut dyn Connection| {
            let rows = statement::query(
                conn,
                &self.sql,
                &[],
                "could not get next sequence value",
            )?;
            let row = rows.first().ok_or_else(|| {
                Error::generation(format!(
                    "sequence [{}] returned no value",
                    self.sequence_name
                ))
            })?;
            let mut value = helper::holder_for(self.identifier_type)?;
            value.initialize_from_row(row, 0, 0)?;
            #[cfg(feature = "tracing")]
            tracing::debug!("sequence identifier generated: {}", value);
            Ok(value)
        })
    }
}

impl IdentifierGenerator for SequenceGenerator {
    fn configure(
        &mut self,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        self.sequence_name = helper::qualify(
            params.get(params::CATALOG),
            params.get(params::SCHEMA),
            params.get_or(params::SEQUENCE, DEFAULT_SEQUENCE_NAME),
        );
        self.parameters = params.get(params::PARAMETERS).map(str::to_owned);
        self.identifier_type = ty;
        helper::holder_for(ty)?;
        self.sql = dialect.sequence_next_val_string(&self.sequence_name)?;
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

impl PersistentIdentifierGenerator for SequenceGenerator {
    fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        let mut ddl = dialect.create_sequence_strings(&self.sequence_name, 1, 1)?;
        if let (Some(parameters), Some(last)) = (&self.parameters, ddl.last_mut()) {
            last.push(' ');
            last.push_str(parameters);
        }
        Ok(ddl)
    }

    fn sql_drop_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        dialect.drop_sequence_strings(&self.sequence_name)
    }

    fn generator_key(&self) -> GeneratorKey {
        GeneratorKey::new(self.sequence_name.clone())
    }
}
