use crate::{
    config::{Properties, params},
    dialect::Dialect,
    error::{Error, Result},
    generator::{GenerationOutcome, IdentifierGenerator},
    jdbc::{Entity, Session},
    value::IdentifierType,
};

/// The `assigned` strategy: the application sets the identifier itself.
#[derive(Debug, Default)]
pub struct Assigned {
    entity_name: Option<String>,
}

impl Assigned {
    /// A generator that reads the identifier already set on the entity.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentifierGenerator for Assigned {
    fn configure(
        &mut self,
        _ty: IdentifierType,
        params: &Properties,
        _dialect: &dyn Dialect,
    ) -> Result<()> {
        self.entity_name = params.get(params::ENTITY_NAME).map(str::to_owned);
        Ok(())
    }

    fn generate(&self, _session: &dyn Session, entity: &dyn Entity) -> Result<GenerationOutcome> {
        entity
            .identifier()
            .map(GenerationOutcome::Value)
            .ok_or_else(|| {
                Error::generation(format!(
                    "ids for this class must be manually assigned before calling save(): {}",
                    self.entity_name.as_deref().unwrap_or(entity.entity_name())
                ))
            })
    }
}
