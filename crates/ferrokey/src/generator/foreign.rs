use crate::{
    config::{Properties, params},
    dialect::Dialect,
    error::{Error, Result},
    generator::{GenerationOutcome, IdentifierGenerator},
    jdbc::{Entity, Session},
    value::IdentifierType,
};

/// The `foreign` strategy: borrows the identifier of the entity referenced
/// by a one-to-one association.
#[derive(Debug, Default)]
pub struct ForeignGenerator {
    entity_name: Option<String>,
    property_name: String,
}

impl ForeignGenerator {
    /// Unconfigured; `configure` must supply the `property` parameter.
    pub fn new() -> Self {
        Self::default()
    }

    /// The one-to-one association the identifier is borrowed from.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }
}

impl IdentifierGenerator for ForeignGenerator {
    fn configure(
        &mut self,
        _ty: IdentifierType,
        params: &Properties,
        _dialect: &dyn Dialect,
    ) -> Result<()> {
        self.property_name = params
            .get(params::PROPERTY)
            .ok_or_else(|| {
                Error::mapping("param named \"property\" is required for foreign id generation strategy")
            })?
            .to_owned();
        self.entity_name = params.get(params::ENTITY_NAME).map(str::to_owned);
        Ok(())
    }

    fn generate(&self, session: &dyn Session, entity: &dyn Entity) -> Result<GenerationOutcome> {
        let associated = entity.association(&self.property_name).ok_or_else(|| {
            Error::generation(format!(
                "attempted to assign id from null one-to-one property [{}.{}]",
                self.entity_name.as_deref().unwrap_or(entity.entity_name()),
                self.property_name
            ))
        })?;
        let id = session.associated_identifier(associated)?;
        if session.contains(entity) {
            // saved by the cascade from the associated object
            Ok(GenerationOutcome::DeferToAssociation)
        } else {
            Ok(GenerationOutcome::Value(id))
        }
    }
}
