use std::sync::Arc;

use crate::{
    config::{Properties, params},
    dialect::Dialect,
    error::{Error, Result},
    generator::{GenerationOutcome, IdentifierGenerator, PostInsertIdentifierGenerator},
    insert::{InsertGeneratedIdentifierDelegate, PostInsertIdentityPersister},
    jdbc::{Entity, Session},
    value::IdentifierType,
};

/// The `select` strategy: after a plain insert, the row is looked up by a
/// unique property to read the key a trigger assigned.
///
/// The property is the `key` parameter, or else the entity's single,
/// non-generated natural-id property.
#[derive(Debug, Default)]
pub struct SelectGenerator {
    unique_key_property: Option<String>,
}

impl SelectGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `key` parameter, if one was configured.
    pub fn unique_key_property(&self) -> Option<&str> {
        self.unique_key_property.as_deref()
    }

    /// Resolves the property used to locate inserted rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] when no `key` was configured and the
    /// natural id is missing, composite or insert-generated.
    pub fn determine_name_of_property_to_use(
        &self,
        persister: &dyn PostInsertIdentityPersister,
    ) -> Result<String> {
        if let Some(property) = &self.unique_key_property {
            return Ok(property.clone());
        }
        let natural_id = persister.natural_id_properties().ok_or_else(|| {
            Error::generation(
                "no natural-id property defined; need to specify [key] in generator parameters",
            )
        })?;
        let index = match natural_id {
            [index] => *index,
            _ => {
                return Err(Error::generation(
                    "select generator does not currently support composite natural-id properties; need to specify [key] in generator parameters",
                ));
            }
        };
        if persister.is_property_insert_generated(index) {
            return Err(Error::generation(
                "natural-id also defined as insert-generated; need to specify [key] in generator parameters",
            ));
        }
        Ok(persister.property_name(index).to_owned())
    }
}

impl IdentifierGenerator for SelectGenerator {
    fn configure(
        &mut self,
        _ty: IdentifierType,
        params: &Properties,
        _dialect: &dyn Dialect,
    ) -> Result<()> {
        self.unique_key_property = params.get(params::KEY).map(str::to_owned);
        Ok(())
    }

    fn generate(&self, _session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        Ok(GenerationOutcome::DeferToInsert)
    }

    fn as_post_insert(&self) -> Option<&dyn PostInsertIdentifierGenerator> {
        Some(self)
    }
}

impl PostInsertIdentifierGenerator for SelectGenerator {
    fn insert_generated_identifier_delegate(
        &self,
        persister: &dyn PostInsertIdentityPersister,
        dialect: Arc<dyn Dialect>,
        _get_generated_keys_enabled: bool,
    ) -> Result<InsertGeneratedIdentifierDelegate> {
        let property = self.determine_name_of_property_to_use(persister)?;
        InsertGeneratedIdentifierDelegate::for_unique_key(persister, dialect, &property)
    }
}
