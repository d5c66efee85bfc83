use std::sync::Arc;

use crate::{
    dialect::Dialect,
    error::Result,
    generator::{GenerationOutcome, IdentifierGenerator, PostInsertIdentifierGenerator},
    insert::{InsertGeneratedIdentifierDelegate, PostInsertIdentityPersister},
    jdbc::{Entity, Session},
};

/// The `identity` strategy: the key comes from a database identity column.
#[derive(Debug, Default)]
pub struct IdentityGenerator;

impl IdentityGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierGenerator for IdentityGenerator {
    fn generate(&self, _session: &dyn Session, _entity: &dyn Entity) -> Result<GenerationOutcome> {
        Ok(GenerationOutcome::DeferToInsert)
    }

    fn as_post_insert(&self) -> Option<&dyn PostInsertIdentifierGenerator> {
        Some(self)
    }
}

impl PostInsertIdentifierGenerator for IdentityGenerator {
    fn insert_generated_identifier_delegate(
        &self,
        persister: &dyn PostInsertIdentityPersister,
        dialect: Arc<dyn Dialect>,
        get_generated_keys_enabled: bool,
    ) -> Result<InsertGeneratedIdentifierDelegate> {
        InsertGeneratedIdentifierDelegate::for_identity(
            persister,
            dialect,
            get_generated_keys_enabled,
        )
    }
}
