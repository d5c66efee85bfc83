use core::fmt;
use std::sync::Arc;

use crate::{
    config::Properties,
    dialect::Dialect,
    error::Result,
    insert::{InsertGeneratedIdentifierDelegate, PostInsertIdentityPersister},
    jdbc::{Entity, Session},
    value::{IdentifierType, IdentifierValue},
};

/// What a generator produced for one entity insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The identifier to assign.
    Value(IdentifierValue),
    /// Use the associated entity's identifier; the entity is already
    /// persistent through its association.
    DeferToAssociation,
    /// The identifier is assigned by the database while inserting the row.
    DeferToInsert,
}

impl GenerationOutcome {
    /// The generated value, or `None` when generation was deferred.
    pub fn into_value(self) -> Option<IdentifierValue> {
        match self {
            Self::Value(value) => Some(value),
            Self::DeferToAssociation | Self::DeferToInsert => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        !matches!(self, Self::Value(_))
    }
}

/// Identifies the database object (table or sequence) owned by a
/// [`PersistentIdentifierGenerator`].
///
/// Generators configured with the same parameters report equal keys, so the
/// backing object is created once however many mappings share it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorKey(String);

impl GeneratorKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The strategy that assigns identifiers to new entities.
///
/// One instance is normally shared by every session persisting entities of a
/// mapping, so implementations must be safe for concurrent use.
pub trait IdentifierGenerator: Send + Sync {
    /// Accepts strategy parameters once, after construction and before the
    /// first [`Self::generate`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Mapping`] for invalid parameters or an
    /// unsupported identifier type.
    fn configure(
        &mut self,
        _ty: IdentifierType,
        _params: &Properties,
        _dialect: &dyn Dialect,
    ) -> Result<()> {
        Ok(())
    }

    /// Produces the identifier for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Generation`] or a translated
    /// [`crate::Error::Jdbc`] error; nothing is retried at this level.
    fn generate(&self, session: &dyn Session, entity: &dyn Entity) -> Result<GenerationOutcome>;

    /// The schema-owning capability, if this generator has one.
    fn as_persistent(&self) -> Option<&dyn PersistentIdentifierGenerator> {
        None
    }

    /// The post-insert capability, if this generator has one.
    fn as_post_insert(&self) -> Option<&dyn PostInsertIdentifierGenerator> {
        None
    }
}

/// A generator backed by its own database objects.
pub trait PersistentIdentifierGenerator: IdentifierGenerator {
    /// DDL creating the backing objects.
    ///
    /// # Errors
    ///
    /// Fails when the dialect lacks a required capability.
    fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>>;

    /// DDL dropping the backing objects.
    ///
    /// # Errors
    ///
    /// Fails when the dialect lacks a required capability.
    fn sql_drop_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>>;

    fn generator_key(&self) -> GeneratorKey;
}

/// A generator whose value is known only once the row has been inserted.
pub trait PostInsertIdentifierGenerator: IdentifierGenerator {
    /// The delegate that shapes the insert and extracts the generated key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Generation`] when the mapping cannot support
    /// this generator.
    fn insert_generated_identifier_delegate(
        &self,
        persister: &dyn PostInsertIdentityPersister,
        dialect: Arc<dyn Dialect>,
        get_generated_keys_enabled: bool,
    ) -> Result<InsertGeneratedIdentifierDelegate>;
}
