use std::{collections::HashMap, sync::Arc};

use crate::{
    dialect::Dialect,
    error::{Error, Result},
    generator::{GeneratorKey, IdentifierGenerator, PersistentIdentifierGenerator},
};

/// The persistent generators of a set of mappings, one per
/// [`GeneratorKey`].
///
/// Registration order is kept so scripts are stable: create scripts follow
/// it, drop scripts run in reverse.
///
/// # Example
///
/// ```
/// use ferrokey::{
///     H2Dialect, IdentifierGeneratorFactory, IdentifierType, PersistentGeneratorRegistry,
///     Properties, params,
/// };
///
/// let factory = IdentifierGeneratorFactory::new();
/// let mut registry = PersistentGeneratorRegistry::new();
/// for entity in ["Order", "Invoice"] {
///     let props = Properties::new().with(params::ENTITY_NAME, entity);
///     registry.register(factory.create("hilo", IdentifierType::Long, &props, &H2Dialect)?);
/// }
///
/// // both mappings share `hibernate_unique_key`
/// assert_eq!(registry.len(), 1);
/// assert_eq!(
///     registry.sql_create_strings(&H2Dialect)?,
///     [
///         "create table hibernate_unique_key ( next_hi integer )",
///         "insert into hibernate_unique_key values ( 0 )",
///     ]
/// );
/// assert_eq!(
///     registry.sql_drop_strings(&H2Dialect)?,
///     ["drop table if exists hibernate_unique_key"]
/// );
/// # Ok::<(), ferrokey::Error>(())
/// ```
#[derive(Default)]
pub struct PersistentGeneratorRegistry {
    order: Vec<GeneratorKey>,
    generators: HashMap<GeneratorKey, Arc<dyn IdentifierGenerator>>,
}

impl PersistentGeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `generator` if it owns database objects not registered yet.
    ///
    /// Returns `true` when the generator was added.
    pub fn register(&mut self, generator: Arc<dyn IdentifierGenerator>) -> bool {
        let Some(persistent) = generator.as_persistent() else {
            return false;
        };
        let key = persistent.generator_key();
        if self.generators.contains_key(&key) {
            #[cfg(feature = "tracing")]
            tracing::debug!(%key, "generator key already registered");
            return false;
        }
        self.order.push(key.clone());
        self.generators.insert(key, generator);
        true
    }

    pub fn contains(&self, key: &GeneratorKey) -> bool {
        self.generators.contains_key(key)
    }

    /// Number of distinct database objects registered.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &GeneratorKey> {
        self.order.iter()
    }

    /// The create script of every registered generator.
    ///
    /// # Errors
    ///
    /// Fails when a generator needs a capability `dialect` lacks.
    pub fn sql_create_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        let mut script = Vec::new();
        for key in &self.order {
            script.extend(self.persistent(key)?.sql_create_strings(dialect)?);
        }
        Ok(script)
    }

    /// The drop script of every registered generator, newest first.
    ///
    /// # Errors
    ///
    /// Fails when a generator needs a capability `dialect` lacks.
    pub fn sql_drop_strings(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        let mut script = Vec::new();
        for key in self.order.iter().rev() {
            script.extend(self.persistent(key)?.sql_drop_strings(dialect)?);
        }
        Ok(script)
    }

    fn persistent(&self, key: &GeneratorKey) -> Result<&dyn PersistentIdentifierGenerator> {
        self.generators
            .get(key)
            .and_then(|g| g.as_persistent())
            .ok_or_else(|| Error::mapping(format!("no persistent generator registered for [{key}]")))
    }
}
