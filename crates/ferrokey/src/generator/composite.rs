use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    generator::{GenerationOutcome, IdentifierGenerator},
    jdbc::{Entity, Session},
    schema::PersistentGeneratorRegistry,
    value::{CompositeIdentifier, IdentifierValue},
};

/// Finds the composite identifier that generation plans inject into.
pub trait GenerationContextLocator: Send + Sync {
    /// # Errors
    ///
    /// Fails when no injection context can be derived from `entity`.
    fn locate_generation_context(
        &self,
        session: &dyn Session,
        entity: &dyn Entity,
    ) -> Result<CompositeIdentifier>;
}

impl<F> GenerationContextLocator for F
where
    F: Fn(&dyn Session, &dyn Entity) -> Result<CompositeIdentifier> + Send + Sync,
{
    fn locate_generation_context(
        &self,
        session: &dyn Session,
        entity: &dyn Entity,
    ) -> Result<CompositeIdentifier> {
        self(session, entity)
    }
}

/// Starts from the entity's current composite identifier, or an empty one.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedIdLocator;

impl GenerationContextLocator for EmbeddedIdLocator {
    fn locate_generation_context(
        &self,
        _session: &dyn Session,
        entity: &dyn Entity,
    ) -> Result<CompositeIdentifier> {
        match entity.identifier() {
            Some(IdentifierValue::Composite(id)) => Ok(id),
            None => Ok(CompositeIdentifier::new()),
            Some(other) => Err(Error::generation(format!(
                "entity [{}] holds a simple identifier {other} where a composite one was expected",
                entity.entity_name()
            ))),
        }
    }
}

/// One independently generated part of a composite identifier.
pub trait GenerationPlan: Send + Sync {
    /// Generates this plan's value and injects it into `context`.
    ///
    /// # Errors
    ///
    /// Propagates the underlying generator's failure.
    fn execute(
        &self,
        session: &dyn Session,
        entity: &dyn Entity,
        context: &mut CompositeIdentifier,
    ) -> Result<()>;

    /// Adds any generator owning database objects to `registry`.
    fn register_persistent_generators(&self, registry: &mut PersistentGeneratorRegistry);
}

/// Runs a generator and stores its value under one property.
pub struct ValueGenerationPlan {
    property: String,
    generator: Arc<dyn IdentifierGenerator>,
}

impl ValueGenerationPlan {
    /// A plan that stores the value of `generator` under `property`.
    pub fn new(property: impl Into<String>, generator: Arc<dyn IdentifierGenerator>) -> Self {
        Self {
            property: property.into(),
            generator,
        }
    }

    /// The composite identifier property this plan fills.
    pub fn property(&self) -> &str {
        &self.property
    }
}

impl GenerationPlan for ValueGenerationPlan {
    fn execute(
        &self,
        session: &dyn Session,
        entity: &dyn Entity,
        context: &mut CompositeIdentifier,
    ) -> Result<()> {
        match self.generator.generate(session, entity)? {
            GenerationOutcome::Value(value) => {
                context.set(self.property.clone(), value);
                Ok(())
            }
            GenerationOutcome::DeferToAssociation | GenerationOutcome::DeferToInsert => {
                Err(Error::generation(format!(
                    "generator for composite identifier property [{}] did not produce a value",
                    self.property
                )))
            }
        }
    }

    fn register_persistent_generators(&self, registry: &mut PersistentGeneratorRegistry) {
        registry.register(Arc::clone(&self.generator));
    }
}

/// Generates composite identifiers whose parts come from independent
/// generation plans.
///
/// Plans run in registration order against one shared context; the caller
/// registers them in an order that satisfies any dependencies between
/// parts.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use ferrokey::{
///     CompositeIdentifier, CompositeNestedGeneratedValueGenerator, EmbeddedIdLocator,
///     H2Dialect, IdentifierGenerator, IdentifierType, IdentifierValue, MemoryDatabase,
///     PersistentGeneratorRegistry, Properties, Record, SequenceGenerator, ValueGenerationPlan,
///     params,
/// };
///
/// let mut line = SequenceGenerator::new();
/// line.configure(
///     IdentifierType::Long,
///     &Properties::new().with(params::SEQUENCE, "line_seq"),
///     &H2Dialect,
/// )?;
///
/// let mut generator = CompositeNestedGeneratedValueGenerator::new(EmbeddedIdLocator);
/// generator.add_generated_value_plan(ValueGenerationPlan::new("line", Arc::new(line)));
///
/// let mut registry = PersistentGeneratorRegistry::new();
/// generator.register_persistent_generators(&mut registry);
/// let db = MemoryDatabase::new();
/// db.execute_script(&registry.sql_create_strings(&H2Dialect)?)?;
///
/// let mut id = CompositeIdentifier::new();
/// id.set("order", IdentifierValue::Long(42));
/// let order_line = Record::new("OrderLine").with_identifier(id);
///
/// let generated = generator.generate(&db.session(), &order_line)?.into_value();
/// let Some(IdentifierValue::Composite(generated)) = generated else {
///     panic!("expected a composite identifier");
/// };
/// assert_eq!(generated.get("order"), Some(&IdentifierValue::Long(42)));
/// assert_eq!(generated.get("line"), Some(&IdentifierValue::Long(1)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CompositeNestedGeneratedValueGenerator {
    locator: Box<dyn GenerationContextLocator>,
    plans: Vec<Box<dyn GenerationPlan>>,
}

impl CompositeNestedGeneratedValueGenerator {
    /// A generator with no plans that starts each run from `locator`.
    pub fn new(locator: impl GenerationContextLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            plans: Vec::new(),
        }
    }

    /// Appends `plan`; it sees every part set by plans added before it.
    pub fn add_generated_value_plan(&mut self, plan: impl GenerationPlan + 'static) -> &mut Self {
        self.plans.push(Box::new(plan));
        self
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    /// Collects the persistent generators of every plan.
    pub fn register_persistent_generators(&self, registry: &mut PersistentGeneratorRegistry) {
        for plan in &self.plans {
            plan.register_persistent_generators(registry);
        }
    }
}

impl IdentifierGenerator for CompositeNestedGeneratedValueGenerator {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn generate(&self, session: &dyn Session, entity: &dyn Entity) -> Result<GenerationOutcome> {
        let mut context = self.locator.locate_generation_context(session, entity)?;
        for plan in &self.plans {
            plan.execute(session, entity, &mut context)?;
        }
        Ok(GenerationOutcome::Value(IdentifierValue::Composite(context)))
    }
}
