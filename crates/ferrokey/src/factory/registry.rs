use std::{collections::BTreeMap, sync::Arc};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    config::{Properties, params},
    dialect::Dialect,
    error::{Error, Result},
    generator::{
        Assigned, EnhancedTableGenerator, ForeignGenerator, GuidGenerator, IdentifierGenerator,
        IdentityGenerator, IncrementGenerator, MultipleHiLoPerTableGenerator, SelectGenerator,
        SequenceGenerator, SequenceHiLoGenerator, TableGenerator, TableHiLoGenerator,
        UuidGenerator, UuidHexGenerator,
    },
    value::IdentifierType,
};

/// Builds an unconfigured generator instance.
pub type GeneratorConstructor = Arc<dyn Fn() -> Box<dyn IdentifierGenerator> + Send + Sync>;

/// The strategy name resolved through the dialect.
pub const NATIVE: &str = "native";

/// Maps strategy names to generator constructors.
///
/// [`Self::default`] knows every built-in strategy; applications add their
/// own with [`Self::register`].
#[derive(Clone)]
pub struct IdentifierGeneratorFactory {
    constructors: BTreeMap<String, GeneratorConstructor>,
}

impl Default for IdentifierGeneratorFactory {
    fn default() -> Self {
        let mut factory = Self::empty();
        factory
            .register("assigned", || Box::new(Assigned::new()))
            .register("foreign", || Box::new(ForeignGenerator::new()))
            .register("increment", || Box::new(IncrementGenerator::new()))
            .register("table", || Box::new(TableGenerator::new()))
            .register("hilo", || Box::new(TableHiLoGenerator::new()))
            .register("multiple-hilo", || Box::new(MultipleHiLoPerTableGenerator::new()))
            .register("sequence", || Box::new(SequenceGenerator::new()))
            .register("seqhilo", || Box::new(SequenceHiLoGenerator::new()))
            .register("uuid", || Box::new(UuidHexGenerator::new()))
            .register("uuid.hex", || Box::new(UuidHexGenerator::new()))
            .register("uuid2", || Box::new(UuidGenerator::new()))
            .register("guid", || Box::new(GuidGenerator::new()))
            .register("identity", || Box::new(IdentityGenerator::new()))
            .register("select", || Box::new(SelectGenerator::new()))
            .register("enhanced-table", || Box::new(EnhancedTableGenerator::new()));
        factory
    }
}

impl IdentifierGeneratorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory with no strategies registered.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the constructor for `strategy`.
    pub fn register<F>(&mut self, strategy: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn IdentifierGenerator> + Send + Sync + 'static,
    {
        self.constructors
            .insert(strategy.into(), Arc::new(constructor));
        self
    }

    pub fn is_registered(&self, strategy: &str) -> bool {
        strategy == NATIVE || self.constructors.contains_key(strategy)
    }

    /// Registered strategy names, sorted.
    pub fn strategies(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// The concrete strategy `strategy` stands for under `dialect`.
    pub fn resolve_strategy<'a>(&self, strategy: &'a str, dialect: &dyn Dialect) -> &'a str {
        if strategy == NATIVE {
            dialect.native_identifier_generator_strategy()
        } else {
            strategy
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::Mapping`] for unknown strategies.
    pub fn generator_constructor(
        &self,
        strategy: &str,
        dialect: &dyn Dialect,
    ) -> Result<&GeneratorConstructor> {
        let resolved = self.resolve_strategy(strategy, dialect);
        self.constructors.get(resolved).ok_or_else(|| {
            Error::mapping(format!("could not interpret id generator strategy: {strategy}"))
        })
    }

    /// Instantiates and configures the generator for `strategy`.
    ///
    /// # Errors
    ///
    /// Any failure, including an unknown strategy, is reported as
    /// [`Error::Instantiation`] naming the `entity_name` parameter.
    ///
    /// # Example
    ///
    /// ```
    /// use ferrokey::{
    ///     Error, H2Dialect, IdentifierGenerator, IdentifierGeneratorFactory, IdentifierType,
    ///     PostgreSqlDialect, Properties, params,
    /// };
    ///
    /// let factory = IdentifierGeneratorFactory::new();
    /// let props = Properties::new().with(params::ENTITY_NAME, "Order");
    ///
    /// // `native` is a sequence on PostgreSQL and an identity column on H2
    /// let sequence = factory.create("native", IdentifierType::Long, &props, &PostgreSqlDialect)?;
    /// assert!(sequence.as_persistent().is_some());
    /// let identity = factory.create("native", IdentifierType::Long, &props, &H2Dialect)?;
    /// assert!(identity.as_post_insert().is_some());
    ///
    /// let Err(err) = factory.create("snowflake", IdentifierType::Long, &props, &H2Dialect) else {
    ///     panic!("unknown strategies are rejected");
    /// };
    /// assert!(matches!(err, Error::Instantiation { .. }));
    /// assert_eq!(err.to_string(), "could not instantiate id generator [entity-name=Order]");
    /// # Ok::<(), Error>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, params, dialect)))]
    pub fn create(
        &self,
        strategy: &str,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<Arc<dyn IdentifierGenerator>> {
        self.build(strategy, ty, params, dialect).map_err(|source| {
            let entity = params.get_or(params::ENTITY_NAME, "unknown").to_owned();
            #[cfg(feature = "tracing")]
            tracing::error!(%entity, "could not instantiate id generator: {}", source);
            Error::Instantiation {
                entity,
                source: Box::new(source),
            }
        })
    }

    fn build(
        &self,
        strategy: &str,
        ty: IdentifierType,
        params: &Properties,
        dialect: &dyn Dialect,
    ) -> Result<Arc<dyn IdentifierGenerator>> {
        let constructor = self.generator_constructor(strategy, dialect)?;
        let mut generator = constructor();
        generator.configure(ty, params, dialect)?;
        Ok(Arc::from(generator))
    }
}
