use crate::{
    Assigned, Error, H2Dialect, IdentifierGeneratorFactory, IdentifierType, MemoryDatabase,
    MySqlDialect, NATIVE, PostgreSqlDialect, Properties, Record, params,
};

#[test]
fn default_factory_knows_the_builtin_strategies() {
    let factory = IdentifierGeneratorFactory::new();
    for strategy in [
        "assigned",
        "foreign",
        "increment",
        "table",
        "hilo",
        "multiple-hilo",
        "sequence",
        "seqhilo",
        "uuid",
        "uuid.hex",
        "uuid2",
        "guid",
        "identity",
        "select",
        "enhanced-table",
        NATIVE,
    ] {
        assert!(factory.is_registered(strategy), "{strategy}");
    }
    assert_eq!(factory.strategies().count(), 15);
    assert!(!IdentifierGeneratorFactory::empty().is_registered("hilo"));
}

#[test]
fn native_resolves_through_the_dialect() {
    let factory = IdentifierGeneratorFactory::new();
    assert_eq!(factory.resolve_strategy(NATIVE, &H2Dialect), "identity");
    assert_eq!(factory.resolve_strategy(NATIVE, &PostgreSqlDialect), "sequence");
    assert_eq!(factory.resolve_strategy("hilo", &PostgreSqlDialect), "hilo");

    let generator = factory
        .create(NATIVE, IdentifierType::Long, &Properties::new(), &PostgreSqlDialect)
        .unwrap();
    assert!(generator.as_persistent().is_some());
    assert!(generator.as_post_insert().is_none());
}

#[test]
fn unknown_strategies_are_wrapped_with_the_entity_name() {
    let factory = IdentifierGeneratorFactory::new();
    let err = factory
        .create(
            "snowflake",
            IdentifierType::Long,
            &Properties::new().with(params::ENTITY_NAME, "Order"),
            &H2Dialect,
        )
        .err()
        .unwrap();
    assert!(err.is_mapping());
    assert_eq!(
        err.to_string(),
        "could not instantiate id generator [entity-name=Order]"
    );
    match err {
        Error::Instantiation { source, .. } => assert_eq!(
            source.to_string(),
            "could not interpret id generator strategy: snowflake"
        ),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn configuration_failures_are_wrapped() {
    let factory = IdentifierGeneratorFactory::new();
    let err = factory
        .create("sequence", IdentifierType::Long, &Properties::new(), &MySqlDialect)
        .err()
        .unwrap();
    match err {
        Error::Instantiation { entity, source } => {
            assert_eq!(entity, "unknown");
            assert!(source.is_mapping());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn custom_strategies_can_be_registered() {
    let mut factory = IdentifierGeneratorFactory::empty();
    factory.register("manual", || Box::new(Assigned::new()));
    assert!(factory.generator_constructor("manual", &H2Dialect).is_ok());

    let generator = factory
        .create("manual", IdentifierType::Long, &Properties::new(), &H2Dialect)
        .unwrap();
    let session = MemoryDatabase::new().session();
    let outcome = generator
        .generate(&session, &Record::new("Order").with_identifier(5i64))
        .unwrap();
    assert_eq!(outcome.into_value().and_then(|v| v.as_i64()), Some(5));
}

#[test]
fn created_generators_are_configured() {
    let db = MemoryDatabase::new();
    let factory = IdentifierGeneratorFactory::new();
    let generator = factory
        .create(
            "hilo",
            IdentifierType::Long,
            &Properties::new().with(params::MAX_LO, "0"),
            &H2Dialect,
        )
        .unwrap();
    let ddl = generator
        .as_persistent()
        .unwrap()
        .sql_create_strings(&H2Dialect)
        .unwrap();
    db.execute_script(&ddl).unwrap();
    let session = db.session();
    let first = generator.generate(&session, &Record::new("Order")).unwrap();
    let second = generator.generate(&session, &Record::new("Order")).unwrap();
    assert_eq!(first.into_value().and_then(|v| v.as_i64()), Some(1));
    assert_eq!(second.into_value().and_then(|v| v.as_i64()), Some(2));
}
