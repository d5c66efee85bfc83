use std::{collections::HashSet, sync::Arc, thread};

use num_bigint::BigInt;

use crate::{
    Assigned, CompositeIdentifier, CompositeNestedGeneratedValueGenerator, EmbeddedIdLocator,
    Entity, EntityDescriptor, Error, ForeignGenerator, GenerationOutcome, GenerationPlan,
    GuidGenerator, H2Dialect, IdentifierGenerator, IdentifierType, IdentifierValue,
    IdentityGenerator, IncrementGenerator, MemoryDatabase, MultipleHiLoPerTableGenerator,
    MySqlDialect, PersistentGeneratorRegistry, PersistentIdentifierGenerator, Properties,
    PropertyDescriptor, Record, SelectGenerator, SequenceGenerator, SequenceHiLoGenerator,
    Session, TableGenerator, TableHiLoGenerator, UuidGenerator, UuidHexGenerator,
    ValueGenerationPlan, params,
};

fn configured<G: IdentifierGenerator>(
    mut generator: G,
    ty: IdentifierType,
    params: &Properties,
) -> G {
    generator.configure(ty, params, &H2Dialect).unwrap();
    generator
}

fn create_objects(db: &MemoryDatabase, generator: &dyn IdentifierGenerator) {
    let ddl = generator
        .as_persistent()
        .unwrap()
        .sql_create_strings(&H2Dialect)
        .unwrap();
    db.execute_script(&ddl).unwrap();
}

fn next(generator: &dyn IdentifierGenerator, session: &dyn Session) -> IdentifierValue {
    generator
        .generate(session, &Record::new("Item"))
        .unwrap()
        .into_value()
        .unwrap()
}

fn next_long(generator: &dyn IdentifierGenerator, session: &dyn Session) -> i64 {
    next(generator, session).as_i64().unwrap()
}

fn hilo_with_counter(max_lo: i64, counter: i64) -> (MemoryDatabase, TableHiLoGenerator) {
    let db = MemoryDatabase::new();
    let generator = configured(
        TableHiLoGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::MAX_LO, max_lo.to_string()),
    );
    create_objects(&db, &generator);
    db.execute_script(&[format!("update hibernate_unique_key set next_hi = {counter}")])
        .unwrap();
    db.clear_statement_log();
    (db, generator)
}

fn hi_fetches(db: &MemoryDatabase) -> usize {
    db.count_statements(|sql| sql.starts_with("update hibernate_unique_key"))
}

#[test]
fn table_generator_defaults() {
    let generator = TableGenerator::new();
    assert_eq!(generator.table_name(), "hibernate_unique_key");
    assert_eq!(generator.column_name(), "next_hi");
    assert_eq!(
        generator.sql_create_strings(&H2Dialect).unwrap(),
        vec![
            "create table hibernate_unique_key ( next_hi integer )".to_owned(),
            "insert into hibernate_unique_key values ( 0 )".to_owned(),
        ]
    );
}

#[test]
fn table_generator_advances_the_counter() {
    let db = MemoryDatabase::new();
    let generator = configured(
        TableGenerator::new(),
        IdentifierType::Integer,
        &Properties::new().with(params::TABLE, "counters"),
    );
    create_objects(&db, &generator);
    let session = db.session();
    assert_eq!(next(&generator, &session), IdentifierValue::Integer(0));
    assert_eq!(next(&generator, &session), IdentifierValue::Integer(1));
}

#[test]
fn table_generator_initializes_a_missing_row() {
    let db = MemoryDatabase::new();
    let generator = configured(TableGenerator::new(), IdentifierType::Long, &Properties::new());
    db.execute_script(&["create table hibernate_unique_key ( next_hi integer )"])
        .unwrap();
    let session = db.session();
    assert_eq!(next_long(&generator, &session), 0);
    assert_eq!(next_long(&generator, &session), 1);
    assert_eq!(db.table_rows("hibernate_unique_key").unwrap().len(), 1);
}

#[test]
fn table_generator_fails_without_its_table() {
    let db = MemoryDatabase::new();
    let generator = configured(TableGenerator::new(), IdentifierType::Long, &Properties::new());
    let err = generator
        .generate(&db.session(), &Record::new("Item"))
        .unwrap_err();
    assert!(matches!(err, Error::Jdbc { .. }));
}

#[test]
fn hilo_dispenses_a_block_per_fetch() {
    let (db, generator) = hilo_with_counter(3, 1);
    let session = db.session();
    let ids: Vec<i64> = (0..4).map(|_| next_long(&generator, &session)).collect();
    assert_eq!(ids, vec![4, 5, 6, 7]);
    assert_eq!(hi_fetches(&db), 1);
    assert_eq!(next_long(&generator, &session), 8);
    assert_eq!(hi_fetches(&db), 2);
}

#[test]
fn hilo_never_dispenses_zero() {
    let (db, generator) = hilo_with_counter(3, 0);
    let session = db.session();
    let ids: Vec<i64> = (0..4).map(|_| next_long(&generator, &session)).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn hilo_without_local_range_fetches_every_time() {
    let (db, generator) = hilo_with_counter(0, 0);
    let session = db.session();
    assert_eq!(next_long(&generator, &session), 1);
    assert_eq!(next_long(&generator, &session), 2);
    // the zero fetch is skipped
    assert_eq!(hi_fetches(&db), 3);
}

#[test]
fn hi_values_survive_a_rolled_back_transaction() {
    let (db, generator) = hilo_with_counter(3, 1);
    let session = db.session();
    session.begin().unwrap();
    assert_eq!(next_long(&generator, &session), 4);
    session.rollback();

    let restarted = configured(
        TableHiLoGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::MAX_LO, "3"),
    );
    assert_eq!(next_long(&restarted, &db.session()), 8);
}

#[test]
fn hilo_is_unique_across_threads() {
    let (db, generator) = hilo_with_counter(5, 0);
    let generator = Arc::new(generator);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = db.clone();
            let generator = Arc::clone(&generator);
            thread::spawn(move || {
                let session = db.session();
                (0..200)
                    .map(|_| next_long(generator.as_ref(), &session))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), 1600);
}

#[test]
fn separate_hilo_instances_never_overlap() {
    let (db, first) = hilo_with_counter(9, 0);
    let second = configured(
        TableHiLoGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::MAX_LO, "9"),
    );
    let session = db.session();
    let mut seen = HashSet::new();
    for _ in 0..25 {
        assert!(seen.insert(next_long(&first, &session)));
        assert!(seen.insert(next_long(&second, &session)));
    }
}

#[test]
fn hilo_narrows_to_the_identifier_type() {
    let db = MemoryDatabase::new();
    let generator = configured(
        TableHiLoGenerator::new(),
        IdentifierType::Short,
        &Properties::new().with(params::MAX_LO, "10"),
    );
    create_objects(&db, &generator);
    assert_eq!(next(&generator, &db.session()), IdentifierValue::Short(1));
}

#[test]
fn hilo_blocks_beyond_64_bits_use_wide_identifiers() {
    let db = MemoryDatabase::new();
    let generator = configured(
        TableHiLoGenerator::new(),
        IdentifierType::BigInteger,
        &Properties::new().with(params::MAX_LO, (i64::MAX - 1).to_string()),
    );
    create_objects(&db, &generator);
    db.execute_script(&["update hibernate_unique_key set next_hi = 4"])
        .unwrap();
    let session = db.session();
    let first: BigInt = BigInt::from(i64::MAX) * 4;
    assert_eq!(
        next(&generator, &session),
        IdentifierValue::BigInteger(first.clone())
    );
    assert_eq!(
        next(&generator, &session),
        IdentifierValue::BigInteger(first + 1)
    );
}

#[test]
fn multiple_hilo_keeps_one_row_per_key() {
    let db = MemoryDatabase::new();
    let orders = configured(
        MultipleHiLoPerTableGenerator::new(),
        IdentifierType::Long,
        &Properties::new()
            .with(params::PRIMARY_KEY_VALUE, "orders")
            .with(params::MAX_LO, "1"),
    );
    let items = configured(
        MultipleHiLoPerTableGenerator::new(),
        IdentifierType::Long,
        &Properties::new()
            .with(params::TARGET_TABLE, "items")
            .with(params::MAX_LO, "1"),
    );
    assert_eq!(items.key_value(), "items");
    create_objects(&db, &orders);
    let session = db.session();

    let ids: Vec<i64> = (0..4).map(|_| next_long(&orders, &session)).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(next_long(&items, &session), 1);
    assert_eq!(db.table_rows("hibernate_sequences").unwrap().len(), 2);
}

#[test]
fn multiple_hilo_needs_a_key() {
    let mut generator = MultipleHiLoPerTableGenerator::new();
    let err = generator
        .configure(IdentifierType::Long, &Properties::new(), &H2Dialect)
        .unwrap_err();
    assert!(err.is_mapping());
    assert_eq!(
        err.to_string(),
        "multiple-hilo generator needs [primary_key_value] or [target_table]"
    );
}

#[test]
fn multiple_hilo_ddl_uses_key_length() {
    let generator = configured(
        MultipleHiLoPerTableGenerator::new(),
        IdentifierType::Long,
        &Properties::new()
            .with(params::TARGET_TABLE, "items")
            .with(params::PRIMARY_KEY_LENGTH, "64"),
    );
    assert_eq!(
        generator.sql_create_strings(&H2Dialect).unwrap(),
        vec![
            "create table hibernate_sequences ( sequence_name varchar(64), sequence_next_hi_value integer )"
                .to_owned()
        ]
    );
}

#[test]
fn sequence_generator_reads_next_values() {
    let db = MemoryDatabase::new();
    let generator = configured(
        SequenceGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::SEQUENCE, "item_seq"),
    );
    create_objects(&db, &generator);
    assert!(db.has_sequence("item_seq"));
    let session = db.session();
    assert_eq!(next_long(&generator, &session), 1);
    assert_eq!(next_long(&generator, &session), 2);
}

#[test]
fn sequence_ddl_appends_parameters() {
    let generator = configured(
        SequenceGenerator::new(),
        IdentifierType::Long,
        &Properties::new()
            .with(params::SCHEMA, "app")
            .with(params::PARAMETERS, "cache 20"),
    );
    assert_eq!(generator.sequence_name(), "app.hibernate_sequence");
    assert_eq!(
        generator.sql_create_strings(&H2Dialect).unwrap(),
        vec!["create sequence app.hibernate_sequence start with 1 increment by 1 cache 20".to_owned()]
    );
}

#[test]
fn sequence_generator_needs_sequence_support() {
    let mut generator = SequenceGenerator::new();
    let err = generator
        .configure(IdentifierType::Long, &Properties::new(), &MySqlDialect)
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn hilo_rejects_max_lo_without_room_for_a_block() {
    let largest = Properties::new().with(params::MAX_LO, i64::MAX.to_string());
    let err = TableHiLoGenerator::new()
        .configure(IdentifierType::Long, &largest, &H2Dialect)
        .unwrap_err();
    assert!(err.is_mapping());
    assert_eq!(
        err.to_string(),
        format!("[max_lo] must be less than {}, was {}", i64::MAX, i64::MAX)
    );

    let mut multiple = MultipleHiLoPerTableGenerator::new();
    assert!(
        multiple
            .configure(
                IdentifierType::Long,
                &largest.clone().with(params::TARGET_TABLE, "orders"),
                &H2Dialect,
            )
            .unwrap_err()
            .is_mapping()
    );

    let generator = configured(
        TableHiLoGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::MAX_LO, (i64::MAX - 1).to_string()),
    );
    assert_eq!(generator.max_lo(), i64::MAX - 1);
}

#[test]
fn seqhilo_multiplies_sequence_values() {
    let db = MemoryDatabase::new();
    let generator = configured(
        SequenceHiLoGenerator::new(),
        IdentifierType::Long,
        &Properties::new(),
    );
    assert_eq!(generator.max_lo(), 9);
    create_objects(&db, &generator);
    let session = db.session();
    let ids: Vec<i64> = (0..11).map(|_| next_long(&generator, &session)).collect();
    assert_eq!(ids, (10..=20).collect::<Vec<_>>());
}

#[test]
fn increment_starts_after_the_largest_existing_id() {
    let db = MemoryDatabase::new();
    db.execute_script(&[
        "create table orders ( id bigint not null, primary key (id) )",
        "create table archived_orders ( id bigint not null, primary key (id) )",
        "insert into orders (id) values (5)",
        "insert into archived_orders (id) values (10)",
    ])
    .unwrap();
    let generator = configured(
        IncrementGenerator::new(),
        IdentifierType::Long,
        &Properties::new()
            .with(params::COLUMN, "id")
            .with(params::TABLES, "orders, archived_orders"),
    );
    assert_eq!(generator.sql().len(), 2);
    let session = db.session();
    assert_eq!(next_long(&generator, &session), 11);
    assert_eq!(next_long(&generator, &session), 12);
    // the maximum is read once
    assert_eq!(db.count_statements(|sql| sql.starts_with("select max")), 2);
}

#[test]
fn increment_starts_at_one_on_empty_tables() {
    let db = MemoryDatabase::new();
    db.execute_script(&["create table orders ( id integer not null, primary key (id) )"])
        .unwrap();
    let generator = configured(
        IncrementGenerator::new(),
        IdentifierType::Integer,
        &Properties::new()
            .with(params::TARGET_COLUMN, "id")
            .with(params::TARGET_TABLE, "orders"),
    );
    assert_eq!(next(&generator, &db.session()), IdentifierValue::Integer(1));
}

#[test]
fn increment_qualifies_tables() {
    let generator = configured(
        IncrementGenerator::new(),
        IdentifierType::Long,
        &Properties::new()
            .with(params::COLUMN, "id")
            .with(params::IDENTITY_TABLES, "a\tb")
            .with(params::SCHEMA, "s"),
    );
    assert_eq!(generator.sql(), [
        "select max(id) from s.a".to_owned(),
        "select max(id) from s.b".to_owned(),
    ]);
}

#[test]
fn uuid_hex_layout() {
    let plain = configured(UuidHexGenerator::new(), IdentifierType::String, &Properties::new());
    let first = plain.next_hex();
    assert_eq!(first.len(), 32);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first, plain.next_hex());

    let separated = configured(
        UuidHexGenerator::new(),
        IdentifierType::String,
        &Properties::new().with(params::SEPARATOR, "-"),
    );
    let id = separated.next_hex();
    let groups: Vec<usize> = id.split('-').map(str::len).collect();
    assert_eq!(groups, vec![8, 8, 4, 8, 4]);
    assert_eq!(&id[..8], &first[..8]);
}

#[test]
fn string_generators_reject_numeric_types() {
    let mut hex = UuidHexGenerator::new();
    let err = hex
        .configure(IdentifierType::Long, &Properties::new(), &H2Dialect)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "uuid.hex generator produces string identifiers, not long"
    );
    assert!(
        UuidGenerator::new()
            .configure(IdentifierType::Integer, &Properties::new(), &H2Dialect)
            .is_err()
    );
}

#[test]
fn uuid2_is_hyphenated() {
    let generator = configured(UuidGenerator::new(), IdentifierType::String, &Properties::new());
    let id = next(&generator, &MemoryDatabase::new().session());
    let id = id.as_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(id.matches('-').count(), 4);
}

#[test]
fn guid_comes_from_the_database() {
    let db = MemoryDatabase::new();
    let generator = configured(GuidGenerator::new(), IdentifierType::String, &Properties::new());
    let id = next(&generator, &db.session());
    assert_eq!(id.as_str().map(str::len), Some(36));
    assert_eq!(db.statement_log(), vec!["call random_uuid()".to_owned()]);
}

#[test]
fn assigned_returns_the_entity_identifier() {
    let generator = configured(
        Assigned::new(),
        IdentifierType::Long,
        &Properties::new().with(params::ENTITY_NAME, "Person"),
    );
    let session = MemoryDatabase::new().session();
    assert_eq!(
        generator
            .generate(&session, &Record::new("Person").with_identifier(42i64))
            .unwrap(),
        GenerationOutcome::Value(IdentifierValue::Long(42))
    );
    let err = generator
        .generate(&session, &Record::new("Person"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "ids for this class must be manually assigned before calling save(): Person"
    );
}

#[test]
fn foreign_requires_a_property() {
    let err = ForeignGenerator::new()
        .configure(IdentifierType::Long, &Properties::new(), &H2Dialect)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "param named \"property\" is required for foreign id generation strategy"
    );
}

#[test]
fn foreign_copies_the_associated_identifier() {
    let generator = configured(
        ForeignGenerator::new(),
        IdentifierType::Long,
        &Properties::new()
            .with(params::PROPERTY, "person")
            .with(params::ENTITY_NAME, "Profile"),
    );
    let session = MemoryDatabase::new().session();
    let person = Record::new("Person").with_identifier(7i64);
    let profile = Record::new("Profile").with_association("person", person);
    assert_eq!(
        generator.generate(&session, &profile).unwrap(),
        GenerationOutcome::Value(IdentifierValue::Long(7))
    );

    let orphan = Record::new("Profile");
    assert_eq!(
        generator.generate(&session, &orphan).unwrap_err().to_string(),
        "attempted to assign id from null one-to-one property [Profile.person]"
    );
}

#[test]
fn foreign_defers_when_already_persistent() {
    let generator = configured(
        ForeignGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::PROPERTY, "person"),
    );
    let session = MemoryDatabase::new().session();
    let profile = Record::new("Profile")
        .with_identifier(7i64)
        .with_association("person", Record::new("Person").with_identifier(7i64));
    session.manage(&profile);
    assert_eq!(
        generator.generate(&session, &profile).unwrap(),
        GenerationOutcome::DeferToAssociation
    );
}

#[test]
fn post_insert_generators_defer() {
    let session = MemoryDatabase::new().session();
    for generator in [
        Box::new(IdentityGenerator::new()) as Box<dyn IdentifierGenerator>,
        Box::new(SelectGenerator::new()),
    ] {
        let outcome = generator.generate(&session, &Record::new("Item")).unwrap();
        assert_eq!(outcome, GenerationOutcome::DeferToInsert);
        assert!(outcome.is_deferred());
        assert!(generator.as_post_insert().is_some());
        assert!(generator.as_persistent().is_none());
    }
}

fn person(natural_id: &[&str], generated: bool) -> EntityDescriptor {
    let person = EntityDescriptor::new("Person", "person", "id", IdentifierType::Long)
        .with_property(PropertyDescriptor::new("ssn").insert_generated(generated))
        .with_property(PropertyDescriptor::new("name"));
    if natural_id.is_empty() {
        person
    } else {
        person.with_natural_id(natural_id.iter().copied()).unwrap()
    }
}

#[test]
fn select_prefers_the_configured_key() {
    let generator = configured(
        SelectGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::KEY, "name"),
    );
    assert_eq!(
        generator
            .determine_name_of_property_to_use(&person(&[], false))
            .unwrap(),
        "name"
    );
}

#[test]
fn select_falls_back_to_the_natural_id() {
    let generator = SelectGenerator::new();
    assert_eq!(
        generator
            .determine_name_of_property_to_use(&person(&["ssn"], false))
            .unwrap(),
        "ssn"
    );
}

#[test]
fn select_reports_unusable_natural_ids() {
    let generator = SelectGenerator::new();
    let message = |entity: EntityDescriptor| {
        generator
            .determine_name_of_property_to_use(&entity)
            .unwrap_err()
            .to_string()
    };
    assert_eq!(
        message(person(&[], false)),
        "no natural-id property defined; need to specify [key] in generator parameters"
    );
    assert_eq!(
        message(person(&["ssn", "name"], false)),
        "select generator does not currently support composite natural-id properties; need to specify [key] in generator parameters"
    );
    assert_eq!(
        message(person(&["ssn"], true)),
        "natural-id also defined as insert-generated; need to specify [key] in generator parameters"
    );
}

#[test]
fn composite_plans_run_in_order() {
    let db = MemoryDatabase::new();
    let sequence: Arc<dyn IdentifierGenerator> = Arc::new(configured(
        SequenceGenerator::new(),
        IdentifierType::Long,
        &Properties::new().with(params::SEQUENCE, "line_seq"),
    ));
    create_objects(&db, sequence.as_ref());
    let uuid: Arc<dyn IdentifierGenerator> = Arc::new(configured(
        UuidGenerator::new(),
        IdentifierType::String,
        &Properties::new(),
    ));

    let mut generator = CompositeNestedGeneratedValueGenerator::new(EmbeddedIdLocator);
    generator
        .add_generated_value_plan(ValueGenerationPlan::new("line", Arc::clone(&sequence)))
        .add_generated_value_plan(ValueGenerationPlan::new("token", uuid));
    assert_eq!(generator.plan_count(), 2);

    let mut assigned = CompositeIdentifier::new();
    assigned.set("order", IdentifierValue::Long(3));
    let entity = Record::new("OrderLine").with_identifier(assigned);
    let id = generator
        .generate(&db.session(), &entity)
        .unwrap()
        .into_value()
        .unwrap();
    let id = id.as_composite().unwrap();
    let names: Vec<&str> = id.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["order", "line", "token"]);
    assert_eq!(id.get("line"), Some(&IdentifierValue::Long(1)));
}

struct RecordingPlan {
    property: &'static str,
    value: i64,
    calls: Arc<parking_lot::Mutex<Vec<(&'static str, usize)>>>,
}

impl GenerationPlan for RecordingPlan {
    fn execute(
        &self,
        _session: &dyn Session,
        _entity: &dyn Entity,
        context: &mut CompositeIdentifier,
    ) -> crate::Result<()> {
        self.calls.lock().push((self.property, context.len()));
        context.set(self.property, IdentifierValue::Long(self.value));
        Ok(())
    }

    fn register_persistent_generators(&self, _registry: &mut PersistentGeneratorRegistry) {}
}

#[test]
fn composite_plans_see_the_parts_of_earlier_plans() {
    let calls = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let mut generator = CompositeNestedGeneratedValueGenerator::new(EmbeddedIdLocator);
    for (property, value) in [("region", 7), ("branch", 11), ("serial", 13)] {
        generator.add_generated_value_plan(RecordingPlan {
            property,
            value,
            calls: Arc::clone(&calls),
        });
    }
    assert_eq!(generator.plan_count(), 3);

    let id = generator
        .generate(&MemoryDatabase::new().session(), &Record::new("Ticket"))
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(
        *calls.lock(),
        vec![("region", 0), ("branch", 1), ("serial", 2)]
    );
    let id = id.as_composite().unwrap();
    assert_eq!(id.len(), 3);
    assert_eq!(id.get("region"), Some(&IdentifierValue::Long(7)));
    assert_eq!(id.get("branch"), Some(&IdentifierValue::Long(11)));
    assert_eq!(id.get("serial"), Some(&IdentifierValue::Long(13)));
}

#[test]
fn composite_rejects_deferred_plans() {
    let mut generator = CompositeNestedGeneratedValueGenerator::new(
        |_: &dyn Session, _: &dyn crate::Entity| -> crate::Result<CompositeIdentifier> {
            Ok(CompositeIdentifier::new())
        },
    );
    generator.add_generated_value_plan(ValueGenerationPlan::new(
        "id",
        Arc::new(IdentityGenerator::new()),
    ));
    let err = generator
        .generate(&MemoryDatabase::new().session(), &Record::new("Item"))
        .unwrap_err();
    assert!(err.is_generation());
}

#[test]
fn composite_registers_nested_persistent_generators_once() {
    let table: Arc<dyn IdentifierGenerator> = Arc::new(TableGenerator::new());
    let mut generator = CompositeNestedGeneratedValueGenerator::new(EmbeddedIdLocator);
    generator
        .add_generated_value_plan(ValueGenerationPlan::new("a", Arc::clone(&table)))
        .add_generated_value_plan(ValueGenerationPlan::new("b", Arc::new(TableGenerator::new())))
        .add_generated_value_plan(ValueGenerationPlan::new("c", Arc::new(Assigned::new())));
    let mut registry = PersistentGeneratorRegistry::new();
    generator.register_persistent_generators(&mut registry);
    assert_eq!(registry.len(), 1);
}

#[test]
fn registry_orders_create_and_drop_scripts() {
    let mut registry = PersistentGeneratorRegistry::new();
    assert!(registry.register(Arc::new(TableGenerator::new())));
    assert!(registry.register(Arc::new(configured(
        SequenceGenerator::new(),
        IdentifierType::Long,
        &Properties::new(),
    ))));
    assert!(!registry.register(Arc::new(Assigned::new())));
    assert!(!registry.register(Arc::new(TableHiLoGenerator::new())));

    assert_eq!(registry.sql_create_strings(&H2Dialect).unwrap(), vec![
        "create table hibernate_unique_key ( next_hi integer )".to_owned(),
        "insert into hibernate_unique_key values ( 0 )".to_owned(),
        "create sequence hibernate_sequence start with 1 increment by 1".to_owned(),
    ]);
    assert_eq!(registry.sql_drop_strings(&H2Dialect).unwrap(), vec![
        "drop sequence if exists hibernate_sequence".to_owned(),
        "drop table if exists hibernate_unique_key".to_owned(),
    ]);

    let db = MemoryDatabase::new();
    db.execute_script(&registry.sql_create_strings(&H2Dialect).unwrap())
        .unwrap();
    db.execute_script(&registry.sql_drop_strings(&H2Dialect).unwrap())
        .unwrap();
    assert!(!db.has_table("hibernate_unique_key"));
    assert!(!db.has_sequence("hibernate_sequence"));
}
