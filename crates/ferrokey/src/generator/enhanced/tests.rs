use crate::{
    EnhancedTableGenerator, Error, H2Dialect, IdentifierGenerator, IdentifierType,
    IdentifierValue, IntegralDataTypeHolder, MemoryDatabase, Optimizer, OptimizerKind,
    PersistentIdentifierGenerator, Properties, Record, params,
};

use super::table::{INCREMENT_PARAM, OPTIMIZER_PARAM, SEGMENT_VALUE_PARAM};

/// A value source replaying `values`, counting calls.
struct Replay {
    values: Vec<i64>,
    calls: usize,
}

impl Replay {
    fn new(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
            calls: 0,
        }
    }

    fn next(&mut self) -> crate::Result<IntegralDataTypeHolder> {
        let value = *self
            .values
            .get(self.calls)
            .ok_or_else(|| Error::generation("replay exhausted"))?;
        self.calls += 1;
        let mut holder = IntegralDataTypeHolder::new(IdentifierType::Long)?;
        holder.initialize(value);
        Ok(holder)
    }
}

fn dispense(optimizer: &Optimizer, replay: &mut Replay, count: usize) -> Vec<i64> {
    (0..count)
        .map(|_| {
            optimizer
                .generate(&mut || replay.next())
                .unwrap()
                .as_i64()
                .unwrap()
        })
        .collect()
}

#[test]
fn optimizer_names_round_trip() {
    for kind in [
        OptimizerKind::None,
        OptimizerKind::HiLo,
        OptimizerKind::Pooled,
        OptimizerKind::PooledLo,
    ] {
        assert_eq!(kind.name().parse::<OptimizerKind>().unwrap(), kind);
    }
    let err = "legacy".parse::<OptimizerKind>().unwrap_err();
    assert_eq!(err.to_string(), "unknown optimizer strategy [legacy]");
}

#[test]
fn bucketing_optimizers_need_a_positive_increment() {
    let err = Optimizer::new(OptimizerKind::Pooled, IdentifierType::Long, 0, -1).unwrap_err();
    assert!(err.is_mapping());
    assert_eq!(err.to_string(), "increment size cannot be less than 1, was 0");
    assert!(Optimizer::new(OptimizerKind::None, IdentifierType::Long, 0, -1).is_ok());
    assert!(Optimizer::new(OptimizerKind::HiLo, IdentifierType::String, 10, -1).is_err());
}

#[test]
fn only_pooled_optimizers_advance_sources_by_increment() {
    let applies = |kind| {
        Optimizer::new(kind, IdentifierType::Long, 10, -1)
            .unwrap()
            .applies_increment_size_to_source_values()
    };
    assert!(!applies(OptimizerKind::None));
    assert!(!applies(OptimizerKind::HiLo));
    assert!(applies(OptimizerKind::Pooled));
    assert!(applies(OptimizerKind::PooledLo));
}

#[test]
fn no_op_optimizer_skips_non_positive_values() {
    let optimizer = Optimizer::new(OptimizerKind::None, IdentifierType::Long, 1, -1).unwrap();
    let mut replay = Replay::new(&[-1, 0, 1, 2]);
    assert_eq!(dispense(&optimizer, &mut replay, 2), vec![1, 2]);
    assert_eq!(replay.calls, 4);
    assert!(optimizer.last_source_value().unwrap().eq(2).unwrap());
}

#[test]
fn hilo_optimizer_buckets_source_values() {
    let optimizer = Optimizer::new(OptimizerKind::HiLo, IdentifierType::Long, 10, -1).unwrap();
    let mut replay = Replay::new(&[1, 2]);
    let ids = dispense(&optimizer, &mut replay, 11);
    assert_eq!(ids, (1..=11).collect::<Vec<_>>());
    assert_eq!(replay.calls, 2);
}

#[test]
fn hilo_optimizer_skips_a_zero_source() {
    let optimizer = Optimizer::new(OptimizerKind::HiLo, IdentifierType::Long, 5, -1).unwrap();
    let mut replay = Replay::new(&[0, 1]);
    assert_eq!(dispense(&optimizer, &mut replay, 2), vec![1, 2]);
}

#[test]
fn pooled_optimizer_reads_twice_for_the_initial_value() {
    let optimizer = Optimizer::new(OptimizerKind::Pooled, IdentifierType::Long, 10, 1).unwrap();
    let mut replay = Replay::new(&[1, 11, 21]);
    let ids = dispense(&optimizer, &mut replay, 12);
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
    assert_eq!(replay.calls, 3);
    assert!(optimizer.last_source_value().unwrap().eq(21).unwrap());
}

#[test]
fn pooled_optimizer_treats_later_values_as_upper_bounds() {
    let optimizer = Optimizer::new(OptimizerKind::Pooled, IdentifierType::Long, 10, 1).unwrap();
    let mut replay = Replay::new(&[31, 41]);
    let ids = dispense(&optimizer, &mut replay, 11);
    assert_eq!(ids, (22..=32).collect::<Vec<_>>());
    assert_eq!(replay.calls, 2);
}

#[test]
fn pooled_lo_optimizer_treats_values_as_lower_bounds() {
    let optimizer = Optimizer::new(OptimizerKind::PooledLo, IdentifierType::Long, 10, -1).unwrap();
    let mut replay = Replay::new(&[1, 11]);
    let ids = dispense(&optimizer, &mut replay, 11);
    assert_eq!(ids, (1..=11).collect::<Vec<_>>());
    assert_eq!(replay.calls, 2);
}

#[test]
fn optimizer_propagates_source_errors() {
    let optimizer = Optimizer::new(OptimizerKind::HiLo, IdentifierType::Long, 10, -1).unwrap();
    let mut replay = Replay::new(&[]);
    assert!(optimizer.generate(&mut || replay.next()).is_err());
}

fn enhanced(props: Properties) -> (MemoryDatabase, EnhancedTableGenerator) {
    let mut generator = EnhancedTableGenerator::new();
    generator
        .configure(IdentifierType::Long, &props, &H2Dialect)
        .unwrap();
    let db = MemoryDatabase::new();
    db.execute_script(&generator.sql_create_strings(&H2Dialect).unwrap())
        .unwrap();
    (db, generator)
}

fn next(generator: &EnhancedTableGenerator, db: &MemoryDatabase) -> i64 {
    generator
        .generate(&db.session(), &Record::new("Item"))
        .unwrap()
        .into_value()
        .and_then(|v| v.as_i64())
        .unwrap()
}

#[test]
fn enhanced_table_defaults() {
    let (_, generator) = enhanced(Properties::new());
    assert_eq!(generator.table_name(), "hibernate_sequences");
    assert_eq!(generator.segment_column_name(), "sequence_name");
    assert_eq!(generator.segment_value(), "default");
    assert_eq!(generator.value_column_name(), "next_val");
    assert_eq!(generator.initial_value(), 1);
    assert_eq!(generator.increment_size(), 1);
    assert_eq!(
        generator.optimizer().map(Optimizer::kind),
        Some(OptimizerKind::None)
    );
    assert_eq!(
        generator.sql_create_strings(&H2Dialect).unwrap(),
        vec![
            "create table hibernate_sequences ( sequence_name varchar(255) not null, next_val bigint, primary key ( sequence_name ) )"
                .to_owned()
        ]
    );
}

#[test]
fn enhanced_table_without_optimizer_hits_the_table_each_time() {
    let (db, generator) = enhanced(Properties::new());
    assert_eq!((0..3).map(|_| next(&generator, &db)).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(generator.table_access_count(), 3);
}

#[test]
fn enhanced_table_pools_values() {
    let (db, generator) = enhanced(Properties::new().with(INCREMENT_PARAM, "10"));
    assert_eq!(
        generator.optimizer().map(Optimizer::kind),
        Some(OptimizerKind::Pooled)
    );
    let ids: Vec<i64> = (0..12).map(|_| next(&generator, &db)).collect();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
    assert_eq!(generator.table_access_count(), 3);

    let rows = db.table_rows("hibernate_sequences").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(1).and_then(|v| v.as_i128()), Some(31));
}

#[test]
fn enhanced_table_prefers_pooled_lo_when_asked() {
    let (db, generator) = enhanced(
        Properties::new()
            .with(INCREMENT_PARAM, "5")
            .with(super::table::PREFER_POOLED_LO_PARAM, "true"),
    );
    assert_eq!(
        generator.optimizer().map(Optimizer::kind),
        Some(OptimizerKind::PooledLo)
    );
    let ids: Vec<i64> = (0..6).map(|_| next(&generator, &db)).collect();
    assert_eq!(ids, (1..=6).collect::<Vec<_>>());
    assert_eq!(generator.table_access_count(), 2);
}

#[test]
fn enhanced_table_segments_share_a_table() {
    let (db, orders) = enhanced(Properties::new().with(SEGMENT_VALUE_PARAM, "orders"));
    let mut items = EnhancedTableGenerator::new();
    items
        .configure(
            IdentifierType::Long,
            &Properties::new()
                .with(super::table::PREFER_SEGMENT_PER_ENTITY_PARAM, "true")
                .with(params::TARGET_TABLE, "items"),
            &H2Dialect,
        )
        .unwrap();
    assert_eq!(items.segment_value(), "items");
    assert_eq!(orders.generator_key(), items.generator_key());

    assert_eq!(next(&orders, &db), 1);
    assert_eq!(next(&orders, &db), 2);
    assert_eq!(next(&items, &db), 1);
    assert_eq!(db.table_rows("hibernate_sequences").unwrap().len(), 2);
}

#[test]
fn enhanced_table_honours_an_explicit_optimizer() {
    let (db, generator) = enhanced(
        Properties::new()
            .with(INCREMENT_PARAM, "10")
            .with(OPTIMIZER_PARAM, "hilo"),
    );
    let ids: Vec<i64> = (0..3).map(|_| next(&generator, &db)).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(generator.table_access_count(), 1);
}

#[test]
fn enhanced_table_rejects_unknown_optimizers() {
    let mut generator = EnhancedTableGenerator::new();
    let err = generator
        .configure(
            IdentifierType::Long,
            &Properties::new().with(OPTIMIZER_PARAM, "legacy"),
            &H2Dialect,
        )
        .unwrap_err();
    assert!(err.is_mapping());
}

#[test]
fn enhanced_table_produces_narrow_types() {
    let mut generator = EnhancedTableGenerator::new();
    generator
        .configure(IdentifierType::Integer, &Properties::new(), &H2Dialect)
        .unwrap();
    let db = MemoryDatabase::new();
    db.execute_script(&generator.sql_create_strings(&H2Dialect).unwrap())
        .unwrap();
    assert_eq!(
        generator
            .generate(&db.session(), &Record::new("Item"))
            .unwrap()
            .into_value(),
        Some(IdentifierValue::Integer(1))
    );
}
