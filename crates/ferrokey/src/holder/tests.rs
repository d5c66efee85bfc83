use num_bigint::BigInt;

use crate::{
    Error, HolderRepresentation, IdentifierType, IdentifierValue, IntegralDataTypeHolder, Row,
    SqlValue,
};

fn uninitialized(ty: IdentifierType) -> IntegralDataTypeHolder {
    IntegralDataTypeHolder::new(ty).unwrap()
}

fn initialized(ty: IdentifierType, value: i64) -> IntegralDataTypeHolder {
    let mut holder = uninitialized(ty);
    holder.initialize(value);
    holder
}

fn assert_uninitialized_error<T: core::fmt::Debug>(result: crate::Result<T>) {
    match result {
        Err(Error::Generation { message }) => {
            assert_eq!(message, "integral holder was not initialized");
        }
        other => panic!("expected uninitialized-holder error, got {other:?}"),
    }
}

fn run_uninitialized_guard(ty: IdentifierType) {
    let initialized_other = initialized(ty, 1);

    assert_uninitialized_error(uninitialized(ty).increment().map(|_| ()));
    assert_uninitialized_error(uninitialized(ty).decrement().map(|_| ()));
    assert_uninitialized_error(uninitialized(ty).add(1).map(|_| ()));
    assert_uninitialized_error(uninitialized(ty).subtract(1).map(|_| ()));
    assert_uninitialized_error(uninitialized(ty).multiply_by(2).map(|_| ()));
    assert_uninitialized_error(
        uninitialized(ty)
            .multiply_by_holder(&initialized_other)
            .map(|_| ()),
    );
    assert_uninitialized_error(uninitialized(ty).eq(1));
    assert_uninitialized_error(uninitialized(ty).lt(1));
    assert_uninitialized_error(uninitialized(ty).gt(1));
    assert_uninitialized_error(uninitialized(ty).eq_holder(&initialized_other));
    assert_uninitialized_error(initialized_other.lt_holder(&uninitialized(ty)));
    assert_uninitialized_error(uninitialized(ty).gt_holder(&initialized_other));
    assert_uninitialized_error(uninitialized(ty).make_value());
    assert_uninitialized_error(uninitialized(ty).make_value_then_increment());
    assert_uninitialized_error(uninitialized(ty).to_sql_value());
}

#[test]
fn basic_holder_rejects_use_before_initialization() {
    run_uninitialized_guard(IdentifierType::Long);
}

#[test]
fn big_integer_holder_rejects_use_before_initialization() {
    run_uninitialized_guard(IdentifierType::BigInteger);
}

#[test]
fn big_decimal_holder_rejects_use_before_initialization() {
    run_uninitialized_guard(IdentifierType::BigDecimal);
}

#[test]
fn string_target_has_no_integral_holder() {
    let err = IntegralDataTypeHolder::new(IdentifierType::String).unwrap_err();
    assert!(err.is_generation());
}

#[test]
fn representation_follows_target_type() {
    assert_eq!(
        uninitialized(IdentifierType::Short).representation(),
        HolderRepresentation::Basic
    );
    assert_eq!(
        uninitialized(IdentifierType::BigInteger).representation(),
        HolderRepresentation::BigInteger
    );
    assert_eq!(
        uninitialized(IdentifierType::BigDecimal).representation(),
        HolderRepresentation::BigDecimal
    );
}

#[test]
fn increment_n_times_equals_direct_initialization() {
    for ty in [
        IdentifierType::Long,
        IdentifierType::Integer,
        IdentifierType::BigInteger,
        IdentifierType::BigDecimal,
    ] {
        for n in [0, 1, 7, 1000] {
            let mut holder = initialized(ty, 0);
            for _ in 0..n {
                holder.increment().unwrap();
            }
            assert!(holder.eq_holder(&initialized(ty, n)).unwrap());
            assert!(holder.eq(n).unwrap());
        }
    }
}

#[test]
fn copy_is_an_independent_snapshot() {
    let mut original = initialized(IdentifierType::Long, 10);
    let mut copy = original.copy();
    copy.add(5).unwrap();
    original.decrement().unwrap();

    assert!(original.eq(9).unwrap());
    assert!(copy.eq(15).unwrap());
    assert!(copy.gt_holder(&original).unwrap());
    assert!(original.lt_holder(&copy).unwrap());
}

#[test]
fn arithmetic_and_comparisons() {
    let mut holder = initialized(IdentifierType::Long, 3);
    holder.multiply_by(4).unwrap().subtract(2).unwrap().add(1).unwrap();
    assert!(holder.eq(11).unwrap());
    assert!(holder.lt(12).unwrap());
    assert!(holder.gt(10).unwrap());
    assert!(!holder.gt(11).unwrap());

    let factor = initialized(IdentifierType::Long, 3);
    holder.multiply_by_holder(&factor).unwrap();
    assert!(holder.eq(33).unwrap());
}

#[test]
fn make_value_does_not_mutate() {
    let holder = initialized(IdentifierType::Long, 42);
    assert_eq!(holder.make_value().unwrap(), IdentifierValue::Long(42));
    assert_eq!(holder.make_value().unwrap(), IdentifierValue::Long(42));
}

#[test]
fn make_value_then_increment_dispenses_sequentially() {
    let mut holder = initialized(IdentifierType::Integer, 1);
    let values: Vec<_> = (0..3)
        .map(|_| holder.make_value_then_increment().unwrap())
        .collect();
    assert_eq!(
        values,
        vec![
            IdentifierValue::Integer(1),
            IdentifierValue::Integer(2),
            IdentifierValue::Integer(3)
        ]
    );
    assert!(holder.eq(4).unwrap());
}

#[test]
fn make_value_then_add_advances_by_the_addend() {
    let mut holder = initialized(IdentifierType::BigDecimal, 5);
    assert_eq!(
        holder.make_value_then_add(10).unwrap(),
        IdentifierValue::BigDecimal(BigInt::from(5))
    );
    assert!(holder.eq(15).unwrap());
}

#[test]
fn narrowing_to_short_is_checked() {
    let holder = initialized(IdentifierType::Short, i64::from(i16::MAX) + 1);
    assert!(holder.make_value().unwrap_err().is_generation());

    let holder = initialized(IdentifierType::Short, 7);
    assert_eq!(holder.make_value().unwrap(), IdentifierValue::Short(7));
}

#[test]
fn basic_overflow_is_a_generation_error() {
    let mut holder = initialized(IdentifierType::Long, i64::MAX);
    assert!(holder.increment().unwrap_err().is_generation());
    // the failed operation leaves the value untouched
    assert!(holder.eq(i64::MAX).unwrap());

    let mut wide = initialized(IdentifierType::BigInteger, i64::MAX);
    wide.increment().unwrap();
    assert_eq!(
        wide.make_value().unwrap(),
        IdentifierValue::BigInteger(BigInt::from(i64::MAX) + 1)
    );
}

#[test]
fn wide_holders_grow_without_bound() {
    for ty in [IdentifierType::BigInteger, IdentifierType::BigDecimal] {
        let mut holder = initialized(ty, i64::MAX);
        holder.multiply_by(i64::MAX).unwrap().multiply_by(4).unwrap();
        let expected: BigInt = BigInt::from(i64::MAX) * BigInt::from(i64::MAX) * 4;
        assert_eq!(holder.to_string(), expected.to_string());
        assert!(holder.gt(i64::MAX).unwrap());

        let factor = holder.copy();
        holder.multiply_by_holder(&factor).unwrap();
        let squared = &expected * &expected;
        assert_eq!(
            holder.to_sql_value().unwrap(),
            SqlValue::Numeric(squared.clone())
        );
        let value = holder.make_value().unwrap();
        assert_eq!(value.as_big_int(), Some(squared));
        assert_eq!(value.as_i128(), None);
    }
}

#[test]
fn basic_holder_rejects_a_wide_factor() {
    let mut wide = initialized(IdentifierType::BigInteger, i64::MAX);
    wide.add(1).unwrap();
    let mut basic = initialized(IdentifierType::Long, 1);
    assert!(basic.multiply_by_holder(&wide).unwrap_err().is_generation());
    assert!(basic.lt_holder(&wide).unwrap());
}

#[test]
fn initialize_from_row_reads_integral_columns() {
    let row = Row::new(vec![SqlValue::Integer(12), SqlValue::Null, "x".into()]);

    let mut holder = uninitialized(IdentifierType::Long);
    holder.initialize_from_row(&row, 0, 0).unwrap();
    assert!(holder.eq(12).unwrap());

    holder.initialize_from_row(&row, 1, 99).unwrap();
    assert!(holder.eq(99).unwrap());

    assert!(holder.initialize_from_row(&row, 2, 0).is_err());
    assert!(holder.initialize_from_row(&row, 3, 0).is_err());
}

#[test]
fn initialize_from_row_rejects_values_wider_than_basic() {
    let row = Row::new(vec![SqlValue::Numeric(BigInt::from(i64::MAX) + 1)]);
    let mut holder = uninitialized(IdentifierType::Long);
    assert!(holder.initialize_from_row(&row, 0, 0).is_err());

    let mut wide = uninitialized(IdentifierType::BigInteger);
    wide.initialize_from_row(&row, 0, 0).unwrap();
    assert!(wide.gt(i64::MAX).unwrap());
}

#[test]
fn bind_uses_the_representation_sql_type() {
    let mut params = Vec::new();
    initialized(IdentifierType::Short, 3).bind(&mut params).unwrap();
    initialized(IdentifierType::BigInteger, 4)
        .bind(&mut params)
        .unwrap();
    assert_eq!(params, vec![SqlValue::BigInt(3), SqlValue::Numeric(BigInt::from(4))]);
}
