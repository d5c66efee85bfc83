use core::{cmp::Ordering, fmt};

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{
    error::{Error, Result},
    jdbc::{Row, SqlValue},
    value::{IdentifierType, IdentifierValue},
};

/// The accumulator strategy backing an [`IntegralDataTypeHolder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HolderRepresentation {
    /// Native 64-bit arithmetic, for `Long`, `Integer` and `Short` targets.
    Basic,
    /// Arbitrary-precision arithmetic materialized as a big integer.
    BigInteger,
    /// Arbitrary-precision arithmetic materialized as a scale-zero decimal.
    BigDecimal,
}

#[derive(Clone, PartialEq, Eq)]
enum Accumulator {
    Basic(i64),
    Big(BigInt),
}

impl Accumulator {
    fn to_big(&self) -> BigInt {
        match self {
            Self::Basic(v) => BigInt::from(*v),
            Self::Big(v) => v.clone(),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Basic(a), Self::Basic(b)) => a.cmp(b),
            _ => self.to_big().cmp(&other.to_big()),
        }
    }
}

impl fmt::Display for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(v) => write!(f, "{v}"),
            Self::Big(v) => write!(f, "{v}"),
        }
    }
}

/// A mutable integral accumulator for identifier values.
///
/// The holder is created for a target [`IdentifierType`] and must be
/// initialized, either from a literal or from a result-set column, before any
/// other operation: arithmetic, comparison and materialization on an
/// uninitialized holder fail with [`Error::Generation`].
///
/// The basic representation checks arithmetic against 64 bits; the wide
/// representations never overflow. Narrowing to `Integer` or `Short` happens
/// only in [`Self::make_value`].
///
/// ```
/// use ferrokey::{IdentifierType, IdentifierValue, IntegralDataTypeHolder};
///
/// let mut hi = IntegralDataTypeHolder::new(IdentifierType::BigInteger)?;
/// hi.initialize(i64::MAX);
/// hi.multiply_by(i64::MAX)?;
/// assert_eq!(hi.to_string(), "85070591730234615847396907784232501249");
///
/// let mut small = IntegralDataTypeHolder::new(IdentifierType::Short)?;
/// small.initialize(7);
/// assert_eq!(small.make_value_then_increment()?, IdentifierValue::Short(7));
/// assert!(small.gt(7)?);
/// # Ok::<(), ferrokey::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct IntegralDataTypeHolder {
    target: IdentifierType,
    representation: HolderRepresentation,
    value: Option<Accumulator>,
}

impl IntegralDataTypeHolder {
    /// Selects the representation for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] when `target` is not integral.
    pub fn new(target: IdentifierType) -> Result<Self> {
        let representation = match target {
            IdentifierType::Long | IdentifierType::Integer | IdentifierType::Short => {
                HolderRepresentation::Basic
            }
            IdentifierType::BigInteger => HolderRepresentation::BigInteger,
            IdentifierType::BigDecimal => HolderRepresentation::BigDecimal,
            IdentifierType::String => {
                return Err(Error::generation(format!(
                    "unknown integral data type for ids : {target}"
                )));
            }
        };
        Ok(Self {
            target,
            representation,
            value: None,
        })
    }

    pub fn target(&self) -> IdentifierType {
        self.target
    }

    pub fn representation(&self) -> HolderRepresentation {
        self.representation
    }

    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }

    /// Initializes from a literal.
    pub fn initialize(&mut self, value: i64) -> &mut Self {
        self.value = Some(match self.representation {
            HolderRepresentation::Basic => Accumulator::Basic(value),
            HolderRepresentation::BigInteger | HolderRepresentation::BigDecimal => {
                Accumulator::Big(BigInt::from(value))
            }
        });
        self
    }

    /// Initializes from `row[column]`, using `default` when the column is
    /// SQL `NULL`.
    ///
    /// # Errors
    ///
    /// Fails when the column is missing, not integral, or does not fit the
    /// accumulator.
    pub fn initialize_from_row(
        &mut self,
        row: &Row,
        column: usize,
        default: i64,
    ) -> Result<&mut Self> {
        let cell = row.get(column).ok_or_else(|| {
            Error::generation(format!("result set has no column at index {column}"))
        })?;
        if cell.is_null() {
            return Ok(self.initialize(default));
        }
        let raw = cell.as_big_int().ok_or_else(|| {
            Error::generation(format!("could not read an integral value from {cell}"))
        })?;
        self.value = Some(self.accumulate(raw)?);
        Ok(self)
    }

    pub fn increment(&mut self) -> Result<&mut Self> {
        self.add(1)
    }

    pub fn decrement(&mut self) -> Result<&mut Self> {
        self.subtract(1)
    }

    pub fn add(&mut self, addend: i64) -> Result<&mut Self> {
        self.apply(|v| v.checked_add(addend), |v| *v += addend)
    }

    pub fn subtract(&mut self, subtrahend: i64) -> Result<&mut Self> {
        self.apply(|v| v.checked_sub(subtrahend), |v| *v -= subtrahend)
    }

    pub fn multiply_by(&mut self, factor: i64) -> Result<&mut Self> {
        self.apply(|v| v.checked_mul(factor), |v| *v *= factor)
    }

    pub fn multiply_by_holder(&mut self, factor: &Self) -> Result<&mut Self> {
        let factor = factor.current()?.clone();
        match factor {
            Accumulator::Basic(factor) => self.multiply_by(factor),
            Accumulator::Big(factor) => {
                let product = self.current()?.to_big() * factor;
                self.value = Some(self.accumulate(product)?);
                Ok(self)
            }
        }
    }

    pub fn eq(&self, value: i64) -> Result<bool> {
        Ok(self.compare_to(value)? == Ordering::Equal)
    }

    pub fn lt(&self, value: i64) -> Result<bool> {
        Ok(self.compare_to(value)? == Ordering::Less)
    }

    pub fn gt(&self, value: i64) -> Result<bool> {
        Ok(self.compare_to(value)? == Ordering::Greater)
    }

    pub fn eq_holder(&self, other: &Self) -> Result<bool> {
        Ok(self.current()?.compare(other.current()?) == Ordering::Equal)
    }

    pub fn lt_holder(&self, other: &Self) -> Result<bool> {
        Ok(self.current()?.compare(other.current()?) == Ordering::Less)
    }

    pub fn gt_holder(&self, other: &Self) -> Result<bool> {
        Ok(self.current()?.compare(other.current()?) == Ordering::Greater)
    }

    /// An independent snapshot of this holder.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Materializes the current value as the target type.
    ///
    /// # Errors
    ///
    /// Fails when uninitialized or when the value does not fit the target.
    pub fn make_value(&self) -> Result<IdentifierValue> {
        let current = self.current()?;
        let narrow = || {
            Error::generation(format!(
                "value {current} does not fit the {} identifier type",
                self.target
            ))
        };
        let value = match (self.target, current) {
            (IdentifierType::BigInteger, v) => IdentifierValue::BigInteger(v.to_big()),
            (IdentifierType::BigDecimal, v) => IdentifierValue::BigDecimal(v.to_big()),
            (IdentifierType::Long, Accumulator::Basic(v)) => IdentifierValue::Long(*v),
            (IdentifierType::Integer, Accumulator::Basic(v)) => {
                IdentifierValue::Integer(i32::try_from(*v).map_err(|_| narrow())?)
            }
            (IdentifierType::Short, Accumulator::Basic(v)) => {
                IdentifierValue::Short(i16::try_from(*v).map_err(|_| narrow())?)
            }
            _ => return Err(narrow()),
        };
        Ok(value)
    }

    /// Materializes the current value, then increments.
    pub fn make_value_then_increment(&mut self) -> Result<IdentifierValue> {
        let value = self.make_value()?;
        self.increment()?;
        Ok(value)
    }

    /// Materializes the current value, then adds `addend`.
    pub fn make_value_then_add(&mut self, addend: i64) -> Result<IdentifierValue> {
        let value = self.make_value()?;
        self.add(addend)?;
        Ok(value)
    }

    /// The current value as a bind parameter of the representation's SQL
    /// type.
    pub fn to_sql_value(&self) -> Result<SqlValue> {
        Ok(match self.current()? {
            Accumulator::Basic(v) => SqlValue::BigInt(*v),
            Accumulator::Big(v) => SqlValue::Numeric(v.clone()),
        })
    }

    /// Appends the current value to a positional parameter list.
    pub fn bind(&self, params: &mut Vec<SqlValue>) -> Result<()> {
        params.push(self.to_sql_value()?);
        Ok(())
    }

    fn current(&self) -> Result<&Accumulator> {
        self.value
            .as_ref()
            .ok_or_else(|| Error::generation("integral holder was not initialized"))
    }

    fn compare_to(&self, value: i64) -> Result<Ordering> {
        Ok(match self.current()? {
            Accumulator::Basic(v) => v.cmp(&value),
            Accumulator::Big(v) => v.cmp(&BigInt::from(value)),
        })
    }

    fn apply(
        &mut self,
        basic: impl FnOnce(i64) -> Option<i64>,
        big: impl FnOnce(&mut BigInt),
    ) -> Result<&mut Self> {
        let representation = self.representation;
        match self
            .value
            .as_mut()
            .ok_or_else(|| Error::generation("integral holder was not initialized"))?
        {
            Accumulator::Basic(v) => *v = basic(*v).ok_or_else(|| overflow(representation))?,
            Accumulator::Big(v) => big(v),
        }
        Ok(self)
    }

    fn accumulate(&self, value: BigInt) -> Result<Accumulator> {
        match self.representation {
            HolderRepresentation::Basic => value
                .to_i64()
                .map(Accumulator::Basic)
                .ok_or_else(|| overflow(self.representation)),
            HolderRepresentation::BigInteger | HolderRepresentation::BigDecimal => {
                Ok(Accumulator::Big(value))
            }
        }
    }
}

fn overflow(representation: HolderRepresentation) -> Error {
    Error::generation(format!(
        "integral holder overflowed its {representation:?} representation"
    ))
}

impl fmt::Debug for IntegralDataTypeHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "IntegralDataTypeHolder[{}:{v}]", self.target),
            None => write!(f, "IntegralDataTypeHolder[{}:uninitialized]", self.target),
        }
    }
}

impl fmt::Display for IntegralDataTypeHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("uninitialized"),
        }
    }
}
