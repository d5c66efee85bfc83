use core::fmt;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// A single positional parameter or result-set column value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SqlValue {
    Null,
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    /// An arbitrary-precision numeric/decimal value with scale zero.
    Numeric(BigInt),
    Text(String),
}

impl SqlValue {
    /// Widens any integral variant to `i128`; `None` for numerics beyond
    /// that range.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::SmallInt(v) => Some(i128::from(*v)),
            Self::Integer(v) => Some(i128::from(*v)),
            Self::BigInt(v) => Some(i128::from(*v)),
            Self::Numeric(v) => v.to_i128(),
            Self::Null | Self::Text(_) => None,
        }
    }

    /// Any integral variant as an arbitrary-precision integer.
    pub fn as_big_int(&self) -> Option<BigInt> {
        match self {
            Self::SmallInt(v) => Some(BigInt::from(*v)),
            Self::Integer(v) => Some(BigInt::from(*v)),
            Self::BigInt(v) => Some(BigInt::from(*v)),
            Self::Numeric(v) => Some(v.clone()),
            Self::Null | Self::Text(_) => None,
        }
    }

    /// The narrowest integral variant holding `value`: `BigInt` when it fits
    /// 64 bits, `Numeric` otherwise.
    pub fn integral(value: BigInt) -> Self {
        match value.to_i64() {
            Some(v) => Self::BigInt(v),
            None => Self::Numeric(value),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// SQL equality: integral values compare numerically regardless of width
    /// and `NULL` equals nothing.
    pub fn sql_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => match (self.as_i128(), other.as_i128()) {
                (Some(a), Some(b)) => a == b,
                _ => matches!(
                    (self.as_big_int(), other.as_big_int()),
                    (Some(a), Some(b)) if a == b
                ),
            },
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::SmallInt(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i16> for SqlValue {
    fn from(value: i16) -> Self {
        Self::SmallInt(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<BigInt> for SqlValue {
    fn from(value: BigInt) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One row of a result set (or of a generated-keys set).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row(Vec<SqlValue>);

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self(values)
    }

    /// Returns the column at a zero-based index.
    pub fn get(&self, column: usize) -> Option<&SqlValue> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.0
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.0
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self(values)
    }
}
