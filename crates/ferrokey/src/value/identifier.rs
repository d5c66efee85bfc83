use core::fmt;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{
    jdbc::SqlValue,
    value::{CompositeIdentifier, IdentifierType},
};

/// An identifier assigned to exactly one entity instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IdentifierValue {
    Long(i64),
    Integer(i32),
    Short(i16),
    BigInteger(#[cfg_attr(feature = "serde", serde(with = "big_int_text"))] BigInt),
    /// A decimal of scale zero.
    BigDecimal(#[cfg_attr(feature = "serde", serde(with = "big_int_text"))] BigInt),
    String(String),
    Composite(CompositeIdentifier),
}

impl IdentifierValue {
    /// The declared type this value materializes, or `None` for composites.
    pub fn identifier_type(&self) -> Option<IdentifierType> {
        match self {
            Self::Long(_) => Some(IdentifierType::Long),
            Self::Integer(_) => Some(IdentifierType::Integer),
            Self::Short(_) => Some(IdentifierType::Short),
            Self::BigInteger(_) => Some(IdentifierType::BigInteger),
            Self::BigDecimal(_) => Some(IdentifierType::BigDecimal),
            Self::String(_) => Some(IdentifierType::String),
            Self::Composite(_) => None,
        }
    }

    /// The integral value as `i128`; `None` for non-integral values and
    /// for wide values beyond that range.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Long(v) => Some(i128::from(*v)),
            Self::Integer(v) => Some(i128::from(*v)),
            Self::Short(v) => Some(i128::from(*v)),
            Self::BigInteger(v) | Self::BigDecimal(v) => v.to_i128(),
            Self::String(_) | Self::Composite(_) => None,
        }
    }

    pub fn as_big_int(&self) -> Option<BigInt> {
        match self {
            Self::Long(v) => Some(BigInt::from(*v)),
            Self::Integer(v) => Some(BigInt::from(*v)),
            Self::Short(v) => Some(BigInt::from(*v)),
            Self::BigInteger(v) | Self::BigDecimal(v) => Some(v.clone()),
            Self::String(_) | Self::Composite(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeIdentifier> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// The value as a bind parameter; composites have no single-column form.
    pub fn to_sql_value(&self) -> Option<SqlValue> {
        let value = match self {
            Self::Long(v) => SqlValue::BigInt(*v),
            Self::Integer(v) => SqlValue::Integer(*v),
            Self::Short(v) => SqlValue::SmallInt(*v),
            Self::BigInteger(v) | Self::BigDecimal(v) => SqlValue::Numeric(v.clone()),
            Self::String(s) => SqlValue::Text(s.clone()),
            Self::Composite(_) => return None,
        };
        Some(value)
    }
}

impl fmt::Display for IdentifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::BigInteger(v) | Self::BigDecimal(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Composite(c) => write!(f, "{c}"),
        }
    }
}

impl From<i64> for IdentifierValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<i32> for IdentifierValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i16> for IdentifierValue {
    fn from(value: i16) -> Self {
        Self::Short(value)
    }
}

impl From<String> for IdentifierValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for IdentifierValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<CompositeIdentifier> for IdentifierValue {
    fn from(value: CompositeIdentifier) -> Self {
        Self::Composite(value)
    }
}

impl From<BigInt> for IdentifierValue {
    fn from(value: BigInt) -> Self {
        Self::BigInteger(value)
    }
}

/// Wide integers serialize as decimal strings.
#[cfg(feature = "serde")]
mod big_int_text {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(
        value: &BigInt,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid integer [{text}]")))
    }
}
