use core::{fmt, str::FromStr};

use crate::error::Error;

/// The closed set of representations an identifier property may declare.
///
/// `BigInteger` and `BigDecimal` are arbitrary-precision; decimals always
/// carry scale zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IdentifierType {
    Long,
    Integer,
    Short,
    BigInteger,
    BigDecimal,
    String,
}

impl IdentifierType {
    /// Canonical short name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Integer => "integer",
            Self::Short => "short",
            Self::BigInteger => "big_integer",
            Self::BigDecimal => "big_decimal",
            Self::String => "string",
        }
    }

    /// Whether values of this type can live in an integral holder.
    pub const fn is_integral(self) -> bool {
        !matches!(self, Self::String)
    }

    /// Whether this type fits a native 64-bit accumulator.
    pub const fn is_native(self) -> bool {
        matches!(self, Self::Long | Self::Integer | Self::Short)
    }

    /// Inclusive value range of the native types; `None` for the
    /// unbounded ones.
    pub(crate) const fn bounds(self) -> Option<(i128, i128)> {
        match self {
            Self::Short => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Integer => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Long => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::BigInteger | Self::BigDecimal | Self::String => None,
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IdentifierType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim() {
            "long" | "i64" | "java.lang.Long" => Self::Long,
            "int" | "integer" | "i32" | "java.lang.Integer" => Self::Integer,
            "short" | "i16" | "java.lang.Short" => Self::Short,
            "big_integer" | "biginteger" | "java.math.BigInteger" => Self::BigInteger,
            "big_decimal" | "bigdecimal" | "java.math.BigDecimal" => Self::BigDecimal,
            "string" | "java.lang.String" => Self::String,
            other => {
                return Err(Error::mapping(format!(
                    "unsupported identifier type [{other}]; expected one of long, integer, short, big_integer, big_decimal, string"
                )));
            }
        };
        Ok(ty)
    }
}
