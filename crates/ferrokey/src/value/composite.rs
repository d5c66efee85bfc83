use core::fmt;

use crate::value::IdentifierValue;

/// The value of a multi-property identifier, keyed by property name in
/// injection order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CompositeIdentifier {
    parts: Vec<(String, IdentifierValue)>,
}

impl CompositeIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a part, replacing any existing value for `property` in place.
    pub fn set(&mut self, property: impl Into<String>, value: IdentifierValue) {
        let property = property.into();
        match self.parts.iter_mut().find(|(name, _)| *name == property) {
            Some((_, slot)) => *slot = value,
            None => self.parts.push((property, value)),
        }
    }

    pub fn get(&self, property: &str) -> Option<&IdentifierValue> {
        self.parts
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IdentifierValue)> {
        self.parts.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl fmt::Display for CompositeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}
