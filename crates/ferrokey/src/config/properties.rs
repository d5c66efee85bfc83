use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// String-keyed generator parameters, consumed verbatim from the mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// The raw value, treating blank strings as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Parses an integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mapping`] when the value is not an integer.
    pub fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim().parse().map_err(|_| {
                Error::mapping(format!("parameter [{key}] must be an integer, was [{raw}]"))
            })
        })
    }

    /// Parses a boolean parameter (`true`/`false`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mapping`] when the value is not a boolean.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        self.get(key).map_or(Ok(default), |raw| {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::mapping(format!(
                    "parameter [{key}] must be true or false, was [{raw}]"
                ))),
            }
        })
    }

    /// Overlays `other` on top of these parameters.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(
            other
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
