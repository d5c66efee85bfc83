//! Entity mappings read from the JSON mapping file.
//!
//! ```json
//! [
//!   {
//!     "entity": "Order",
//!     "table": "orders",
//!     "identifier_column": "id",
//!     "identifier_type": "long",
//!     "strategy": "hilo",
//!     "params": { "max_lo": 100 },
//!     "properties": ["code"],
//!     "natural_id": ["code"]
//!   }
//! ]
//! ```

use std::collections::BTreeMap;

use anyhow::Context;
use ferrokey::{
    EntityDescriptor, IdentifierType, Properties, PropertyDescriptor, params as keys,
};
use serde::{Deserialize, Deserializer};

/// One mapped entity and the strategy generating its identifiers.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityMapping {
    pub entity: String,
    pub table: String,
    #[serde(default = "default_identifier_column")]
    pub identifier_column: String,
    #[serde(
        default = "default_identifier_type",
        deserialize_with = "identifier_type"
    )]
    pub identifier_type: IdentifierType,
    pub strategy: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub natural_id: Vec<String>,
}

/// A generator parameter as written in JSON. Generators only see strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl ParamValue {
    fn into_param(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
        }
    }
}

fn default_identifier_column() -> String {
    "id".to_owned()
}

fn default_identifier_type() -> IdentifierType {
    IdentifierType::Long
}

fn identifier_type<'de, D>(deserializer: D) -> Result<IdentifierType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl EntityMapping {
    /// Generator parameters: the mapping's own plus the entity defaults a
    /// mapping layer would supply.
    pub fn generator_params(&self) -> Properties {
        let defaults = Properties::new()
            .with(keys::ENTITY_NAME, self.entity.as_str())
            .with(keys::TARGET_TABLE, self.table.as_str())
            .with(keys::TARGET_COLUMN, self.identifier_column.as_str());
        let own: Properties = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into_param()))
            .collect();
        defaults.merged(&own)
    }

    /// The persister describing the entity table.
    pub fn descriptor(&self) -> anyhow::Result<EntityDescriptor> {
        let descriptor = self.properties.iter().fold(
            EntityDescriptor::new(
                self.entity.as_str(),
                self.table.as_str(),
                self.identifier_column.as_str(),
                self.identifier_type,
            ),
            |descriptor, name| descriptor.with_property(PropertyDescriptor::new(name.as_str())),
        );
        if self.natural_id.is_empty() {
            return Ok(descriptor);
        }
        descriptor
            .with_natural_id(&self.natural_id)
            .with_context(|| format!("invalid natural id for [{}]", self.entity))
    }
}

/// Parses the mapping file contents.
pub fn parse_mappings(json: &str) -> anyhow::Result<Vec<EntityMapping>> {
    let mappings: Vec<EntityMapping> =
        serde_json::from_str(json).context("malformed mapping file")?;
    let mut seen = std::collections::HashSet::new();
    for mapping in &mappings {
        if !seen.insert(mapping.entity.as_str()) {
            anyhow::bail!("entity [{}] is mapped more than once", mapping.entity);
        }
    }
    Ok(mappings)
}
