use std::collections::BTreeMap;

use crate::{
    jdbc::{Entity, SqlValue},
    value::IdentifierValue,
};

/// A dynamically typed entity instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    entity_name: String,
    identifier: Option<IdentifierValue>,
    properties: BTreeMap<String, SqlValue>,
    associations: BTreeMap<String, Record>,
}

impl Record {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<IdentifierValue>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_association(mut self, name: impl Into<String>, record: Record) -> Self {
        self.associations.insert(name.into(), record);
        self
    }

    pub fn set_identifier(&mut self, identifier: IdentifierValue) {
        self.identifier = Some(identifier);
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Entity for Record {
    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn identifier(&self) -> Option<IdentifierValue> {
        self.identifier.clone()
    }

    fn property(&self, name: &str) -> Option<SqlValue> {
        self.properties.get(name).cloned()
    }

    fn association(&self, name: &str) -> Option<&dyn Entity> {
        self.associations.get(name).map(|r| r as &dyn Entity)
    }
}
