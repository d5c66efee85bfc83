use crate::{
    dialect::{Dialect, SqlType},
    error::{Error, Result},
    value::IdentifierType,
};

/// The entity metadata post-insert generators consult.
pub trait PostInsertIdentityPersister {
    fn entity_name(&self) -> &str;

    /// The root table rows are inserted into.
    fn table_name(&self) -> &str;

    fn root_table_key_column_names(&self) -> &[String];

    fn identifier_type(&self) -> IdentifierType;

    /// Index of the named property, if mapped.
    fn property_index(&self, name: &str) -> Option<usize>;

    fn property_name(&self, index: usize) -> &str;

    fn property_column_names(&self, index: usize) -> &[String];

    /// Whether the database generates the property's value on insert.
    fn is_property_insert_generated(&self, index: usize) -> bool;

    /// Indexes of the natural-id properties, when the entity declares one.
    fn natural_id_properties(&self) -> Option<&[usize]>;

    /// `select <key columns> from <table> where <property columns> = ?`.
    ///
    /// # Errors
    ///
    /// Fails when `property` is not mapped.
    fn select_by_unique_key_string(&self, property: &str) -> Result<String>;
}

/// A mapped, non-identifier property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    columns: Vec<String>,
    sql_type: SqlType,
    insert_generated: bool,
}

impl PropertyDescriptor {
    /// A `varchar(255)` property stored in the column of the same name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            columns: vec![name.clone()],
            name,
            sql_type: SqlType::Varchar(255),
            insert_generated: false,
        }
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_sql_type(mut self, sql_type: SqlType) -> Self {
        self.sql_type = sql_type;
        self
    }

    #[must_use]
    pub fn insert_generated(mut self, generated: bool) -> Self {
        self.insert_generated = generated;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped columns, defaulting to the property name.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    /// Whether the database fills this property during the insert.
    pub fn is_insert_generated(&self) -> bool {
        self.insert_generated
    }
}

/// A plain-data [`PostInsertIdentityPersister`] for a single-table entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    entity_name: String,
    table_name: String,
    key_columns: Vec<String>,
    identifier_type: IdentifierType,
    properties: Vec<PropertyDescriptor>,
    natural_id: Option<Vec<usize>>,
}

impl EntityDescriptor {
    /// An entity stored in `table_name` with a single key column.
    pub fn new(
        entity_name: impl Into<String>,
        table_name: impl Into<String>,
        key_column: impl Into<String>,
        identifier_type: IdentifierType,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            table_name: table_name.into(),
            key_columns: vec![key_column.into()],
            identifier_type,
            properties: Vec::new(),
            natural_id: None,
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Declares the natural id.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Mapping`] when a name is not a mapped property.
    pub fn with_natural_id<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let indexes = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.property_index(name).ok_or_else(|| {
                    Error::mapping(format!(
                        "natural-id property [{name}] is not mapped on [{}]",
                        self.entity_name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.natural_id = Some(indexes);
        Ok(self)
    }

    /// Mapped properties in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// DDL for the entity table.
    ///
    /// With `identity` set the key column is declared as a database identity
    /// column.
    ///
    /// # Errors
    ///
    /// Fails when `identity` is requested and the dialect has no identity
    /// columns.
    pub fn sql_create_string(&self, dialect: &dyn Dialect, identity: bool) -> Result<String> {
        let key_type = match self.identifier_type {
            IdentifierType::Short => SqlType::SmallInt,
            IdentifierType::Integer => SqlType::Integer,
            IdentifierType::Long => SqlType::BigInt,
            IdentifierType::BigInteger | IdentifierType::BigDecimal => SqlType::Numeric,
            IdentifierType::String => SqlType::Varchar(255),
        };
        let mut columns = Vec::with_capacity(self.key_columns.len() + self.properties.len());
        for key in &self.key_columns {
            let suffix = if identity {
                format!(" {}", dialect.identity_column_string()?)
            } else {
                " not null".to_owned()
            };
            columns.push(format!("{key} {}{suffix}", dialect.type_name(key_type)));
        }
        for property in &self.properties {
            for column in &property.columns {
                columns.push(format!("{column} {}", dialect.type_name(property.sql_type)));
            }
        }
        columns.push(format!("primary key ({})", self.key_columns.join(", ")));
        Ok(format!(
            "{} {} ({}){}",
            dialect.create_table_string(),
            self.table_name,
            columns.join(", "),
            dialect.table_type_string()
        ))
    }
}

impl PostInsertIdentityPersister for EntityDescriptor {
    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn root_table_key_column_names(&self) -> &[String] {
        &self.key_columns
    }

    fn identifier_type(&self) -> IdentifierType {
        self.identifier_type
    }

    fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    fn property_name(&self, index: usize) -> &str {
        self.properties.get(index).map_or("", |p| p.name.as_str())
    }

    fn property_column_names(&self, index: usize) -> &[String] {
        self.properties
            .get(index)
            .map(|p| p.columns.as_slice())
            .unwrap_or_default()
    }

    fn is_property_insert_generated(&self, index: usize) -> bool {
        self.properties.get(index).is_some_and(|p| p.insert_generated)
    }

    fn natural_id_properties(&self) -> Option<&[usize]> {
        self.natural_id.as_deref()
    }

    fn select_by_unique_key_string(&self, property: &str) -> Result<String> {
        let index = self.property_index(property).ok_or_else(|| {
            Error::mapping(format!(
                "unique key property [{property}] is not mapped on [{}]",
                self.entity_name
            ))
        })?;
        let filter = self.properties[index]
            .columns
            .iter()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(" and ");
        Ok(format!(
            "select {} from {} where {filter}",
            self.key_columns.join(", "),
            self.table_name
        ))
    }
}
