use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    dialect::Dialect,
    error::{Error, Result},
    generator::helper,
    insert::{IdentifierGeneratingInsert, PostInsertIdentityPersister},
    jdbc::{Connection, Entity, Session, SessionExt, SqlValue, statement},
    value::{IdentifierType, IdentifierValue},
};

/// How a post-insert generator retrieves the database-assigned key.
#[derive(Clone, Debug)]
pub enum InsertGeneratedIdentifierDelegate {
    /// The driver returns the generated key columns from the insert.
    GetGeneratedKeys(GetGeneratedKeysDelegate),
    /// The insert itself is rewritten to return the key as a result set.
    InsertReturning(InsertSelectDelegate),
    /// A plain insert followed by a separate select.
    SeparateSelect(BasicDelegate),
}

/// Where a [`BasicDelegate`] reads the key back from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentitySelect {
    /// The dialect's last-identity query.
    Identity { sql: String },
    /// A lookup of the inserted row by a unique property.
    UniqueKey { sql: String, property: String },
}

#[derive(Clone, Debug)]
pub struct GetGeneratedKeysDelegate {
    dialect: Arc<dyn Dialect>,
    entity_name: String,
    key_column: String,
    identifier_type: IdentifierType,
}

#[derive(Clone, Debug)]
pub struct InsertSelectDelegate {
    dialect: Arc<dyn Dialect>,
    entity_name: String,
    identifier_type: IdentifierType,
}

#[derive(Clone, Debug)]
pub struct BasicDelegate {
    dialect: Arc<dyn Dialect>,
    entity_name: String,
    identifier_type: IdentifierType,
    select: IdentitySelect,
}

impl BasicDelegate {
    pub fn select(&self) -> &IdentitySelect {
        &self.select
    }
}

impl InsertGeneratedIdentifierDelegate {
    /// Picks the delegate for an identity column.
    ///
    /// Driver-returned keys win when enabled, then an insert-select
    /// rewrite when the dialect has one, and finally a separate
    /// last-identity select.
    ///
    /// # Errors
    ///
    /// Fails when the persister has no key column or the dialect has no
    /// identity select.
    pub fn for_identity(
        persister: &dyn PostInsertIdentityPersister,
        dialect: Arc<dyn Dialect>,
        get_generated_keys_enabled: bool,
    ) -> Result<Self> {
        let key_column = single_key_column(persister)?;
        let entity_name = persister.entity_name().to_owned();
        let identifier_type = persister.identifier_type();
        let delegate = if get_generated_keys_enabled {
            Self::GetGeneratedKeys(GetGeneratedKeysDelegate {
                dialect,
                entity_name,
                key_column: key_column.to_owned(),
                identifier_type,
            })
        } else if dialect.supports_insert_select_identity() {
            Self::InsertReturning(InsertSelectDelegate {
                dialect,
                entity_name,
                identifier_type,
            })
        } else {
            let sql = dialect.identity_select_string(persister.table_name(), key_column)?;
            Self::SeparateSelect(BasicDelegate {
                dialect,
                entity_name,
                identifier_type,
                select: IdentitySelect::Identity { sql },
            })
        };
        Ok(delegate)
    }

    /// A delegate that locates the inserted row by `property`.
    ///
    /// # Errors
    ///
    /// Fails when the persister cannot build the unique-key select, or when
    /// `property` spans more than one column, since an entity exposes a
    /// single value per property.
    pub fn for_unique_key(
        persister: &dyn PostInsertIdentityPersister,
        dialect: Arc<dyn Dialect>,
        property: &str,
    ) -> Result<Self> {
        if let Some(index) = persister.property_index(property) {
            let columns = persister.property_column_names(index).len();
            if columns > 1 {
                return Err(Error::mapping(format!(
                    "unique key property [{property}] of [{}] maps to {columns} columns; a single-column key is required",
                    persister.entity_name()
                )));
            }
        }
        Ok(Self::SeparateSelect(BasicDelegate {
            dialect,
            entity_name: persister.entity_name().to_owned(),
            identifier_type: persister.identifier_type(),
            select: IdentitySelect::UniqueKey {
                sql: persister.select_by_unique_key_string(property)?,
                property: property.to_owned(),
            },
        }))
    }

    fn dialect(&self) -> &Arc<dyn Dialect> {
        match self {
            Self::GetGeneratedKeys(d) => &d.dialect,
            Self::InsertReturning(d) => &d.dialect,
            Self::SeparateSelect(d) => &d.dialect,
        }
    }

    fn entity_name(&self) -> &str {
        match self {
            Self::GetGeneratedKeys(d) => &d.entity_name,
            Self::InsertReturning(d) => &d.entity_name,
            Self::SeparateSelect(d) => &d.entity_name,
        }
    }

    fn identifier_type(&self) -> IdentifierType {
        match self {
            Self::GetGeneratedKeys(d) => d.identifier_type,
            Self::InsertReturning(d) => d.identifier_type,
            Self::SeparateSelect(d) => d.identifier_type,
        }
    }

    /// The insert builder matching this delegate's execution strategy.
    pub fn prepare_identifier_generating_insert(&self) -> IdentifierGeneratingInsert {
        let dialect = Arc::clone(self.dialect());
        match self {
            Self::InsertReturning(_) => IdentifierGeneratingInsert::select_identity(dialect),
            Self::GetGeneratedKeys(_) | Self::SeparateSelect(_) => {
                IdentifierGeneratingInsert::new(dialect)
            }
        }
    }

    /// Executes `insert_sql` and returns the identifier the database
    /// assigned to the new row.
    ///
    /// # Errors
    ///
    /// Fails when the insert fails or no identifier can be read back.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn perform_insert(
        &self,
        session: &dyn Session,
        insert_sql: &str,
        params: &[SqlValue],
        entity: &dyn Entity,
    ) -> Result<IdentifierValue> {
        let context = format!("could not insert: [{}]", self.entity_name());
        let ty = self.identifier_type();
        session.work(|conn: &mut dyn Connection| match self {
            Self::GetGeneratedKeys(d) => {
                let keys = statement::execute_returning_keys(
                    conn,
                    insert_sql,
                    params,
                    &[d.key_column.as_str()],
                    &context,
                )?;
                helper::get_generated_identity(&keys, ty)
            }
            Self::InsertReturning(_) => {
                let rows = statement::query(conn, insert_sql, params, &context)?;
                helper::get_generated_identity(&rows, ty)
            }
            Self::SeparateSelect(d) => {
                statement::execute(conn, insert_sql, params, &context)?;
                d.read_back(conn, entity, ty)
            }
        })
    }
}

impl BasicDelegate {
    fn read_back(
        &self,
        conn: &mut dyn Connection,
        entity: &dyn Entity,
        ty: IdentifierType,
    ) -> Result<IdentifierValue> {
        match &self.select {
            IdentitySelect::Identity { sql } => {
                let rows = statement::query(
                    conn,
                    sql,
                    &[],
                    "could not retrieve generated id after insert",
                )?;
                helper::get_generated_identity(&rows, ty)
            }
            IdentitySelect::UniqueKey { sql, property } => {
                let key = entity.property(property).unwrap_or(SqlValue::Null);
                let rows = statement::query(
                    conn,
                    sql,
                    &[key],
                    "could not retrieve generated id after insert",
                )?;
                if rows.is_empty() {
                    return Err(Error::generation(format!(
                        "the inserted row could not be located by the unique key: {property}"
                    )));
                }
                helper::get_generated_identity(&rows, ty)
            }
        }
    }
}

fn single_key_column(persister: &dyn PostInsertIdentityPersister) -> Result<&str> {
    match persister.root_table_key_column_names() {
        [column] => Ok(column.as_str()),
        _ => Err(Error::generation(format!(
            "post-insert identifier generation needs a single key column on [{}]",
            persister.entity_name()
        ))),
    }
}
