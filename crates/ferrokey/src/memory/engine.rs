use std::collections::{BTreeMap, HashMap};

use crate::{
    jdbc::{Row, SqlError, SqlValue},
    memory::sql::{self, ColumnDef, Expr, Projection, Returning, Select, Statement},
};

const UNDEFINED_OBJECT: &str = "42S02";
const DUPLICATE_OBJECT: &str = "42S01";
const UNDEFINED_COLUMN: &str = "42S22";
const INVALID_PARAMETER: &str = "07001";

#[derive(Debug)]
struct Column {
    name: String,
    identity: bool,
}

#[derive(Debug)]
struct Table {
    columns: Vec<Column>,
    rows: BTreeMap<u64, Vec<SqlValue>>,
    next_row_id: u64,
    next_identity: i128,
}

impl Table {
    fn new(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|c| Column {
                    name: c.name,
                    identity: c.identity,
                })
                .collect(),
            rows: BTreeMap::new(),
            next_row_id: 0,
            next_identity: 1,
        }
    }

    fn column_index(&self, table: &str, name: &str) -> Result<usize, SqlError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| {
                SqlError::with_state(
                    format!("column {name} not found in table {table}"),
                    UNDEFINED_COLUMN,
                )
            })
    }

    fn matching_rows(
        &self,
        table: &str,
        filter: &[(String, Expr)],
        params: &[SqlValue],
    ) -> Result<Vec<u64>, SqlError> {
        let conditions = filter
            .iter()
            .map(|(column, expr)| {
                Ok((self.column_index(table, column)?, value_of(expr, params)?))
            })
            .collect::<Result<Vec<_>, SqlError>>()?;
        Ok(self
            .rows
            .iter()
            .filter(|(_, row)| {
                conditions
                    .iter()
                    .all(|(index, value)| row[*index].sql_eq(value))
            })
            .map(|(id, _)| *id)
            .collect())
    }
}

#[derive(Debug)]
struct Sequence {
    next: i128,
    increment: i128,
}

/// A change to undo when the owning transaction rolls back.
#[derive(Debug)]
pub(crate) enum Undo {
    Insert {
        table: String,
        row_id: u64,
    },
    Update {
        table: String,
        row_id: u64,
        previous: Vec<SqlValue>,
    },
}

/// Per-connection state: the transaction's undo log and the last identity
/// value generated on this connection.
#[derive(Debug, Default)]
pub(crate) struct ConnectionState {
    pub(crate) last_identity: Option<i128>,
    pub(crate) undo: Option<Vec<Undo>>,
}

impl ConnectionState {
    pub(crate) fn in_transaction() -> Self {
        Self {
            last_identity: None,
            undo: Some(Vec::new()),
        }
    }

    fn record(&mut self, undo: Undo) {
        if let Some(log) = self.undo.as_mut() {
            log.push(undo);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub(crate) rows: Vec<Row>,
    pub(crate) affected: u64,
    /// Column names and values of the inserted row.
    pub(crate) inserted: Option<(Vec<String>, Vec<SqlValue>)>,
}

/// Tables and sequences of one in-memory database.
///
/// Row changes are undoable per transaction; DDL and sequence advances are
/// not, as in most databases.
#[derive(Debug, Default)]
pub(crate) struct Engine {
    tables: HashMap<String, Table>,
    sequences: HashMap<String, Sequence>,
    log: Vec<String>,
}

impl Engine {
    pub(crate) fn run(
        &mut self,
        sql: &str,
        params: &[SqlValue],
        state: &mut ConnectionState,
    ) -> Result<Outcome, SqlError> {
        self.log.push(sql.to_owned());
        match sql::parse(sql)? {
            Statement::CreateTable { table, columns } => {
                if self.tables.contains_key(&table) {
                    return Err(SqlError::with_state(
                        format!("table {table} already exists"),
                        DUPLICATE_OBJECT,
                    ));
                }
                self.tables.insert(table, Table::new(columns));
                Ok(Outcome::default())
            }
            Statement::DropTable { table, if_exists } => {
                if self.tables.remove(&table).is_none() && !if_exists {
                    return Err(missing_table(&table));
                }
                Ok(Outcome::default())
            }
            Statement::CreateSequence {
                name,
                start,
                increment,
            } => {
                if self.sequences.contains_key(&name) {
                    return Err(SqlError::with_state(
                        format!("sequence {name} already exists"),
                        DUPLICATE_OBJECT,
                    ));
                }
                self.sequences.insert(
                    name,
                    Sequence {
                        next: start,
                        increment,
                    },
                );
                Ok(Outcome::default())
            }
            Statement::DropSequence { name, if_exists } => {
                if self.sequences.remove(&name).is_none() && !if_exists {
                    return Err(SqlError::with_state(
                        format!("sequence {name} not found"),
                        UNDEFINED_OBJECT,
                    ));
                }
                Ok(Outcome::default())
            }
            Statement::Insert {
                table,
                columns,
                values,
                returning,
            } => self.insert(&table, columns, &values, returning, params, state),
            Statement::Select(select) => Ok(Outcome {
                rows: self.select(&select, params, state)?,
                ..Outcome::default()
            }),
            Statement::Update {
                table,
                assignments,
                filter,
            } => self.update(&table, &assignments, &filter, params, state),
        }
    }

    fn insert(
        &mut self,
        table_name: &str,
        columns: Option<Vec<String>>,
        values: &[Expr],
        returning: Option<Returning>,
        params: &[SqlValue],
        state: &mut ConnectionState,
    ) -> Result<Outcome, SqlError> {
        let table = self
            .tables
            .get_mut(table_name)
            .ok_or_else(|| missing_table(table_name))?;
        let targets = match &columns {
            Some(names) => names
                .iter()
                .map(|n| table.column_index(table_name, n))
                .collect::<Result<Vec<_>, _>>()?,
            None => (0..table.columns.len()).collect(),
        };
        if targets.len() != values.len() {
            return Err(SqlError::with_state(
                format!(
                    "{} values supplied for {} columns of {table_name}",
                    values.len(),
                    targets.len()
                ),
                INVALID_PARAMETER,
            ));
        }

        let mut row = vec![SqlValue::Null; table.columns.len()];
        for (index, expr) in targets.iter().zip(values) {
            if *expr != Expr::Default {
                row[*index] = value_of(expr, params)?;
            }
        }
        for (index, column) in table.columns.iter().enumerate() {
            if !column.identity {
                continue;
            }
            if row[index].is_null() {
                let value = table.next_identity;
                table.next_identity += 1;
                row[index] = integral(value);
                state.last_identity = Some(value);
            } else if let Some(explicit) = row[index].as_i128() {
                table.next_identity = table.next_identity.max(explicit.saturating_add(1));
            }
        }

        let row_id = table.next_row_id;
        table.next_row_id += 1;
        let names = table.columns.iter().map(|c| c.name.clone()).collect();
        table.rows.insert(row_id, row.clone());
        state.record(Undo::Insert {
            table: table_name.to_owned(),
            row_id,
        });

        let rows = match returning {
            None => Vec::new(),
            Some(Returning::Column(column)) => {
                let index = table.column_index(table_name, &column)?;
                vec![Row::new(vec![row[index].clone()])]
            }
            Some(Returning::Select(select)) => self.select(&select, &[], state)?,
        };
        Ok(Outcome {
            rows,
            affected: 1,
            inserted: Some((names, row)),
        })
    }

    fn select(
        &mut self,
        select: &Select,
        params: &[SqlValue],
        state: &ConnectionState,
    ) -> Result<Vec<Row>, SqlError> {
        match &select.projection {
            Projection::NextValue(name) => {
                let sequence = self.sequences.get_mut(name).ok_or_else(|| {
                    SqlError::with_state(format!("sequence {name} not found"), UNDEFINED_OBJECT)
                })?;
                let value = sequence.next;
                sequence.next += sequence.increment;
                Ok(vec![Row::new(vec![integral(value)])])
            }
            Projection::Identity => Ok(vec![Row::new(vec![
                state.last_identity.map_or(SqlValue::Null, integral),
            ])]),
            Projection::Guid => Ok(vec![Row::new(vec![SqlValue::Text(
                uuid::Uuid::new_v4().hyphenated().to_string(),
            )])]),
            Projection::Max(column) => {
                let (table_name, table) = self.from_table(select)?;
                let index = table.column_index(table_name, column)?;
                let max = table
                    .matching_rows(table_name, &select.filter, params)?
                    .into_iter()
                    .filter_map(|id| table.rows.get(&id).and_then(|row| row[index].as_big_int()))
                    .max();
                Ok(vec![Row::new(vec![max.map_or(SqlValue::Null, SqlValue::integral)])])
            }
            Projection::Columns(columns) => {
                let (table_name, table) = self.from_table(select)?;
                let indexes = if columns.len() == 1 && columns[0] == "*" {
                    (0..table.columns.len()).collect()
                } else {
                    columns
                        .iter()
                        .map(|c| table.column_index(table_name, c))
                        .collect::<Result<Vec<_>, _>>()?
                };
                Ok(table
                    .matching_rows(table_name, &select.filter, params)?
                    .into_iter()
                    .filter_map(|id| table.rows.get(&id))
                    .map(|row| Row::new(indexes.iter().map(|i| row[*i].clone()).collect()))
                    .collect())
            }
        }
    }

    fn from_table<'s>(&self, select: &'s Select) -> Result<(&'s str, &Table), SqlError> {
        let name = select
            .from
            .as_deref()
            .ok_or_else(|| SqlError::with_state("missing from clause", INVALID_PARAMETER))?;
        let table = self.tables.get(name).ok_or_else(|| missing_table(name))?;
        Ok((name, table))
    }

    fn update(
        &mut self,
        table_name: &str,
        assignments: &[(String, Expr)],
        filter: &[(String, Expr)],
        params: &[SqlValue],
        state: &mut ConnectionState,
    ) -> Result<Outcome, SqlError> {
        let table = self
            .tables
            .get_mut(table_name)
            .ok_or_else(|| missing_table(table_name))?;
        let changes = assignments
            .iter()
            .map(|(column, expr)| {
                Ok((table.column_index(table_name, column)?, value_of(expr, params)?))
            })
            .collect::<Result<Vec<_>, SqlError>>()?;
        let matched = table.matching_rows(table_name, filter, params)?;
        for row_id in &matched {
            if let Some(row) = table.rows.get_mut(row_id) {
                state.record(Undo::Update {
                    table: table_name.to_owned(),
                    row_id: *row_id,
                    previous: row.clone(),
                });
                for (index, value) in &changes {
                    row[*index] = value.clone();
                }
            }
        }
        Ok(Outcome {
            affected: matched.len() as u64,
            ..Outcome::default()
        })
    }

    /// Reverts row changes, newest first.
    pub(crate) fn rollback(&mut self, undo: Vec<Undo>) {
        for change in undo.into_iter().rev() {
            match change {
                Undo::Insert { table, row_id } => {
                    if let Some(table) = self.tables.get_mut(&table) {
                        table.rows.remove(&row_id);
                    }
                }
                Undo::Update {
                    table,
                    row_id,
                    previous,
                } => {
                    if let Some(table) = self.tables.get_mut(&table) {
                        table.rows.insert(row_id, previous);
                    }
                }
            }
        }
    }

    pub(crate) fn log(&self) -> &[String] {
        &self.log
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
    }

    pub(crate) fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_ascii_lowercase())
    }

    pub(crate) fn has_sequence(&self, name: &str) -> bool {
        self.sequences.contains_key(&name.to_ascii_lowercase())
    }

    pub(crate) fn rows(&self, name: &str) -> Option<Vec<Row>> {
        self.tables
            .get(&name.to_ascii_lowercase())
            .map(|t| t.rows.values().cloned().map(Row::new).collect())
    }
}

fn value_of(expr: &Expr, params: &[SqlValue]) -> Result<SqlValue, SqlError> {
    match expr {
        Expr::Param(index) => params.get(*index).cloned().ok_or_else(|| {
            SqlError::with_state(
                format!("no value bound for parameter {}", index + 1),
                INVALID_PARAMETER,
            )
        }),
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Default => Ok(SqlValue::Null),
    }
}

fn integral(value: i128) -> SqlValue {
    SqlValue::integral(value.into())
}

fn missing_table(name: &str) -> SqlError {
    SqlError::with_state(format!("table {name} not found"), UNDEFINED_OBJECT)
}
