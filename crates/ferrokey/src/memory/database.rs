use std::{collections::HashSet, sync::Arc};

use parking_lot::Mutex;

use crate::{
    error::{Error, Result},
    jdbc::{Connection, Entity, Row, Session, SqlError, SqlValue, Work},
    memory::engine::{ConnectionState, Engine},
    value::IdentifierValue,
};

/// A thread-safe in-memory database.
///
/// Clones share the same data. Every executed statement is appended to a
/// log that tests use to count round-trips.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    engine: Arc<Mutex<Engine>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session with its own connection state, in autocommit mode.
    pub fn session(&self) -> MemorySession {
        MemorySession {
            database: self.clone(),
            state: Mutex::new(ConnectionState::default()),
            managed: Mutex::new(HashSet::new()),
        }
    }

    /// Runs each statement in autocommit mode, stopping at the first
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the failing statement's error.
    pub fn execute_script<S: AsRef<str>>(&self, script: &[S]) -> Result<(), SqlError> {
        let mut state = ConnectionState::default();
        let mut engine = self.engine.lock();
        for sql in script {
            engine.run(sql.as_ref(), &[], &mut state)?;
        }
        Ok(())
    }

    /// Every statement executed so far, oldest first.
    pub fn statement_log(&self) -> Vec<String> {
        self.engine.lock().log().to_vec()
    }

    pub fn count_statements(&self, predicate: impl Fn(&str) -> bool) -> usize {
        self.engine
            .lock()
            .log()
            .iter()
            .filter(|sql| predicate(sql))
            .count()
    }

    pub fn clear_statement_log(&self) {
        self.engine.lock().clear_log();
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.engine.lock().has_table(name)
    }

    pub fn has_sequence(&self, name: &str) -> bool {
        self.engine.lock().has_sequence(name)
    }

    /// The committed and uncommitted rows of `table`.
    pub fn table_rows(&self, table: &str) -> Option<Vec<Row>> {
        self.engine.lock().rows(table)
    }
}

/// One session on a [`MemoryDatabase`].
///
/// Outside [`Self::begin`]/[`Self::commit`] every statement commits on its
/// own. [`Session::isolated`] work always runs in a separate transaction
/// with its own connection state.
#[derive(Debug)]
pub struct MemorySession {
    database: MemoryDatabase,
    state: Mutex<ConnectionState>,
    managed: Mutex<HashSet<(String, IdentifierValue)>>,
}

impl MemorySession {
    pub fn database(&self) -> &MemoryDatabase {
        &self.database
    }

    /// # Errors
    ///
    /// Fails when a transaction is already active.
    pub fn begin(&self) -> Result<(), SqlError> {
        let mut state = self.state.lock();
        if state.undo.is_some() {
            return Err(SqlError::with_state("transaction already active", "25001"));
        }
        state.undo = Some(Vec::new());
        Ok(())
    }

    pub fn commit(&self) {
        self.state.lock().undo = None;
    }

    /// Reverts every row change made since [`Self::begin`].
    pub fn rollback(&self) {
        if let Some(undo) = self.state.lock().undo.take() {
            self.database.engine.lock().rollback(undo);
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.state.lock().undo.is_some()
    }

    /// Marks `entity` as associated with this session.
    pub fn manage(&self, entity: &dyn Entity) {
        if let Some(id) = entity.identifier() {
            self.managed
                .lock()
                .insert((entity.entity_name().to_owned(), id));
        }
    }
}

impl Session for MemorySession {
    fn with_connection(&self, work: &mut Work<'_>) -> Result<()> {
        let mut state = self.state.lock();
        let mut connection = MemoryConnection {
            engine: &self.database.engine,
            state: &mut *state,
        };
        work(&mut connection)
    }

    fn isolated(&self, work: &mut Work<'_>) -> Result<()> {
        let mut state = ConnectionState::in_transaction();
        let outcome = work(&mut MemoryConnection {
            engine: &self.database.engine,
            state: &mut state,
        });
        if outcome.is_err() {
            if let Some(undo) = state.undo.take() {
                self.database.engine.lock().rollback(undo);
            }
        }
        outcome
    }

    fn contains(&self, entity: &dyn Entity) -> bool {
        entity.identifier().is_some_and(|id| {
            self.managed
                .lock()
                .contains(&(entity.entity_name().to_owned(), id))
        })
    }

    fn associated_identifier(&self, associated: &dyn Entity) -> Result<IdentifierValue> {
        associated.identifier().ok_or_else(|| {
            Error::generation(format!(
                "object references an unsaved transient instance - save the transient instance before flushing: {}",
                associated.entity_name()
            ))
        })
    }
}

struct MemoryConnection<'a> {
    engine: &'a Mutex<Engine>,
    state: &'a mut ConnectionState,
}

impl Connection for MemoryConnection<'_> {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, SqlError> {
        Ok(self.engine.lock().run(sql, params, self.state)?.rows)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, SqlError> {
        Ok(self.engine.lock().run(sql, params, self.state)?.affected)
    }

    fn execute_returning_keys(
        &mut self,
        sql: &str,
        params: &[SqlValue],
        key_columns: &[&str],
    ) -> Result<Vec<Row>, SqlError> {
        let outcome = self.engine.lock().run(sql, params, self.state)?;
        let Some((names, values)) = outcome.inserted else {
            return Ok(Vec::new());
        };
        let keys = key_columns
            .iter()
            .map(|key| {
                names
                    .iter()
                    .position(|name| name.eq_ignore_ascii_case(key))
                    .map(|index| values[index].clone())
                    .ok_or_else(|| SqlError::with_state(format!("column {key} not found"), "42S22"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(vec![Row::new(keys)])
    }
}
