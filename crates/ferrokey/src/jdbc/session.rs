use crate::{
    error::{Error, Result},
    jdbc::{Connection, SqlValue},
    value::IdentifierValue,
};

/// Read access to a persistent object, as seen by identifier generators.
pub trait Entity {
    /// The mapped entity name.
    fn entity_name(&self) -> &str;

    /// The identifier currently held by the instance, if any.
    fn identifier(&self) -> Option<IdentifierValue>;

    /// The value of a mapped (non-association) property.
    fn property(&self, name: &str) -> Option<SqlValue>;

    /// The object referenced by a to-one association.
    fn association(&self, name: &str) -> Option<&dyn Entity>;
}

/// A unit of work executed against a connection.
pub type Work<'a> = dyn FnMut(&mut dyn Connection) -> Result<()> + 'a;

/// The persistence session that drives identifier generation.
///
/// Sessions are not shared between threads; generators are.
pub trait Session {
    /// Runs `work` on the connection bound to the current unit of work.
    ///
    /// Writes made here commit or roll back with the caller's transaction.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `work` or raised acquiring the
    /// connection.
    fn with_connection(&self, work: &mut Work<'_>) -> Result<()>;

    /// Runs `work` in a separate transaction that commits as soon as `work`
    /// succeeds, independently of the caller's transaction. On error the
    /// separate transaction is rolled back.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `work` or raised by commit/rollback.
    fn isolated(&self, work: &mut Work<'_>) -> Result<()>;

    /// Whether `entity` is already associated with this session.
    fn contains(&self, entity: &dyn Entity) -> bool;

    /// The identifier of an associated entity, persisting it first when it
    /// is transient.
    ///
    /// # Errors
    ///
    /// Fails when the associated entity cannot be persisted.
    fn associated_identifier(&self, associated: &dyn Entity) -> Result<IdentifierValue>;
}

/// Value-returning conveniences over [`Session`].
pub trait SessionExt: Session {
    /// Like [`Session::with_connection`], returning the work's value.
    ///
    /// # Errors
    ///
    /// See [`Session::with_connection`].
    fn work<R>(&self, f: impl FnOnce(&mut dyn Connection) -> Result<R>) -> Result<R> {
        let mut f = Some(f);
        let mut out = None;
        self.with_connection(&mut |conn: &mut dyn Connection| {
            if let Some(f) = f.take() {
                out = Some(f(conn)?);
            }
            Ok(())
        })?;
        out.ok_or_else(|| Error::generation("session did not run the submitted work"))
    }

    /// Like [`Session::isolated`], returning the work's value.
    ///
    /// # Errors
    ///
    /// See [`Session::isolated`].
    fn isolated_work<R>(&self, f: impl FnOnce(&mut dyn Connection) -> Result<R>) -> Result<R> {
        let mut f = Some(f);
        let mut out = None;
        self.isolated(&mut |conn: &mut dyn Connection| {
            if let Some(f) = f.take() {
                out = Some(f(conn)?);
            }
            Ok(())
        })?;
        out.ok_or_else(|| Error::generation("session did not run the submitted work"))
    }
}

impl<S: Session + ?Sized> SessionExt for S {}
