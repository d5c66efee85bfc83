use crate::jdbc::SqlError;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `ferrokey` can produce.
///
/// The variants follow the three failure classes of identifier generation:
/// configuration problems found while building generators, runtime
/// generation failures, and translated database errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A generator or mapping was configured inconsistently.
    ///
    /// Raised while resolving strategies and reading generator parameters,
    /// before any identifier is produced.
    #[error("{message}")]
    Mapping { message: String },

    /// Constructing or configuring the generator for an entity failed.
    #[error("could not instantiate id generator [entity-name={entity}]")]
    Instantiation {
        entity: String,
        #[source]
        source: Box<Error>,
    },

    /// An identifier could not be produced for the current operation.
    #[error("{message}")]
    Generation { message: String },

    /// A statement failed in the database.
    #[error("{message} [{sql}]")]
    Jdbc {
        message: String,
        sql: String,
        #[source]
        source: SqlError,
    },
}

impl Error {
    pub(crate) fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            message: message.into(),
        }
    }

    pub(crate) fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Returns `true` for configuration errors.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping { .. } | Self::Instantiation { .. })
    }

    /// Returns `true` for runtime generation errors.
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }
}
