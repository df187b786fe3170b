//! [`Database`]-related implementations.

#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    /// Stored value doesn't satisfy the domain invariants.
    Malformed(Malformed),
}

impl Error {
    /// Checks if this [`Error`] is caused by the stored data rejecting the
    /// operation (like a missing referenced record or a duplicate).
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_integrity_violation(),
            Self::Malformed(_) => false,
        }
    }

    /// Returns the name of the constraint rejecting the operation, if any.
    #[must_use]
    pub fn constraint(&self) -> Option<&str> {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.constraint(),
            Self::Malformed(_) => None,
        }
    }
}

/// Stored value that doesn't satisfy the domain invariants.
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("malformed `{table}.{column}` value")]
pub struct Malformed {
    /// Name of the table containing the value.
    pub table: &'static str,

    /// Name of the column containing the value.
    pub column: &'static str,
}

impl Malformed {
    /// Creates a new [`Malformed`] value error for the provided `table` and
    /// `column`.
    #[must_use]
    pub const fn new(table: &'static str, column: &'static str) -> Self {
        Self { table, column }
    }
}
