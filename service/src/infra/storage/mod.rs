//! [`Storage`]-related implementations.

#[cfg(feature = "fs")]
pub mod fs;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "fs")]
pub use self::fs::Fs;

/// Object storage operation.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "fs")]
    /// [`Fs`] error.
    Fs(fs::Error),
}
