//! Infrastructure layer.

pub mod database;
pub mod storage;

pub use self::{database::Database, storage::Storage};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
#[cfg(feature = "fs")]
pub use self::storage::{fs, Fs};
