//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::By;

use crate::domain::User;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of all [`User`]s, ordered by their names.
pub type List = DatabaseQuery<By<Vec<User>, ()>>;
