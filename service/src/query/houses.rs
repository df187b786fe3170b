//! [`Query`] collection related to the multiple [`House`]s.

use common::operations::By;

use crate::domain::House;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of all [`House`]s.
pub type List = DatabaseQuery<By<Vec<House>, ()>>;
