//! [`Query`] collection related to the multiple [`Room`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Room, Query};

use super::DatabaseQuery;

/// Queries a list of all [`Room`]s along with numbers of their houses.
pub type List = DatabaseQuery<By<Vec<read::room::list::Item>, ()>>;
