//! [`Database`] implementations.

#![allow(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]

mod house;
mod room;
mod user;

use async_trait::async_trait;
use refinery_core::{
    traits::r#async::{AsyncQuery, AsyncTransaction},
    AsyncMigrate, Migration,
};
use tracerr::Traced;

use crate::{
    domain::image,
    infra::{database, postgres},
};
#[cfg(doc)]
use crate::infra::Database;

use super::Postgres;

/// Creates a [`database::Malformed`] error of the `table.column` value.
fn malformed(
    table: &'static str,
    column: &'static str,
) -> Traced<database::Error> {
    tracerr::new!(database::Error::Malformed(database::Malformed::new(
        table, column,
    )))
}

/// Parses the stored `images` of a `table` row into [`image::Url`]s.
fn parse_images(
    table: &'static str,
    images: Vec<String>,
) -> Result<Vec<image::Url>, Traced<database::Error>> {
    images
        .into_iter()
        .map(|url| {
            image::Url::new(url).ok_or_else(|| malformed(table, "images"))
        })
        .collect()
}

#[async_trait]
impl AsyncTransaction for Postgres {
    type Error = Traced<database::Error>;

    async fn execute(
        &mut self,
        queries: &[&str],
    ) -> Result<usize, Self::Error> {
        let mut conn = self
            .0
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncTransaction::execute(&mut **conn, queries)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

#[async_trait]
impl AsyncQuery<Vec<Migration>> for Postgres {
    async fn query(
        &mut self,
        query: &str,
    ) -> Result<Vec<Migration>, <Self as AsyncTransaction>::Error> {
        let mut conn = self
            .0
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        AsyncQuery::query(&mut **conn, query)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl AsyncMigrate for Postgres {}
