//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{house, image, room, user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

use super::malformed;

/// Name of the `users` table.
const TABLE: &str = "users";

/// Columns of the `users` table [`from_row()`] expects.
const COLUMNS: &str = "\
    id, first_name, last_name, \
    email, phone, nationality, preferred_language, role, \
    room_number, house_number, picture_url, \
    arrival_date, departure_estimate";

/// Validates the provided `users` [`Row`] into a [`User`].
fn from_row(row: &Row) -> Result<User, Traced<database::Error>> {
    /// Parses an optional `column` with the provided `parse` function.
    fn optional<T>(
        row: &Row,
        column: &'static str,
        parse: impl FnOnce(String) -> Option<T>,
    ) -> Result<Option<T>, Traced<database::Error>> {
        row.get::<_, Option<String>>(column)
            .map(|v| parse(v).ok_or_else(|| malformed(TABLE, column)))
            .transpose()
    }

    Ok(User {
        id: row.get("id"),
        first_name: user::Name::new(row.get::<_, String>("first_name"))
            .ok_or_else(|| malformed(TABLE, "first_name"))?,
        last_name: user::Name::new(row.get::<_, String>("last_name"))
            .ok_or_else(|| malformed(TABLE, "last_name"))?,
        email: optional(row, "email", user::Email::new)?,
        phone: optional(row, "phone", user::Phone::new)?,
        nationality: optional(row, "nationality", user::Nationality::new)?,
        preferred_language: user::Language::new(
            row.get::<_, String>("preferred_language"),
        )
        .ok_or_else(|| malformed(TABLE, "preferred_language"))?,
        role: row.get("role"),
        room_number: row
            .get::<_, Option<i32>>("room_number")
            .map(|n| {
                u16::try_from(n)
                    .ok()
                    .and_then(room::Number::new)
                    .ok_or_else(|| malformed(TABLE, "room_number"))
            })
            .transpose()?,
        house_number: optional(row, "house_number", house::Number::new)?,
        picture_url: optional(row, "picture_url", image::Url::new)?,
        arrival_date: row.get("arrival_date"),
        departure_estimate: row.get("departure_estimate"),
    })
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE id = $1::UUID",
        );
        self.query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
            .transpose()
    }
}

impl<C> Database<Select<By<Vec<User>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             ORDER BY last_name, first_name, id",
        );
        self.query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect()
    }
}
