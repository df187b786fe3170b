//! [`Room`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{house, image, room, Description, Room},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::{malformed, parse_images};

/// Name of the `rooms` table.
const TABLE: &str = "rooms";

/// Columns of the `rooms` table (aliased as `r`) [`from_row()`] expects.
const COLUMNS: &str = "\
    r.id, r.house_id, r.number, r.kind, r.price, r.is_available, r.beds, \
    r.renters, r.images, r.description";

/// Validates the provided `rooms` [`Row`] into a [`Room`].
fn from_row(row: &Row) -> Result<Room, Traced<database::Error>> {
    Ok(Room {
        id: row.get("id"),
        house_id: row.get("house_id"),
        number: u16::try_from(row.get::<_, i32>("number"))
            .ok()
            .and_then(room::Number::new)
            .ok_or_else(|| malformed(TABLE, "number"))?,
        kind: row.get("kind"),
        price: room::Price::new(row.get::<_, Decimal>("price"))
            .ok_or_else(|| malformed(TABLE, "price"))?,
        is_available: row.get("is_available"),
        beds: u8::try_from(row.get::<_, i16>("beds"))
            .map_err(|_| malformed(TABLE, "beds"))?,
        renters: row.get("renters"),
        images: parse_images(TABLE, row.get("images"))?,
        description: Description::new(row.get::<_, String>("description"))
            .ok_or_else(|| malformed(TABLE, "description"))?,
    })
}

impl<C> Database<Select<By<Vec<read::room::list::Item>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::room::list::Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<read::room::list::Item>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS}, h.number AS house_number \
             FROM rooms AS r \
             INNER JOIN houses AS h ON h.id = r.house_id \
             ORDER BY h.street, h.number, r.number",
        );
        self.query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                Ok(read::room::list::Item {
                    room: from_row(row)?,
                    house_number: house::Number::new(
                        row.get::<_, String>("house_number"),
                    )
                    .ok_or_else(|| malformed("houses", "number"))?,
                })
            })
            .collect()
    }
}

impl<C> Database<Select<By<Option<Room>, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rooms AS r \
             WHERE r.id = $1::UUID",
        );
        self.query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
            .transpose()
    }
}

impl<C> Database<Insert<room::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = room::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<room::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let room::Draft {
            house_id,
            number,
            kind,
            price,
            is_available,
            beds,
            renters,
            description,
        } = draft;

        const SQL: &str = "\
            INSERT INTO rooms (\
                house_id, number, kind, price, is_available, beds, \
                renters, description\
            ) VALUES (\
                $1::UUID, $2::INT4, $3::INT2, $4::NUMERIC, $5::BOOLEAN, \
                $6::INT2, \
                $7::UUID[], $8::TEXT\
            ) \
            RETURNING id";
        let row = self
            .query_opt(
                SQL,
                &[
                    &house_id,
                    &i32::from(u16::from(number)),
                    &kind,
                    &price.amount(),
                    &is_available,
                    &i16::from(beds),
                    &renters,
                    &description,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .ok_or_else(|| malformed(TABLE, "id"))?;

        Ok(row.get("id"))
    }
}

impl<C> Database<Update<Room>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(room): Update<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let Room {
            id,
            house_id,
            number,
            kind,
            price,
            is_available,
            beds,
            renters,
            images: _,
            description,
        } = room;

        const SQL: &str = "\
            UPDATE rooms \
            SET house_id = $2::UUID, \
                number = $3::INT4, \
                kind = $4::INT2, \
                price = $5::NUMERIC, \
                is_available = $6::BOOLEAN, \
                beds = $7::INT2, \
                renters = $8::UUID[], \
                description = $9::TEXT \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &house_id,
                &i32::from(u16::from(number)),
                &kind,
                &price.amount(),
                &is_available,
                &i16::from(beds),
                &renters,
                &description,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|updated| updated > 0)
    }
}

impl<C> Database<Update<image::Attachment<room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(attachment): Update<image::Attachment<room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let image::Attachment { owner, urls } = attachment;

        const SQL: &str = "\
            UPDATE rooms \
            SET images = $2::TEXT[] \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&owner, &urls])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
