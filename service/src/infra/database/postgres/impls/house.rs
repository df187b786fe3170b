//! [`House`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{house, image, Description, House},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

use super::{malformed, parse_images};

/// Columns of the `houses` table in the order [`from_row()`] expects them.
const COLUMNS: &str = "\
    id, street, number, postal_code, description, \
    google_maps, street_view, \
    total_rooms, taken_rooms, \
    images";

/// Validates the provided `houses` [`Row`] into a [`House`].
fn from_row(row: &Row) -> Result<House, Traced<database::Error>> {
    /// Name of the table the [`Row`] is read from.
    const TABLE: &str = "houses";

    let room_count = |column: &'static str| {
        u16::try_from(row.get::<_, i32>(column))
            .map_err(|_| malformed(TABLE, column))
    };
    let link = |column: &'static str| {
        row.get::<_, Option<String>>(column)
            .map(|l| {
                house::Link::new(l).ok_or_else(|| malformed(TABLE, column))
            })
            .transpose()
    };

    Ok(House {
        id: row.get("id"),
        street: house::Street::new(row.get::<_, String>("street"))
            .ok_or_else(|| malformed(TABLE, "street"))?,
        number: house::Number::new(row.get::<_, String>("number"))
            .ok_or_else(|| malformed(TABLE, "number"))?,
        postal_code: house::PostalCode::new(
            row.get::<_, String>("postal_code"),
        )
        .ok_or_else(|| malformed(TABLE, "postal_code"))?,
        description: Description::new(row.get::<_, String>("description"))
            .ok_or_else(|| malformed(TABLE, "description"))?,
        google_maps: link("google_maps")?,
        street_view: link("street_view")?,
        occupancy: house::Occupancy::new(
            room_count("total_rooms")?,
            room_count("taken_rooms")?,
        )
        .ok_or_else(|| malformed(TABLE, "taken_rooms"))?,
        images: parse_images(TABLE, row.get("images"))?,
    })
}

impl<C> Database<Select<By<Vec<House>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<House>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<House>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM houses \
             ORDER BY street, number, id",
        );
        self.query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect()
    }
}

impl<C> Database<Select<By<Option<House>, house::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<House>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<House>, house::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: house::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM houses \
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

impl<C> Database<Insert<house::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = house::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<house::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let house::Draft {
            street,
            number,
            postal_code,
            description,
            google_maps,
            street_view,
            occupancy,
        } = draft;

        const SQL: &str = "\
            INSERT INTO houses (\
                street, number, postal_code, description, \
                google_maps, street_view, \
                total_rooms, taken_rooms\
            ) VALUES (\
                $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, $4::TEXT, \
                $5::VARCHAR, $6::VARCHAR, \
                $7::INT4, $8::INT4\
            ) \
            RETURNING id";
        let row = self
            .query_opt(
                SQL,
                &[
                    &street,
                    &number,
                    &postal_code,
                    &description,
                    &google_maps,
                    &street_view,
                    &i32::from(occupancy.total()),
                    &i32::from(occupancy.taken()),
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .ok_or_else(|| malformed("houses", "id"))?;

        Ok(row.get("id"))
    }
}

impl<C> Database<Update<House>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(house): Update<House>,
    ) -> Result<Self::Ok, Self::Err> {
        let House {
            id,
            street,
            number,
            postal_code,
            description,
            google_maps,
            street_view,
            occupancy,
            images: _,
        } = house;

        const SQL: &str = "\
            UPDATE houses \
            SET street = $2::VARCHAR, \
                number = $3::VARCHAR, \
                postal_code = $4::VARCHAR, \
                description = $5::TEXT, \
                google_maps = $6::VARCHAR, \
                street_view = $7::VARCHAR, \
                total_rooms = $8::INT4, \
                taken_rooms = $9::INT4 \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &street,
                &number,
                &postal_code,
                &description,
                &google_maps,
                &street_view,
                &i32::from(occupancy.total()),
                &i32::from(occupancy.taken()),
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|updated| updated > 0)
    }
}

impl<C> Database<Update<image::Attachment<house::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(attachment): Update<image::Attachment<house::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let image::Attachment { owner, urls } = attachment;

        const SQL: &str = "\
            UPDATE houses \
            SET images = $2::TEXT[] \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&owner, &urls])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<House, house::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<House, house::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: house::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM houses \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|deleted| deleted > 0)
    }
}
