//! [`Command`] for updating a [`House`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{house, Description, House},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating scalar fields of an existing [`House`].
///
/// Fields left [`None`] are kept untouched, as well as images of the
/// [`House`].
#[derive(Clone, Debug)]
pub struct UpdateHouse {
    /// ID of the [`House`] to update.
    pub id: house::Id,

    /// New [`house::Street`] of the [`House`].
    pub street: Option<house::Street>,

    /// New [`house::Number`] of the [`House`].
    pub number: Option<house::Number>,

    /// New [`house::PostalCode`] of the [`House`].
    pub postal_code: Option<house::PostalCode>,

    /// New [`Description`] of the [`House`].
    pub description: Option<Description>,

    /// New Google Maps [`house::Link`] of the [`House`], or its removal.
    pub google_maps: Option<Option<house::Link>>,

    /// New Street View [`house::Link`] of the [`House`], or its removal.
    pub street_view: Option<Option<house::Link>>,

    /// New total number of rooms in the [`House`].
    pub total_rooms: Option<house::RoomCount>,

    /// New number of taken rooms in the [`House`].
    pub taken_rooms: Option<house::RoomCount>,
}

impl UpdateHouse {
    /// Creates a new [`UpdateHouse`] of the [`House`] with the provided ID,
    /// changing nothing.
    #[must_use]
    pub fn new(id: house::Id) -> Self {
        Self {
            id,
            street: None,
            number: None,
            postal_code: None,
            description: None,
            google_maps: None,
            street_view: None,
            total_rooms: None,
            taken_rooms: None,
        }
    }
}

impl<Db, St> Command<UpdateHouse> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<House>, house::Id>>,
            Ok = Option<House>,
            Err = Traced<database::Error>,
        > + Database<Update<House>, Ok = bool, Err = Traced<database::Error>>,
{
    type Ok = House;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateHouse) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateHouse {
            id,
            street,
            number,
            postal_code,
            description,
            google_maps,
            street_view,
            total_rooms,
            taken_rooms,
        } = cmd;

        let mut house = self
            .database()
            .execute(Select(By::<Option<House>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::HouseNotExists(id))
            .map_err(tracerr::wrap!())?;

        let total = total_rooms.unwrap_or(house.occupancy.total());
        let taken = taken_rooms.unwrap_or(house.occupancy.taken());
        house.occupancy = house::Occupancy::new(total, taken)
            .ok_or(E::OccupancyExceeded { total, taken })
            .map_err(tracerr::wrap!())?;

        if let Some(street) = street {
            house.street = street;
        }
        if let Some(number) = number {
            house.number = number;
        }
        if let Some(code) = postal_code {
            house.postal_code = code;
        }
        if let Some(description) = description {
            house.description = description;
        }
        if let Some(link) = google_maps {
            house.google_maps = link;
        }
        if let Some(link) = street_view {
            house.street_view = link;
        }

        let updated = self
            .database()
            .execute(Update(house.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            // Deleted concurrently.
            return Err(tracerr::new!(E::HouseNotExists(id)));
        }

        Ok(house)
    }
}

/// Error of [`UpdateHouse`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`House`] doesn't exist.
    #[display("`House(id: {_0})` does not exist")]
    #[from(ignore)]
    HouseNotExists(#[error(not(source))] house::Id),

    /// Taken rooms exceed the total ones.
    #[display("{taken} taken rooms exceed {total} total ones")]
    #[from(ignore)]
    OccupancyExceeded {
        /// Total number of rooms.
        total: house::RoomCount,

        /// Number of taken rooms.
        taken: house::RoomCount,
    },
}

#[cfg(test)]
mod spec {
    use crate::{
        command::spec::{house, service, Houses},
        domain::house as h,
    };

    use super::{Command as _, ExecutionError, UpdateHouse};

    #[tokio::test]
    async fn updates_only_provided_fields() {
        let existing = house(4, 1);
        let svc = service(Houses::with([existing.clone()]));

        let updated = svc
            .execute(UpdateHouse {
                street: Some(h::Street::new("Rua Nova").unwrap()),
                google_maps: Some(None),
                taken_rooms: Some(4),
                ..UpdateHouse::new(existing.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.street.to_string(), "Rua Nova");
        assert_eq!(updated.number, existing.number);
        assert_eq!(updated.google_maps, None);
        assert_eq!(updated.occupancy.available(), 0);
        assert_eq!(updated.images, existing.images);
        assert_eq!(
            svc.database().get(existing.id).unwrap().street.to_string(),
            "Rua Nova",
        );
    }

    #[tokio::test]
    async fn rejects_exceeding_occupancy() {
        let existing = house(4, 3);
        let svc = service(Houses::with([existing.clone()]));

        let err = svc
            .execute(UpdateHouse {
                total_rooms: Some(2),
                ..UpdateHouse::new(existing.id)
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::OccupancyExceeded { total: 2, taken: 3 },
        ));
        assert_eq!(
            svc.database().get(existing.id).unwrap().occupancy,
            existing.occupancy,
        );
    }

    #[tokio::test]
    async fn rejects_unknown_house() {
        let svc = service(Houses::default());

        let err = svc
            .execute(UpdateHouse::new(house(1, 0).id))
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::HouseNotExists(_)));
    }
}
