//! [`Command`] for updating a [`Room`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{House, User};
use crate::{
    domain::{house, room, user, Description, Room},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating scalar fields of an existing [`Room`].
///
/// Fields left [`None`] are kept untouched. Images of the [`Room`] are never
/// touched.
#[derive(Clone, Debug)]
pub struct UpdateRoom {
    /// ID of the [`Room`] to update.
    pub id: room::Id,

    /// ID of the [`House`] to move the [`Room`] into.
    pub house_id: Option<house::Id>,

    /// New [`room::Number`] of the [`Room`].
    pub number: Option<room::Number>,

    /// New [`room::Kind`] of the [`Room`].
    pub kind: Option<room::Kind>,

    /// New monthly [`room::Price`] of the [`Room`].
    pub price: Option<room::Price>,

    /// New availability of the [`Room`].
    pub is_available: Option<bool>,

    /// New number of beds in the [`Room`].
    pub beds: Option<room::Beds>,

    /// New full list of the [`User`]s renting the [`Room`].
    pub renters: Option<Vec<user::Id>>,

    /// New [`Description`] of the [`Room`].
    pub description: Option<Description>,
}

impl UpdateRoom {
    /// Creates a new [`UpdateRoom`] of the [`Room`] with the provided ID,
    /// changing nothing.
    #[must_use]
    pub fn new(id: room::Id) -> Self {
        Self {
            id,
            house_id: None,
            number: None,
            kind: None,
            price: None,
            is_available: None,
            beds: None,
            renters: None,
            description: None,
        }
    }
}

impl<Db, St> Command<UpdateRoom> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Update<Room>, Ok = bool, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateRoom {
            id,
            house_id,
            number,
            kind,
            price,
            is_available,
            beds,
            renters,
            description,
        } = cmd;

        let mut room = self
            .database()
            .execute(Select(By::<Option<Room>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(id))
            .map_err(tracerr::wrap!())?;

        room.house_id = house_id.unwrap_or(room.house_id);
        room.number = number.unwrap_or(room.number);
        room.kind = kind.unwrap_or(room.kind);
        room.price = price.unwrap_or(room.price);
        room.is_available = is_available.unwrap_or(room.is_available);
        room.beds = beds.unwrap_or(room.beds);
        if let Some(renters) = renters {
            room.renters = renters;
        }
        if let Some(description) = description {
            room.description = description;
        }

        let updated = self
            .database()
            .execute(Update(room.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            // Deleted concurrently.
            return Err(tracerr::new!(E::RoomNotExists(id)));
        }

        Ok(room)
    }
}

/// Error of [`UpdateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Room`] doesn't exist.
    #[display("`Room(id: {_0})` does not exist")]
    #[from(ignore)]
    RoomNotExists(#[error(not(source))] room::Id),
}

#[cfg(test)]
mod spec {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use common::operations::{By, Select, Update};
    use rust_decimal::Decimal;
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        command::spec::service,
        domain::{room, Description, Room},
        infra::{database, Database},
    };

    use super::{Command as _, ExecutionError, UpdateRoom};

    /// In-memory [`Database`] of [`Room`]s.
    #[derive(Clone, Debug, Default)]
    struct Rooms(Arc<Mutex<HashMap<room::Id, Room>>>);

    impl Rooms {
        fn with(room: Room) -> Self {
            Self(Arc::new(Mutex::new(HashMap::from([(room.id, room)]))))
        }

        fn get(&self, id: room::Id) -> Option<Room> {
            self.0.lock().unwrap().get(&id).cloned()
        }
    }

    impl Database<Select<By<Option<Room>, room::Id>>> for Rooms {
        type Ok = Option<Room>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Room>, room::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.get(by.into_inner()))
        }
    }

    impl Database<Update<Room>> for Rooms {
        type Ok = bool;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(room): Update<Room>,
        ) -> Result<Self::Ok, Self::Err> {
            let mut rooms = self.0.lock().unwrap();
            let Some(stored) = rooms.get_mut(&room.id) else {
                return Ok(false);
            };
            *stored = room;
            Ok(true)
        }
    }

    fn room() -> Room {
        Room {
            id: Uuid::new_v4().into(),
            house_id: Uuid::new_v4().into(),
            number: room::Number::new(2).unwrap(),
            kind: room::Kind::Double,
            price: room::Price::new(Decimal::new(350, 0)).unwrap(),
            is_available: true,
            beds: 2,
            renters: vec![],
            images: vec!["https://cdn.test/room_images/r/0".parse().unwrap()],
            description: Description::new("Sunny").unwrap(),
        }
    }

    #[tokio::test]
    async fn updates_only_provided_fields() {
        let existing = room();
        let svc = service(Rooms::with(existing.clone()));
        let renter = Uuid::new_v4().into();

        let updated = svc
            .execute(UpdateRoom {
                kind: Some(room::Kind::Triple),
                is_available: Some(false),
                renters: Some(vec![renter]),
                ..UpdateRoom::new(existing.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.kind, room::Kind::Triple);
        assert!(!updated.is_available);
        assert_eq!(updated.renters, [renter]);
        assert_eq!(updated.beds, existing.beds);
        assert_eq!(updated.price, existing.price);
        assert_eq!(updated.images, existing.images);

        let stored = svc.database().get(existing.id).unwrap();
        assert_eq!(stored.kind, room::Kind::Triple);
        assert_eq!(stored.renters, [renter]);
    }

    #[tokio::test]
    async fn rejects_unknown_room() {
        let svc = service(Rooms::default());

        let err = svc
            .execute(UpdateRoom::new(room().id))
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::RoomNotExists(_)));
    }
}
