//! [`Command`] for deleting a [`House`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Room;
use crate::{
    domain::{house, House},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`House`] along with its [`Room`]s.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteHouse {
    /// ID of the [`House`] to delete.
    pub id: house::Id,
}

impl<Db, St> Command<DeleteHouse> for Service<Db, St>
where
    Db: Database<
        Delete<By<House, house::Id>>,
        Ok = bool,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteHouse) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteHouse { id } = cmd;

        let deleted = self
            .database()
            .execute(Delete(By::<House, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !deleted {
            return Err(tracerr::new!(E::HouseNotExists(id)));
        }

        Ok(())
    }
}

/// Error of [`DeleteHouse`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`House`] doesn't exist.
    #[display("`House(id: {_0})` does not exist")]
    #[from(ignore)]
    HouseNotExists(#[error(not(source))] house::Id),
}

#[cfg(test)]
mod spec {
    use crate::command::spec::{house, service, Houses};

    use super::{Command as _, DeleteHouse, ExecutionError};

    #[tokio::test]
    async fn deletes_existing_house_once() {
        let existing = house(2, 0);
        let svc = service(Houses::with([existing.clone()]));

        svc.execute(DeleteHouse { id: existing.id }).await.unwrap();
        assert!(svc.database().get(existing.id).is_none());

        let err = svc
            .execute(DeleteHouse { id: existing.id })
            .await
            .unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::HouseNotExists(_)));
    }
}
