//! [`Query`] definition.

pub mod house;
pub mod houses;
pub mod room;
pub mod rooms;
pub mod user;
pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, St, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db, St>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::command::spec::{house, service, Houses};

    use super::{house as by_id, Query as _};

    #[tokio::test]
    async fn selects_from_database() {
        let existing = house(3, 1);
        let svc = service(Houses::with([existing.clone()]));

        let found = svc
            .execute(by_id::ById::by(existing.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, existing.id);

        let missing = svc.execute(by_id::ById::by(house(1, 0).id)).await;
        assert!(missing.unwrap().is_none());
    }
}
