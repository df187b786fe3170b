//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_house;
pub mod create_room;
pub mod delete_house;
pub mod update_house;
pub mod update_room;

use tracerr::Traced;

use crate::{pipeline, submission, Service};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession, create_house::CreateHouse,
    create_room::CreateRoom, delete_house::DeleteHouse,
    update_house::UpdateHouse, update_room::UpdateRoom,
};

impl<Db, St> Service<Db, St> {
    /// Begins the provided form submission, if any.
    ///
    /// # Errors
    ///
    /// Returns the current [`submission::State`] if the submission cannot
    /// begin.
    fn begin_submission(
        &self,
        id: Option<submission::Id>,
    ) -> Result<Option<submission::Guard>, (submission::Id, submission::State)>
    {
        id.map(|id| {
            self.submissions()
                .begin(id.clone())
                .map_err(|state| (id, state))
        })
        .transpose()
    }
}

/// Finishes the provided form submission according to the pipeline
/// `result`.
///
/// Only a failed record creation fails the submission, as the record exists
/// otherwise.
fn finish_submission<T, Id>(
    guard: Option<submission::Guard>,
    result: &Result<T, Traced<pipeline::Error<Id>>>,
) {
    let Some(guard) = guard else {
        return;
    };
    let failed = result.as_ref().is_err_and(|e| {
        let e: &pipeline::Error<Id> = e.as_ref();
        matches!(e, pipeline::Error::Create(_))
    });
    if failed {
        guard.fail();
    } else {
        guard.done();
    }
}
