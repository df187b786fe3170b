//! [`Command`] for creating a new [`Room`].

use common::operations::{Insert, Resolve, Update, Upload};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{image, room, Room},
    infra::{database, storage, Database, Storage},
    pipeline, staging, submission, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Room`] along with its staged images.
#[derive(Debug)]
pub struct CreateRoom {
    /// [`submission::Id`] of the form this [`Room`] is submitted with, if
    /// any.
    pub submission: Option<submission::Id>,

    /// [`room::Draft`] of a new [`Room`].
    pub draft: room::Draft,

    /// Staged images of a new [`Room`].
    pub images: staging::Store,
}

impl<Db, St> Command<CreateRoom> for Service<Db, St>
where
    Db: Database<
            Insert<room::Draft>,
            Ok = room::Id,
            Err = Traced<database::Error>,
        > + Database<
            Update<image::Attachment<room::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    St: Storage<Upload<image::Object>, Ok = (), Err = Traced<storage::Error>>
        + Storage<
            Resolve<image::Location>,
            Ok = image::Url,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = pipeline::Created<Room>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRoom {
            submission,
            draft,
            images,
        } = cmd;

        let guard = self.begin_submission(submission).map_err(|(id, state)| {
            tracerr::new!(E::DuplicateSubmission { id, state })
        })?;

        let result = pipeline::commit(
            self.database(),
            self.storage(),
            &self.config().buckets.rooms,
            draft.clone(),
            images,
        )
        .await;
        super::finish_submission(guard, &result);

        let pipeline::Committed {
            id,
            images,
            skipped,
        } = result.map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(pipeline::Created {
            record: draft.into_room(id, images),
            skipped,
        })
    }
}

/// Error of [`CreateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Form has been submitted already.
    #[display("Submission `{id}` is {state} already")]
    #[from(ignore)]
    DuplicateSubmission {
        /// [`submission::Id`] of the form.
        id: submission::Id,

        /// Current [`submission::State`] of the form.
        state: submission::State,
    },

    /// [`pipeline`] error.
    #[display("Failed to commit a `Room`: {_0}")]
    Pipeline(pipeline::Error<room::Id>),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::{
        domain::{room, Description},
        pipeline::spec::{staged, Bucketed, Memory},
        submission, Buckets, Config, Service,
    };

    use super::{Command as _, CreateRoom, ExecutionError};

    fn service() -> Service<Memory, Bucketed> {
        let config = Config {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"s"),
            jwt_audience: None,
            buckets: Buckets {
                houses: "house_images".parse().unwrap(),
                rooms: "room_images".parse().unwrap(),
            },
        };
        Service::new(config, Memory::default(), Bucketed::default())
    }

    fn form(id: &str, images: &[&[u8]]) -> CreateRoom {
        CreateRoom {
            submission: Some(submission::Id::new(id).unwrap()),
            draft: room::Draft {
                house_id: Uuid::new_v4().into(),
                number: room::Number::new(3).unwrap(),
                kind: room::Kind::Double,
                price: room::Price::new(Decimal::new(45000, 2)).unwrap(),
                is_available: true,
                beds: room::Kind::Double.default_beds(),
                renters: vec![],
                description: Description::new("Sunny").unwrap(),
            },
            images: staged(images),
        }
    }

    fn state(svc: &Service<Memory, Bucketed>, id: &str) -> submission::State {
        svc.submissions().state(&submission::Id::new(id).unwrap())
    }

    #[tokio::test]
    async fn creates_room_with_images_in_rooms_bucket() {
        let svc = service();

        let created = svc.execute(form("f1", &[b"a", b"b"])).await.unwrap();

        let id = Memory::uuid(1);
        assert_eq!(created.record.id, room::Id::from(id));
        assert_eq!(created.record.number, room::Number::new(3).unwrap());
        assert!(created.skipped.is_empty());
        assert_eq!(
            svc.storage().locations(),
            [format!("room_images/{id}/0"), format!("room_images/{id}/1")],
        );
        assert_eq!(
            svc.database().record(1).unwrap().images,
            created.record.images,
        );
        assert_eq!(state(&svc, "f1"), submission::State::Done);
    }

    #[tokio::test]
    async fn blocks_resubmission_of_done_form() {
        let svc = service();
        drop(svc.execute(form("f1", &[])).await.unwrap());

        let err = svc.execute(form("f1", &[])).await.unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::DuplicateSubmission {
                state: submission::State::Done,
                ..
            },
        ));
        assert_eq!(svc.database().records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_creation_allows_retry() {
        let svc = service();
        svc.database().fail_insert(true);

        let err = svc.execute(form("f1", &[b"a"])).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::Pipeline(_)));
        assert_eq!(state(&svc, "f1"), submission::State::Failed);
        assert_eq!(svc.storage().attempts(), 0);

        svc.database().fail_insert(false);
        assert!(svc.execute(form("f1", &[b"a"])).await.is_ok());
        assert_eq!(state(&svc, "f1"), submission::State::Done);
    }

    #[tokio::test]
    async fn failed_finalize_still_completes_submission() {
        let svc = service();
        svc.database().fail_update(true);

        let err = svc.execute(form("f1", &[b"a"])).await.unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::Pipeline(_)));
        assert_eq!(state(&svc, "f1"), submission::State::Done);
        assert_eq!(svc.storage().attempts(), 1);
    }

    #[tokio::test]
    async fn anonymous_submission_is_not_tracked() {
        let svc = service();
        let mut cmd = form("f1", &[]);
        cmd.submission = None;

        assert!(svc.execute(cmd).await.is_ok());
        assert_eq!(state(&svc, "f1"), submission::State::Idle);
    }
}
