//! [`Command`] for creating a new [`House`].

use common::operations::{Insert, Resolve, Update, Upload};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{house, image, House},
    infra::{database, storage, Database, Storage},
    pipeline, staging, submission, Service,
};

use super::Command;

/// [`Command`] for creating a new [`House`] along with its staged images.
#[derive(Debug)]
pub struct CreateHouse {
    /// [`submission::Id`] of the form this [`House`] is submitted with, if
    /// any.
    pub submission: Option<submission::Id>,

    /// [`house::Draft`] of a new [`House`].
    pub draft: house::Draft,

    /// Staged images of a new [`House`].
    pub images: staging::Store,
}

impl<Db, St> Command<CreateHouse> for Service<Db, St>
where
    Db: Database<
            Insert<house::Draft>,
            Ok = house::Id,
            Err = Traced<database::Error>,
        > + Database<
            Update<image::Attachment<house::Id>>,
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
    type Ok = pipeline::Created<House>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateHouse) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateHouse {
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
            &self.config().buckets.houses,
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
            record: draft.into_house(id, images),
            skipped,
        })
    }
}

/// Error of [`CreateHouse`] [`Command`] execution.
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
    #[display("Failed to commit a `House`: {_0}")]
    Pipeline(pipeline::Error<house::Id>),
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use crate::{
        domain::{house, Description},
        pipeline::spec::{staged, Bucketed, Memory},
        submission, Buckets, Config, Service,
    };

    use super::{Command as _, CreateHouse};

    fn service(storage: Bucketed) -> Service<Memory, Bucketed> {
        let config = Config {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"s"),
            jwt_audience: None,
            buckets: Buckets {
                houses: "house_images".parse().unwrap(),
                rooms: "room_images".parse().unwrap(),
            },
        };
        Service::new(config, Memory::default(), storage)
    }

    fn draft() -> house::Draft {
        house::Draft {
            street: house::Street::new("Rua de Cedofeita").unwrap(),
            number: house::Number::new("120").unwrap(),
            postal_code: house::PostalCode::new("4050-180").unwrap(),
            description: Description::new("").unwrap(),
            google_maps: None,
            street_view: None,
            occupancy: house::Occupancy::new(6, 2).unwrap(),
        }
    }

    #[tokio::test]
    async fn creates_house_with_images_in_houses_bucket() {
        let svc = service(Bucketed {
            rejected: HashSet::from([b"bad".to_vec()]),
            ..Bucketed::default()
        });

        let created = svc
            .execute(CreateHouse {
                submission: Some(submission::Id::new("house-form").unwrap()),
                draft: draft(),
                images: staged(&[b"bad", b"good"]),
            })
            .await
            .unwrap();

        let id = Memory::uuid(1);
        assert_eq!(created.record.id, house::Id::from(id));
        assert_eq!(created.record.occupancy.available(), 4);
        assert_eq!(created.skipped.len(), 1);
        assert_eq!(created.skipped[0].ordinal, 0);
        assert_eq!(
            svc.storage().locations(),
            [format!("house_images/{id}/1")],
        );
        assert_eq!(
            svc.database().record(1).unwrap().images,
            created.record.images,
        );
    }
}
