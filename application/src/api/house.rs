//! [`House`]-related definitions.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Path},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, house, Description},
    query,
};
use tracing::Instrument as _;

use crate::{
    api::{
        self,
        form::{self, Form, FormError},
        SubmissionError,
    },
    define_error, AsError, Context, Error,
};

/// House renting out rooms.
#[derive(Clone, Debug, Serialize)]
pub struct House {
    /// Unique identifier of this [`House`].
    pub id: house::Id,

    /// Street this [`House`] is located on.
    pub street: String,

    /// Number of this [`House`] on its street.
    pub number: String,

    /// Postal code of this [`House`].
    pub postal_code: String,

    /// Description of this [`House`].
    pub description: String,

    /// Google Maps link to this [`House`].
    pub google_maps: Option<String>,

    /// Street View link to this [`House`].
    pub street_view: Option<String>,

    /// Total number of rooms in this [`House`].
    pub total_rooms: house::RoomCount,

    /// Number of taken rooms in this [`House`].
    pub taken_rooms: house::RoomCount,

    /// Number of rooms available for renting in this [`House`].
    pub available_rooms: house::RoomCount,

    /// URLs of images of this [`House`].
    pub images: Vec<String>,
}

impl From<domain::House> for House {
    fn from(house: domain::House) -> Self {
        let domain::House {
            id,
            street,
            number,
            postal_code,
            description,
            google_maps,
            street_view,
            occupancy,
            images,
        } = house;
        Self {
            id,
            street: street.to_string(),
            number: number.to_string(),
            postal_code: postal_code.to_string(),
            description: description.to_string(),
            google_maps: google_maps.map(|l| l.to_string()),
            street_view: street_view.map(|l| l.to_string()),
            total_rooms: occupancy.total(),
            taken_rooms: occupancy.taken(),
            available_rooms: occupancy.available(),
            images: api::urls(images),
        }
    }
}

/// Lists all the [`House`]s.
#[tracing::instrument(skip_all)]
pub async fn list(ctx: Context) -> Result<Json<Vec<House>>, Error> {
    let houses = ctx
        .service()
        .execute(query::houses::List::by(()))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(houses.into_iter().map(Into::into).collect()))
}

/// Returns the [`House`] with the provided ID.
#[tracing::instrument(skip_all, fields(house.id = %id))]
pub async fn get(
    ctx: Context,
    Path(id): Path<house::Id>,
) -> Result<Json<House>, Error> {
    ctx.service()
        .execute(query::house::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|h| Json(h.into()))
        .ok_or_else(|| HouseError::NotExists.into())
}

/// Creates a new [`House`] out of the submitted multipart form.
#[tracing::instrument(skip_all, fields(submission = tracing::field::Empty))]
pub async fn create(
    ctx: Context,
    multipart: Result<axum::extract::Multipart, MultipartRejection>,
) -> Result<(http::StatusCode, Json<api::Created<House>>), Error> {
    _ = ctx.admin_session().await?;

    let form = Form::read(multipart.map_err(AsError::into_error)?)
        .await
        .map_err(AsError::into_error)?;
    if let Some(id) = &form.submission {
        _ = tracing::Span::current()
            .record("submission", tracing::field::display(id));
    }
    let draft = draft(&form).map_err(AsError::into_error)?;
    let Form {
        images, submission, ..
    } = form;

    let service = ctx.service().clone();
    let created = tokio::spawn(
        async move {
            service
                .execute(command::CreateHouse {
                    submission,
                    draft,
                    images,
                })
                .await
        }
        .in_current_span(),
    )
    .await
    .map_err(AsError::into_error)?
    .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(created.into())))
}

/// Reads a [`house::Draft`] out of the provided [`Form`].
fn draft(form: &Form) -> Result<house::Draft, FormError> {
    let total = form.required("total_rooms")?;
    let taken = form.optional("taken_rooms")?.unwrap_or_default();
    let occupancy = house::Occupancy::new(total, taken).ok_or_else(|| {
        FormError::Invalid {
            field: "taken_rooms",
            reason: format!("{taken} taken rooms exceed {total} total ones"),
        }
    })?;

    Ok(house::Draft {
        street: form.required("street")?,
        number: form.required("number")?,
        postal_code: form.required("postal_code")?,
        description: form.optional("description")?.unwrap_or_default(),
        google_maps: form.optional("google_maps")?,
        street_view: form.optional("street_view")?,
        occupancy,
    })
}

/// Changes to the scalar fields of a [`House`].
///
/// Absent fields are kept untouched, while `null` links are removed.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Patch {
    /// New street of the [`House`].
    pub street: Option<String>,

    /// New number of the [`House`] on its street.
    pub number: Option<String>,

    /// New postal code of the [`House`].
    pub postal_code: Option<String>,

    /// New description of the [`House`].
    pub description: Option<String>,

    /// New Google Maps link to the [`House`].
    #[serde(deserialize_with = "present")]
    pub google_maps: Option<Option<String>>,

    /// New Street View link to the [`House`].
    #[serde(deserialize_with = "present")]
    pub street_view: Option<Option<String>>,

    /// New total number of rooms in the [`House`].
    pub total_rooms: Option<house::RoomCount>,

    /// New number of taken rooms in the [`House`].
    pub taken_rooms: Option<house::RoomCount>,
}

impl Patch {
    /// Converts this [`Patch`] into an [`command::UpdateHouse`] of the
    /// [`House`] with the provided ID.
    ///
    /// # Errors
    ///
    /// If any of the provided values is invalid.
    pub fn into_command(
        self,
        id: house::Id,
    ) -> Result<command::UpdateHouse, FormError> {
        let Self {
            street,
            number,
            postal_code,
            description,
            google_maps,
            street_view,
            total_rooms,
            taken_rooms,
        } = self;

        let link = |name, link: Option<Option<String>>| {
            link.map(|l| l.map(|l| form::parse(name, &l)).transpose())
                .transpose()
        };
        Ok(command::UpdateHouse {
            street: street.map(|s| form::parse("street", &s)).transpose()?,
            number: number.map(|n| form::parse("number", &n)).transpose()?,
            postal_code: postal_code
                .map(|c| form::parse("postal_code", &c))
                .transpose()?,
            description: description
                .map(|d| form::parse::<Description>("description", &d))
                .transpose()?,
            google_maps: link("google_maps", google_maps)?,
            street_view: link("street_view", street_view)?,
            total_rooms,
            taken_rooms,
            ..command::UpdateHouse::new(id)
        })
    }
}

/// Deserializes a present value, even a `null` one, into [`Some`].
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Updates scalar fields of the [`House`] with the provided ID.
#[tracing::instrument(skip_all, fields(house.id = %id))]
pub async fn update(
    ctx: Context,
    Path(id): Path<house::Id>,
    patch: Result<Json<Patch>, JsonRejection>,
) -> Result<Json<House>, Error> {
    _ = ctx.admin_session().await?;

    let Json(patch) = patch.map_err(AsError::into_error)?;
    let cmd = patch.into_command(id).map_err(AsError::into_error)?;
    let house = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(house.into()))
}

/// Deletes the [`House`] with the provided ID along with its rooms.
#[tracing::instrument(skip_all, fields(house.id = %id))]
pub async fn delete(
    ctx: Context,
    Path(id): Path<house::Id>,
) -> Result<http::StatusCode, Error> {
    _ = ctx.admin_session().await?;

    ctx.service()
        .execute(command::DeleteHouse { id })
        .await
        .map_err(AsError::into_error)?;
    Ok(http::StatusCode::NO_CONTENT)
}

impl AsError for command::create_house::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::DuplicateSubmission { .. } => Some(Error {
                message: self.to_string(),
                ..Error::from(SubmissionError::Duplicate)
            }),
            Self::Pipeline(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_house::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::HouseNotExists(_) => Some(HouseError::NotExists.into()),
            Self::OccupancyExceeded { .. } => Some(Error {
                message: self.to_string(),
                ..Error::from(HouseError::OccupancyExceeded)
            }),
        }
    }
}

impl AsError for command::delete_house::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::HouseNotExists(_) => Some(HouseError::NotExists.into()),
        }
    }
}

define_error! {
    enum HouseError {
        #[code = "HOUSE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`House` does not exist"]
        NotExists,

        #[code = "OCCUPANCY_EXCEEDED"]
        #[status = BAD_REQUEST]
        #[message = "Taken rooms exceed total ones"]
        OccupancyExceeded,
    }
}

#[cfg(test)]
mod spec {
    use axum::{body::Body, extract::FromRequest as _, Json};
    use uuid::Uuid;

    use crate::api::{
        form::{spec as form, Form, FormError},
        spec::send,
    };

    use super::{draft, Patch};

    async fn patch(json: &str) -> Patch {
        let req = http::Request::patch("/")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap();
        let Json(patch) = Json::<Patch>::from_request(req, &()).await.unwrap();
        patch
    }

    async fn read_form(texts: &[(&str, &str)]) -> Form {
        let req = http::Request::post("/")
            .header(http::header::CONTENT_TYPE, form::content_type())
            .body(Body::from(form::body(texts, &[])))
            .unwrap();
        Form::read(axum::extract::Multipart::from_request(req, &()).await.unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn distinguishes_absent_and_null_links() {
        let id = Uuid::new_v4().into();

        let cmd = patch(r#"{"street_view": null}"#)
            .await
            .into_command(id)
            .unwrap();
        assert_eq!(cmd.street_view, Some(None));
        assert!(cmd.google_maps.is_none());
        assert!(cmd.street.is_none());

        let cmd = patch(r#"{"google_maps": "https://maps.app.goo.gl/a"}"#)
            .await
            .into_command(id)
            .unwrap();
        assert_eq!(
            cmd.google_maps.flatten().map(|l| l.to_string()).as_deref(),
            Some("https://maps.app.goo.gl/a"),
        );
    }

    #[tokio::test]
    async fn validates_patched_values() {
        let err = patch(r#"{"postal_code": "4000"}"#)
            .await
            .into_command(Uuid::new_v4().into())
            .unwrap_err();

        assert!(matches!(
            err,
            FormError::Invalid {
                field: "postal_code",
                ..
            },
        ));
    }

    #[tokio::test]
    async fn reads_draft_from_form() {
        let draft = draft(
            &read_form(&[
                ("street", "Rua de Cedofeita"),
                ("number", "120"),
                ("postal_code", "4050-180"),
                ("total_rooms", "6"),
                ("taken_rooms", "2"),
            ])
            .await,
        )
        .unwrap();

        assert_eq!(draft.street.to_string(), "Rua de Cedofeita");
        assert_eq!(draft.occupancy.available(), 4);
        assert!(draft.description.to_string().is_empty());
        assert!(draft.google_maps.is_none());
    }

    #[tokio::test]
    async fn rejects_exceeding_occupancy() {
        let err = draft(
            &read_form(&[
                ("street", "Rua de Cedofeita"),
                ("number", "120"),
                ("postal_code", "4050-180"),
                ("total_rooms", "2"),
                ("taken_rooms", "3"),
            ])
            .await,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            FormError::Invalid {
                field: "taken_rooms",
                ..
            },
        ));
    }

    #[tokio::test]
    async fn deleting_requires_authorization() {
        let (status, _) = send(
            http::Request::delete(format!("/admin/houses/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }
}
