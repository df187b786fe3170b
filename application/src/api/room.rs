//! [`Room`]-related definitions.

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart,
        Path,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, house, room, user, Description},
    query, read,
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

/// Room of a house rented out to its renters.
#[derive(Clone, Debug, Serialize)]
pub struct Room {
    /// Unique identifier of this [`Room`].
    pub id: room::Id,

    /// ID of the house this [`Room`] belongs to.
    pub house_id: house::Id,

    /// Number of this [`Room`] inside its house.
    pub number: u16,

    /// Kind of this [`Room`] by the number of people it hosts.
    pub kind: String,

    /// Monthly price of this [`Room`] in euros.
    pub price: String,

    /// Indicator whether this [`Room`] can be rented.
    pub is_available: bool,

    /// Number of beds in this [`Room`].
    pub beds: room::Beds,

    /// IDs of the users renting this [`Room`].
    pub renters: Vec<user::Id>,

    /// URLs of images of this [`Room`].
    pub images: Vec<String>,

    /// Description of this [`Room`].
    pub description: String,
}

impl From<domain::Room> for Room {
    fn from(room: domain::Room) -> Self {
        let domain::Room {
            id,
            house_id,
            number,
            kind,
            price,
            is_available,
            beds,
            renters,
            images,
            description,
        } = room;
        Self {
            id,
            house_id,
            number: number.into(),
            kind: kind.to_string(),
            price: price.amount().normalize().to_string(),
            is_available,
            beds,
            renters,
            images: api::urls(images),
            description: description.to_string(),
        }
    }
}

/// [`Room`] in a listing, along with the number of its house.
#[derive(Clone, Debug, Serialize)]
pub struct ListItem {
    /// Listed [`Room`].
    #[serde(flatten)]
    pub room: Room,

    /// Number of the house the [`Room`] belongs to.
    pub house_number: String,
}

impl From<read::room::list::Item> for ListItem {
    fn from(item: read::room::list::Item) -> Self {
        Self {
            room: item.room.into(),
            house_number: item.house_number.to_string(),
        }
    }
}

/// Lists all the [`Room`]s.
#[tracing::instrument(skip_all)]
pub async fn list(ctx: Context) -> Result<Json<Vec<ListItem>>, Error> {
    let rooms = ctx
        .service()
        .execute(query::rooms::List::by(()))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

/// Returns the [`Room`] with the provided ID.
#[tracing::instrument(skip_all, fields(room.id = %id))]
pub async fn get(
    ctx: Context,
    Path(id): Path<room::Id>,
) -> Result<Json<Room>, Error> {
    ctx.service()
        .execute(query::room::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|r| Json(r.into()))
        .ok_or_else(|| RoomError::NotExists.into())
}

/// Creates a new [`Room`] out of the submitted multipart form.
#[tracing::instrument(skip_all, fields(submission = tracing::field::Empty))]
pub async fn create(
    ctx: Context,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(http::StatusCode, Json<api::Created<Room>>), Error> {
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

    // Pipeline keeps running even if the client disconnects.
    let service = ctx.service().clone();
    let created = tokio::spawn(
        async move {
            service
                .execute(command::CreateRoom {
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

/// Reads a [`room::Draft`] out of the provided [`Form`].
///
/// Beds default to the ones of the [`room::Kind`], and a [`Room`] is
/// available unless stated otherwise.
fn draft(form: &Form) -> Result<room::Draft, FormError> {
    let kind: room::Kind = form.required("kind")?;

    Ok(room::Draft {
        house_id: form.required("house_id")?,
        number: form.required("number")?,
        kind,
        price: form.required("price")?,
        is_available: form.optional("is_available")?.unwrap_or(true),
        beds: form.optional("beds")?.unwrap_or(kind.default_beds()),
        renters: form.all("renter")?,
        description: form.optional("description")?.unwrap_or_default(),
    })
}

/// Changes to apply to an existing [`Room`].
///
/// Absent fields are kept untouched. Images cannot be changed this way.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Patch {
    /// ID of the house to move the [`Room`] into.
    pub house_id: Option<house::Id>,

    /// New number of the [`Room`] inside its house.
    pub number: Option<String>,

    /// New kind of the [`Room`].
    pub kind: Option<String>,

    /// New monthly price of the [`Room`] in euros.
    pub price: Option<String>,

    /// New availability of the [`Room`].
    pub is_available: Option<bool>,

    /// New number of beds in the [`Room`].
    pub beds: Option<room::Beds>,

    /// New full list of IDs of the users renting the [`Room`].
    pub renters: Option<Vec<user::Id>>,

    /// New description of the [`Room`].
    pub description: Option<String>,
}

impl Patch {
    /// Converts this [`Patch`] into an [`command::UpdateRoom`] of the
    /// [`Room`] with the provided ID.
    ///
    /// # Errors
    ///
    /// If any of the provided values is invalid.
    pub fn into_command(
        self,
        id: room::Id,
    ) -> Result<command::UpdateRoom, FormError> {
        let Self {
            house_id,
            number,
            kind,
            price,
            is_available,
            beds,
            renters,
            description,
        } = self;

        Ok(command::UpdateRoom {
            house_id,
            number: number.map(|n| form::parse("number", &n)).transpose()?,
            kind: kind.map(|k| form::parse("kind", &k)).transpose()?,
            price: price.map(|p| form::parse("price", &p)).transpose()?,
            is_available,
            beds,
            renters,
            description: description
                .map(|d| form::parse::<Description>("description", &d))
                .transpose()?,
            ..command::UpdateRoom::new(id)
        })
    }
}

/// Applies the submitted [`Patch`] to the [`Room`] with the provided ID.
#[tracing::instrument(skip_all, fields(room.id = %id))]
pub async fn update(
    ctx: Context,
    Path(id): Path<room::Id>,
    patch: Result<Json<Patch>, JsonRejection>,
) -> Result<Json<Room>, Error> {
    _ = ctx.admin_session().await?;

    let Json(patch) = patch.map_err(AsError::into_error)?;
    let cmd = patch.into_command(id).map_err(AsError::into_error)?;
    let room = ctx
        .service()
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(room.into()))
}

impl AsError for command::update_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::NotExists.into()),
        }
    }
}

impl AsError for command::create_room::ExecutionError {
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

define_error! {
    enum RoomError {
        #[code = "ROOM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Room` does not exist"]
        NotExists,
    }
}
