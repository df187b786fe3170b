//! [`User`]-related definitions.

use axum::Json;
use common::Date;
use serde::Serialize;
use service::{
    domain::{self, user},
    query, Query as _,
};

use crate::{define_error, AsError, Context, Error};

/// User of the system, either a renter or an administrator.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// Unique identifier of this [`User`].
    pub id: user::Id,

    /// First name of this [`User`].
    pub first_name: String,

    /// Last name of this [`User`].
    pub last_name: String,

    /// Full name of this [`User`].
    pub full_name: String,

    /// Email address of this [`User`].
    pub email: Option<String>,

    /// Phone number of this [`User`].
    pub phone: Option<String>,

    /// Nationality of this [`User`].
    pub nationality: Option<String>,

    /// Two-letter code of the language this [`User`] prefers.
    pub preferred_language: String,

    /// Role of this [`User`].
    pub role: String,

    /// Number of the room this [`User`] rents.
    pub room_number: Option<u16>,

    /// Number of the house this [`User`] lives in.
    pub house_number: Option<String>,

    /// URL of the profile picture of this [`User`].
    pub picture_url: Option<String>,

    /// [`Date`] this [`User`] arrived.
    pub arrival_date: Option<Date>,

    /// [`Date`] this [`User`] is estimated to leave.
    pub departure_estimate: Option<Date>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let full_name = user.full_name();
        let domain::User {
            id,
            first_name,
            last_name,
            email,
            phone,
            nationality,
            preferred_language,
            role,
            room_number,
            house_number,
            picture_url,
            arrival_date,
            departure_estimate,
        } = user;
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            full_name,
            email: email.map(|e| e.to_string()),
            phone: phone.map(|p| p.to_string()),
            nationality: nationality.map(|n| n.to_string()),
            preferred_language: preferred_language.to_string(),
            role: role.to_string(),
            room_number: room_number.map(Into::into),
            house_number: house_number.map(|n| n.to_string()),
            picture_url: picture_url.map(|u| u.to_string()),
            arrival_date,
            departure_estimate,
        }
    }
}

/// Returns the profile of the authenticated [`User`].
#[tracing::instrument(skip_all, fields(user.id = tracing::field::Empty))]
pub async fn profile(ctx: Context) -> Result<Json<User>, Error> {
    let session = ctx.current_session().await?;
    _ = tracing::Span::current()
        .record("user.id", tracing::field::display(session.user_id));

    ctx.service()
        .execute(query::user::ById::by(session.user_id))
        .await
        .map_err(AsError::into_error)?
        .map(|u| Json(u.into()))
        .ok_or_else(|| UserError::NotExists.into())
}

/// Lists all the [`User`]s.
#[tracing::instrument(skip_all)]
pub async fn list(ctx: Context) -> Result<Json<Vec<User>>, Error> {
    _ = ctx.admin_session().await?;

    let users = ctx
        .service()
        .execute(query::users::List::by(()))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,
    }
}

#[cfg(test)]
mod spec {
    use axum::body::Body;

    use crate::api::spec::send;

    #[tokio::test]
    async fn listing_requires_authorization() {
        let (status, _) = send(
            http::Request::get("/admin/users").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }
}
