//! HTTP API definitions.

pub mod form;
pub mod house;
pub mod navigation;
pub mod room;
pub mod user;

use std::fmt;

use axum::{
    routing::{get, patch, post},
    Router,
};
use itertools::Itertools as _;
use serde::Serialize;
#[cfg(doc)]
use service::staging;
use service::{domain::image, pipeline};

use crate::{define_error, AsError, Error};

pub use self::{house::House, navigation::Navigation, room::Room, user::User};

/// Creates a new [`Router`] serving the HTTP API.
///
/// Expects the [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/navigation", get(navigation::get))
        .route("/profile", get(user::profile))
        .route("/houses", get(house::list))
        .route("/houses/:id", get(house::get))
        .route("/rooms", get(room::list))
        .route("/rooms/:id", get(room::get))
        .route("/admin/houses", post(house::create))
        .route(
            "/admin/houses/:id",
            patch(house::update).delete(house::delete),
        )
        .route("/admin/rooms", post(room::create))
        .route("/admin/rooms/:id", patch(room::update))
        .route("/admin/users", get(user::list))
}

/// Newly created record along with the images that failed to be stored.
#[derive(Clone, Debug, Serialize)]
pub struct Created<T> {
    /// Created record.
    #[serde(flatten)]
    pub record: T,

    /// Submitted images that are missing from the created record.
    pub skipped: Vec<SkippedImage>,
}

impl<T, R: Into<T>> From<pipeline::Created<R>> for Created<T> {
    fn from(created: pipeline::Created<R>) -> Self {
        let pipeline::Created { record, skipped } = created;
        Self {
            record: record.into(),
            skipped: skipped.into_iter().map(Into::into).collect(),
        }
    }
}

/// Submitted image that failed to be attached.
#[derive(Clone, Debug, Serialize)]
pub struct SkippedImage {
    /// Position of the image in the submitted form.
    pub ordinal: usize,

    /// [`staging::PreviewUrl`] the image was staged with.
    pub preview: String,

    /// Location the image is stored at, if it has been stored without a
    /// public URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<String>,

    /// Reason the image was skipped.
    pub reason: String,
}

impl From<pipeline::Skipped> for SkippedImage {
    fn from(skipped: pipeline::Skipped) -> Self {
        let pipeline::Skipped {
            ordinal,
            preview,
            stored,
            error,
        } = skipped;
        Self {
            ordinal,
            preview: preview.to_string(),
            stored: stored.map(|l| l.to_string()),
            reason: error.to_string(),
        }
    }
}

/// Converts the provided [`image::Url`]s into their textual form.
fn urls(images: Vec<image::Url>) -> Vec<String> {
    images.into_iter().map(|url| url.to_string()).collect()
}

impl<Id: fmt::Display> AsError for pipeline::Error<Id> {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Create(e) if e.is_constraint_violation() => Some(Error {
                code: "CONSTRAINT_VIOLATION",
                status_code: http::StatusCode::CONFLICT,
                message: e.constraint().map_or_else(
                    || "Record conflicts with the stored data".to_owned(),
                    |c| format!("Record violates `{c}` constraint"),
                ),
                backtrace: None,
            }),
            Self::Create(e) => e.try_as_error(),
            Self::Finalize(e) => Some(Error {
                code: "FINALIZE_FAILED",
                status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                message: format!(
                    "{e}. Orphaned objects: [{}]",
                    e.orphaned.iter().join(", "),
                ),
                backtrace: None,
            }),
        }
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an administrator"]
        Admin,
    }
}

define_error! {
    enum SubmissionError {
        #[code = "DUPLICATE_SUBMISSION"]
        #[status = CONFLICT]
        #[message = "Form has been submitted already"]
        Duplicate,
    }
}

#[cfg(test)]
pub(crate) mod spec {
    //! Helpers for exercising the [`router()`] without a running database.

    use axum::{body::Body, Extension, Router};
    use http_body_util::BodyExt as _;
    use service::infra::{Fs, Postgres};
    use tower::ServiceExt as _;

    use crate::{config, Service};

    use super::router;

    /// Creates a new [`Router`] upon a [`Service`] whose database is never
    /// reached.
    pub(crate) fn app() -> Router {
        let conf = config::Config::default();
        let service = Service::new(
            service::Config {
                jwt_decoding_key: (&conf.auth).into(),
                jwt_audience: conf.auth.jwt_audience.clone(),
                buckets: conf.storage.buckets.try_into().unwrap(),
            },
            Postgres::new(&conf.postgres.into()).unwrap(),
            Fs::new(std::env::temp_dir(), conf.storage.public_url).unwrap(),
        );
        router().layer(Extension(service))
    }

    /// Sends the provided `request` to the [`app()`] returning the response
    /// status and body.
    pub(crate) async fn send(
        request: http::Request<Body>,
    ) -> (http::StatusCode, String) {
        let resp = app().oneshot(request).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn admin_routes_require_authorization() {
        let (status, body) = send(
            http::Request::post("/admin/rooms")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert!(body.contains("AUTHORIZATION_REQUIRED"), "{body}");
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let (status, body) = send(
            http::Request::get("/profile")
                .header(http::header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert!(body.contains("INVALID_TOKEN"), "{body}");
    }
}
