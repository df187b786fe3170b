//! Multipart [`Form`] definitions.

use std::{fmt, str::FromStr};

use axum::extract::{multipart::MultipartError, Multipart};
use derive_more::{Display, Error, From};
use service::{domain::image, staging, submission};

use crate::{AsError, Error as ApiError};

/// Name of the form parts carrying images.
const IMAGE: &str = "image";

/// Name of the form part carrying the [`submission::Id`].
const SUBMISSION: &str = "submission";

/// Submitted multipart form of a new record.
///
/// Text parts are kept by their names, while every non-empty `image` part is
/// staged in the order it was submitted.
#[derive(Debug, Default)]
pub struct Form {
    /// Text parts of this [`Form`] in submission order.
    texts: Vec<(String, String)>,

    /// Images staged from this [`Form`].
    pub images: staging::Store,

    /// [`submission::Id`] of this [`Form`], if provided.
    pub submission: Option<submission::Id>,
}

impl Form {
    /// Reads a new [`Form`] from the provided [`Multipart`] body.
    ///
    /// # Errors
    ///
    /// If the body is malformed or the [`submission::Id`] is invalid.
    pub async fn read(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };
            match name.as_str() {
                IMAGE => {
                    let content_type =
                        field.content_type().map(ToOwned::to_owned);
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part for an unused file input.
                    if bytes.is_empty() {
                        continue;
                    }
                    _ = form.images.stage(image::Blob {
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                SUBMISSION => {
                    let text = field.text().await?;
                    form.submission = Some(parse(SUBMISSION, &text)?);
                }
                _ => {
                    let text = field.text().await?;
                    form.texts.push((name, text));
                }
            }
        }

        Ok(form)
    }

    /// Parses the required text part with the provided `name`.
    ///
    /// # Errors
    ///
    /// If the part is missing, empty or invalid.
    pub fn required<T>(&self, name: &'static str) -> Result<T, FormError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.optional(name)?.ok_or(FormError::Missing(name))
    }

    /// Parses the optional text part with the provided `name`.
    ///
    /// An empty part is considered missing.
    ///
    /// # Errors
    ///
    /// If the part is invalid.
    pub fn optional<T>(
        &self,
        name: &'static str,
    ) -> Result<Option<T>, FormError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.texts
            .iter()
            .find(|(n, text)| n == name && !text.is_empty())
            .map(|(_, text)| parse(name, text))
            .transpose()
    }

    /// Parses all the text parts with the provided `name`.
    ///
    /// # Errors
    ///
    /// If any of the parts is invalid.
    pub fn all<T>(&self, name: &'static str) -> Result<Vec<T>, FormError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.texts
            .iter()
            .filter(|(n, text)| n == name && !text.is_empty())
            .map(|(_, text)| parse(name, text))
            .collect()
    }
}

/// Parses the `value` of the field with the provided `name`.
///
/// # Errors
///
/// If the `value` is invalid.
pub fn parse<T>(name: &'static str, value: &str) -> Result<T, FormError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| FormError::Invalid {
        field: name,
        reason: e.to_string(),
    })
}

/// Error of reading submitted fields.
#[derive(Debug, Display, Error, From)]
pub enum FormError {
    /// Required field is missing.
    #[display("`{_0}` field is required")]
    #[from(ignore)]
    Missing(#[error(not(source))] &'static str),

    /// Field has an invalid value.
    #[display("`{field}` field is invalid: {reason}")]
    #[from(ignore)]
    Invalid {
        /// Name of the field.
        field: &'static str,

        /// Reason the value is invalid.
        reason: String,
    },

    /// Multipart body is malformed.
    #[display("{_0}")]
    Multipart(MultipartError),
}

impl AsError for FormError {
    fn try_as_error(&self) -> Option<ApiError> {
        match self {
            Self::Multipart(e) => e.try_as_error(),
            Self::Missing(_) | Self::Invalid { .. } => Some(ApiError {
                code: "INVALID_FORM",
                status_code: http::StatusCode::BAD_REQUEST,
                message: self.to_string(),
                backtrace: None,
            }),
        }
    }
}
