//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::DateTimeOf;
use derive_more::{AsRef, Display, FromStr};
use serde::Deserialize;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Authorized session of a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`user::Role`] of the [`User`] at the moment of authorization.
    pub role: user::Role,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Indicates whether this [`Session`] belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == user::Role::Admin
    }
}

/// Claims of a [`Token`] issued by the authentication backend.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Claims {
    /// ID of the [`User`] the [`Token`] is issued for.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// [`DateTime`] when the [`Token`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// Marker of a [`Session`] expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, Expiration)>;
