//! Domain definitions.

pub mod house;
pub mod image;
pub mod room;
pub mod user;

use std::str::FromStr;

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::ToSql;

pub use self::{house::House, room::Room, user::User};

/// Free-form description of a [`House`] or a [`Room`].
#[derive(AsRef, Clone, Debug, Default, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Maximum length of a [`Description`] in bytes.
    const MAX_LEN: usize = 4096;

    /// Creates a new [`Description`] if the given `text` is valid.
    ///
    /// Empty [`Description`]s are allowed.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text && text.len() <= Self::MAX_LEN
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Checks whether the given `url` is an absolute HTTP(S) URL.
fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    rest.is_some_and(|rest| {
        !rest.is_empty()
            && !rest.starts_with('/')
            && url.len() <= 2048
            && !url.chars().any(|c| c.is_whitespace() || c.is_control())
    })
}

#[cfg(test)]
mod spec {
    use super::{is_http_url, Description};

    #[test]
    fn description_allows_empty_but_not_padded_text() {
        assert!(Description::new("").is_some());
        assert!(Description::new("Bright room facing the river").is_some());
        assert!(Description::new(" padded").is_none());
        assert!(Description::new("x".repeat(4097)).is_none());
    }

    #[test]
    fn recognizes_http_urls() {
        assert!(is_http_url("https://maps.app.goo.gl/abc"));
        assert!(is_http_url("http://localhost:8080/a/b.jpg"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("https:///path"));
        assert!(!is_http_url("https://exa mple.com"));
        assert!(!is_http_url("blob:4f1c"));
    }
}
