//! Image definitions.
//!
//! Images are stored as [`Object`]s in a [`Bucket`] of an object storage,
//! under a [`Key`] namespaced by the ID of the record owning them, and are
//! referenced by records via their public [`Url`]s.

use std::{fmt, str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Debug, Display};
#[cfg(feature = "postgres")]
use postgres_types::ToSql;
use regex::Regex;

/// Publicly retrievable URL of a stored image.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Url(String);

impl Url {
    /// Creates a new [`Url`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        super::is_http_url(&url).then_some(Self(url))
    }
}

impl FromStr for Url {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid image `Url`")
    }
}

/// Name of an object storage bucket.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Bucket(String);

impl Bucket {
    /// Creates a new [`Bucket`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Bucket`] name.
    fn check(name: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Bucket`] name format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z0-9][a-z0-9_-]{0,62}$").expect("valid regex")
        });

        REGEX.is_match(name.as_ref())
    }
}

impl FromStr for Bucket {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Bucket`")
    }
}

/// Key of an [`Object`] inside a [`Bucket`].
///
/// Always has the `{owner}/{ordinal}` form, so two images of the same owner
/// never share a [`Key`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Key(String);

impl Key {
    /// Creates a new [`Key`] of the image at the `ordinal` position among the
    /// images of the provided `owner`.
    #[must_use]
    pub fn new(owner: impl fmt::Display, ordinal: usize) -> Self {
        Self(format!("{owner}/{ordinal}"))
    }
}

/// Location of an [`Object`] in an object storage.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{bucket}/{key}")]
pub struct Location {
    /// [`Bucket`] the [`Object`] is stored in.
    pub bucket: Bucket,

    /// [`Key`] of the [`Object`] in the [`Bucket`].
    pub key: Key,
}

/// Raw image contents.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Blob {
    /// MIME type of these contents, if known.
    pub content_type: Option<String>,

    /// Raw bytes.
    #[debug("{} bytes", bytes.len())]
    pub bytes: Vec<u8>,
}

/// [`Blob`] placed at some [`Location`].
#[derive(Clone, Debug)]
pub struct Object {
    /// [`Location`] of this [`Object`].
    pub location: Location,

    /// Contents of this [`Object`].
    pub blob: Blob,
}

/// Full list of image [`Url`]s to attach to the record identified by `Id`.
///
/// Overwrites any previously attached images of the record.
#[derive(Clone, Debug)]
pub struct Attachment<Id> {
    /// ID of the record owning the images.
    pub owner: Id,

    /// [`Url`]s of the images, in display order.
    pub urls: Vec<Url>,
}

#[cfg(test)]
mod spec {
    use super::{Bucket, Key, Location, Url};

    #[test]
    fn key_is_namespaced_by_owner_and_ordinal() {
        assert_eq!(Key::new("abc", 0).to_string(), "abc/0");
        assert_eq!(Key::new(42, 7).to_string(), "42/7");
        assert_ne!(Key::new("abc", 1), Key::new("abc", 2));
    }

    #[test]
    fn bucket_name_format() {
        assert!(Bucket::new("room_images").is_some());
        assert!(Bucket::new("house-images-2").is_some());
        assert!(Bucket::new("").is_none());
        assert!(Bucket::new("Rooms").is_none());
        assert!(Bucket::new("_rooms").is_none());
        assert!(Bucket::new("rooms/nested").is_none());
    }

    #[test]
    fn location_display() {
        let location = Location {
            bucket: Bucket::new("room_images").unwrap(),
            key: Key::new("r1", 3),
        };

        assert_eq!(location.to_string(), "room_images/r1/3");
    }

    #[test]
    fn url_requires_http_scheme() {
        assert!(Url::new("https://cdn.example.com/rooms/r1/0").is_some());
        assert!(Url::new("blob:2b5e").is_none());
        assert!(Url::new("").is_none());
    }

    #[test]
    fn blob_debug_omits_contents() {
        let blob = super::Blob {
            content_type: Some("image/png".into()),
            bytes: vec![0; 3],
        };

        assert_eq!(
            format!("{blob:?}"),
            r#"Blob { content_type: Some("image/png"), bytes: 3 bytes }"#,
        );
    }
}
