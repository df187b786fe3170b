//! [`House`] definitions.

use std::sync::LazyLock;

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Room;
use crate::domain::{image, Description};

/// House containing rentable [`Room`]s.
#[derive(Clone, Debug)]
pub struct House {
    /// ID of this [`House`].
    pub id: Id,

    /// [`Street`] this [`House`] is located on.
    pub street: Street,

    /// [`Number`] of this [`House`] on its [`Street`].
    pub number: Number,

    /// [`PostalCode`] of this [`House`].
    pub postal_code: PostalCode,

    /// [`Description`] of this [`House`].
    pub description: Description,

    /// Google Maps [`Link`] of this [`House`], if any.
    pub google_maps: Option<Link>,

    /// Street View [`Link`] of this [`House`], if any.
    pub street_view: Option<Link>,

    /// [`Occupancy`] of this [`House`] rooms.
    pub occupancy: Occupancy,

    /// Images of this [`House`], in display order.
    pub images: Vec<image::Url>,
}

/// [`House`] that is not persisted yet.
#[derive(Clone, Debug)]
pub struct Draft {
    /// [`Street`] of a new [`House`].
    pub street: Street,

    /// [`Number`] of a new [`House`].
    pub number: Number,

    /// [`PostalCode`] of a new [`House`].
    pub postal_code: PostalCode,

    /// [`Description`] of a new [`House`].
    pub description: Description,

    /// Google Maps [`Link`] of a new [`House`].
    pub google_maps: Option<Link>,

    /// Street View [`Link`] of a new [`House`].
    pub street_view: Option<Link>,

    /// [`Occupancy`] of a new [`House`].
    pub occupancy: Occupancy,
}

impl Draft {
    /// Turns this [`Draft`] into the [`House`] it has been persisted as.
    #[must_use]
    pub fn into_house(self, id: Id, images: Vec<image::Url>) -> House {
        let Self {
            street,
            number,
            postal_code,
            description,
            google_maps,
            street_view,
            occupancy,
        } = self;
        House {
            id,
            street,
            number,
            postal_code,
            description,
            google_maps,
            street_view,
            occupancy,
            images,
        }
    }
}

/// ID of a [`House`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

/// Street of a [`House`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Street(String);

impl Street {
    /// Creates a new [`Street`] if the given `street` is valid.
    #[must_use]
    pub fn new(street: impl Into<String>) -> Option<Self> {
        let street = street.into();
        Self::check(&street).then_some(Self(street))
    }

    /// Checks whether the given `street` is a valid [`Street`].
    fn check(street: impl AsRef<str>) -> bool {
        let street = street.as_ref();
        street.trim() == street && !street.is_empty() && street.len() <= 512
    }
}

impl FromStr for Street {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Street`")
    }
}

/// Number of a [`House`] on its [`Street`] (like `33` or `12B`).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] if the given `num` is valid.
    #[must_use]
    pub fn new(num: impl Into<String>) -> Option<Self> {
        let num = num.into();
        Self::check(&num).then_some(Self(num))
    }

    /// Checks whether the given `num` is a valid [`Number`].
    fn check(num: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Number`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N}/-]{0,15}$")
                .expect("valid regex")
        });

        REGEX.is_match(num.as_ref())
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `house::Number`")
    }
}

/// Postal code of a [`House`] in the `NNNN-NNN` format.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct PostalCode(String);

impl PostalCode {
    /// Creates a new [`PostalCode`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`PostalCode`].
    fn check(code: impl AsRef<str>) -> bool {
        /// Regular expression checking [`PostalCode`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\d{4}-\d{3}$").expect("valid regex")
        });

        REGEX.is_match(code.as_ref())
    }
}

impl FromStr for PostalCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PostalCode`")
    }
}

/// Map link of a [`House`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Link(String);

impl Link {
    /// Creates a new [`Link`] if the given `url` is an HTTP(S) URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        super::is_http_url(&url).then_some(Self(url))
    }
}

impl FromStr for Link {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `house::Link`")
    }
}

/// Count of rooms in a [`House`].
pub type RoomCount = u16;

/// Occupancy of [`House`] rooms.
///
/// Taken rooms never exceed the total ones.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Occupancy {
    /// Total number of rooms.
    total: RoomCount,

    /// Number of taken rooms.
    taken: RoomCount,
}

impl Occupancy {
    /// Creates a new [`Occupancy`] if `taken` rooms don't exceed the `total`
    /// ones.
    #[must_use]
    pub fn new(total: RoomCount, taken: RoomCount) -> Option<Self> {
        (taken <= total).then_some(Self { total, taken })
    }

    /// Returns the total number of rooms.
    #[must_use]
    pub fn total(self) -> RoomCount {
        self.total
    }

    /// Returns the number of taken rooms.
    #[must_use]
    pub fn taken(self) -> RoomCount {
        self.taken
    }

    /// Returns the number of rooms still available.
    #[must_use]
    pub fn available(self) -> RoomCount {
        self.total - self.taken
    }
}

#[cfg(test)]
mod spec {
    use super::{Link, Number, Occupancy, PostalCode, Street};

    #[test]
    fn occupancy_never_exceeds_total() {
        let occupancy = Occupancy::new(5, 3).unwrap();
        assert_eq!(occupancy.total(), 5);
        assert_eq!(occupancy.taken(), 3);
        assert_eq!(occupancy.available(), 2);

        assert!(Occupancy::new(0, 0).is_some());
        assert!(Occupancy::new(4, 4).is_some());
        assert!(Occupancy::new(4, 5).is_none());
    }

    #[test]
    fn postal_code_format() {
        assert!(PostalCode::new("4000-322").is_some());
        assert!(PostalCode::new("4000322").is_none());
        assert!(PostalCode::new("4000-32").is_none());
        assert!(PostalCode::new(" 4000-322").is_none());
    }

    #[test]
    fn number_format() {
        assert!(Number::new("33").is_some());
        assert!(Number::new("12B").is_some());
        assert!(Number::new("7/2").is_some());
        assert!(Number::new("").is_none());
        assert!(Number::new("-1").is_none());
        assert!(Number::new("1 2").is_none());
    }

    #[test]
    fn street_and_link() {
        assert!(Street::new("Rua de Santa Catarina").is_some());
        assert!(Street::new("").is_none());
        assert!(Street::new("Rua ").is_none());

        assert!(Link::new("https://maps.app.goo.gl/xyz").is_some());
        assert!(Link::new("maps.app.goo.gl/xyz").is_none());
    }
}
