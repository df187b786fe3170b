//! [`Room`] definitions.

use std::fmt;

use common::define_kind;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{House, User};
use crate::domain::{house, image, user, Description};

/// Rentable room in a [`House`].
#[derive(Clone, Debug)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// ID of the [`House`] this [`Room`] belongs to.
    pub house_id: house::Id,

    /// [`Number`] of this [`Room`] in its [`House`].
    pub number: Number,

    /// [`Kind`] of this [`Room`].
    pub kind: Kind,

    /// Monthly [`Price`] of this [`Room`].
    pub price: Price,

    /// Indicator whether this [`Room`] can be rented.
    pub is_available: bool,

    /// Number of beds in this [`Room`].
    pub beds: Beds,

    /// IDs of the [`User`]s renting this [`Room`].
    ///
    /// Not capped by the number of [`Beds`].
    pub renters: Vec<user::Id>,

    /// Images of this [`Room`], in display order.
    pub images: Vec<image::Url>,

    /// [`Description`] of this [`Room`].
    pub description: Description,
}

/// [`Room`] that is not persisted yet.
#[derive(Clone, Debug)]
pub struct Draft {
    /// ID of the [`House`] a new [`Room`] belongs to.
    pub house_id: house::Id,

    /// [`Number`] of a new [`Room`].
    pub number: Number,

    /// [`Kind`] of a new [`Room`].
    pub kind: Kind,

    /// [`Price`] of a new [`Room`].
    pub price: Price,

    /// Indicator whether a new [`Room`] can be rented.
    pub is_available: bool,

    /// Number of beds in a new [`Room`].
    pub beds: Beds,

    /// IDs of the [`User`]s renting a new [`Room`].
    pub renters: Vec<user::Id>,

    /// [`Description`] of a new [`Room`].
    pub description: Description,
}

impl Draft {
    /// Turns this [`Draft`] into the [`Room`] it has been persisted as.
    #[must_use]
    pub fn into_room(self, id: Id, images: Vec<image::Url>) -> Room {
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
        Room {
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
        }
    }
}

/// ID of a [`Room`].
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

/// Number of a [`Room`] inside its [`House`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd)]
pub struct Number(u16);

impl Number {
    /// Creates a new [`Number`] if the given `num` is positive.
    #[must_use]
    pub fn new(num: u16) -> Option<Self> {
        (num > 0).then_some(Self(num))
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `room::Number`")
    }
}

define_kind! {
    #[doc = "Kind of a [`Room`] by the number of people it hosts."]
    enum Kind {
        #[doc = "Room for one person."]
        Single = 1,

        #[doc = "Room for two people."]
        Double = 2,

        #[doc = "Room for three people."]
        Triple = 3,

        #[doc = "Room for four people."]
        Quad = 4,
    }
}

impl Kind {
    /// Returns the number of [`Beds`] a [`Room`] of this [`Kind`] has by
    /// default.
    #[must_use]
    pub const fn default_beds(self) -> Beds {
        self.u8()
    }
}

/// Number of beds in a [`Room`].
pub type Beds = u8;

/// Monthly price of a [`Room`] in euros.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is non-negative and has
    /// at most two fractional digits.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO && amount.normalize().scale() <= 2)
            .then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}€", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.parse::<Decimal>().map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("invalid `Price`")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Kind, Number, Price};

    #[test]
    fn kind_default_beds() {
        assert_eq!(Kind::Single.default_beds(), 1);
        assert_eq!(Kind::Double.default_beds(), 2);
        assert_eq!(Kind::Triple.default_beds(), 3);
        assert_eq!(Kind::Quad.default_beds(), 4);
    }

    #[test]
    fn kind_text() {
        assert_eq!(Kind::from_str("double").unwrap(), Kind::Double);
        assert_eq!(Kind::Quad.to_string(), "quad");
        assert!(Kind::from_str("penthouse").is_err());
    }

    #[test]
    fn number_is_positive() {
        assert!(Number::new(0).is_none());
        assert_eq!(Number::from_str("12").unwrap(), Number::new(12).unwrap());
        assert!(Number::from_str("0").is_err());
        assert!(Number::from_str("-3").is_err());
        assert!(Number::from_str("two").is_err());
    }

    #[test]
    fn price() {
        assert_eq!(Price::from_str("350").unwrap().to_string(), "350€");
        assert_eq!(Price::from_str("350.50").unwrap().to_string(), "350.5€");
        assert_eq!(Price::from_str("0").unwrap().amount(), Decimal::ZERO);
        assert!(Price::from_str("-1").is_err());
        assert!(Price::from_str("10.005").is_err());
        assert!(Price::from_str("ten").is_err());
    }
}
