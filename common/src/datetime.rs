//! UTC instants with a phantom kind.

use std::{cmp::Ordering, marker::PhantomData};

use derive_more::Debug;

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time, truncated to whole seconds.
///
/// `Of` tags what the instant means (e.g. a session expiration), so instants
/// of different kinds are not mixed up accidentally.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Seconds since the Unix epoch.
    secs: i64,

    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Returns the current [`DateTimeOf`].
    #[must_use]
    pub fn now() -> Self {
        Self {
            secs: time::OffsetDateTime::now_utc().unix_timestamp(),
            _of: PhantomData,
        }
    }

    /// Creates a [`DateTimeOf`] out of the provided Unix timestamp.
    ///
    /// [`None`] is returned if the timestamp lies outside of the range
    /// representable as a calendar date.
    #[must_use]
    pub fn from_unix_timestamp(secs: i64) -> Option<Self> {
        time::OffsetDateTime::from_unix_timestamp(secs)
            .ok()
            .map(|_| Self {
                secs,
                _of: PhantomData,
            })
    }

    /// Returns the Unix timestamp of this [`DateTimeOf`].
    #[must_use]
    pub const fn unix_timestamp(&self) -> i64 {
        self.secs
    }

    /// Reinterprets this [`DateTimeOf`] as another kind.
    #[must_use]
    pub const fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            secs: self.secs,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.secs == other.secs
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.secs.cmp(&other.secs)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! [`serde`] integration.

    pub mod unix_timestamp {
        //! [`DateTimeOf`] as a Unix timestamp, as JWT `exp` claims carry it.
        //!
        //! [`DateTimeOf`]: super::super::DateTimeOf

        use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

        use super::super::DateTimeOf;

        /// Serializes the [`DateTimeOf`] as a Unix timestamp.
        ///
        /// # Errors
        ///
        /// Only propagates the [`Serializer`] errors.
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            Of: ?Sized,
        {
            serializer.serialize_i64(dt.unix_timestamp())
        }

        /// Deserializes a Unix timestamp into a [`DateTimeOf`].
        ///
        /// # Errors
        ///
        /// If the timestamp is out of range.
        pub fn deserialize<'de, D, Of>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error>
        where
            D: Deserializer<'de>,
            Of: ?Sized,
        {
            DateTimeOf::from_unix_timestamp(i64::deserialize(deserializer)?)
                .ok_or_else(|| D::Error::custom("timestamp out of range"))
        }
    }
}

#[cfg(test)]
mod spec {
    use super::DateTime;

    #[test]
    fn orders_by_instant() {
        let earlier = DateTime::from_unix_timestamp(1_756_715_400).unwrap();
        let later = DateTime::from_unix_timestamp(1_756_715_460).unwrap();

        assert!(earlier < later);
        assert_eq!(earlier, earlier.coerce::<()>());
        assert!(earlier < DateTime::now());
    }

    #[test]
    fn rejects_out_of_range_timestamp() {
        assert!(DateTime::from_unix_timestamp(i64::MAX).is_none());
    }
}
