//! Macros for defining kind enums.

/// Macro for defining a kind enum stored as a small integer.
///
/// Textual representation of the variants is `snake_case`, both for
/// [`Display`]/[`FromStr`] and for [`serde`] (if enabled).
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!(Kind::Sphere.to_string(), "sphere");
/// assert_eq!(Kind::from_u8(1), Some(Kind::Cube));
/// ```
///
/// [`Display`]: std::fmt::Display
/// [`FromStr`]: std::str::FromStr
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "snake_case"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Converts the provided [`u8`] representation back, if it
            /// denotes a known variant.
            #[must_use]
            pub fn from_u8(value: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.u8() == value)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let v = u8::try_from(
                    <i16 as $crate::private::postgres_types::FromSql<'_>>
                        ::from_sql(ty, raw)?,
                )?;
                Self::from_u8(v).ok_or_else(|| ::std::format!(
                    "invalid `{}` value: {v}",
                    ::core::stringify!($name),
                ).into())
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                $crate::private::postgres_types::ToSql::to_sql(
                    &i16::from(self.u8()),
                    ty,
                    w,
                )
            }
        }
    };
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    define_kind! {
        #[doc = "Test kind."]
        enum Shape {
            #[doc = "A cube."]
            Cube = 1,

            #[doc = "A square pyramid."]
            SquarePyramid = 2,
        }
    }

    #[test]
    fn converts_to_and_from_u8() {
        assert_eq!(Shape::Cube.u8(), 1);
        assert_eq!(Shape::from_u8(2), Some(Shape::SquarePyramid));
        assert_eq!(Shape::from_u8(0), None);
        assert_eq!(Shape::from_u8(3), None);
    }

    #[test]
    fn uses_snake_case_text() {
        assert_eq!(Shape::SquarePyramid.to_string(), "square_pyramid");
        assert_eq!(Shape::from_str("cube").unwrap(), Shape::Cube);
        assert!(Shape::from_str("Cube").is_err());
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn reads_and_writes_int2() {
        use postgres_types::{private::BytesMut, FromSql as _, ToSql as _, Type};

        let mut buf = BytesMut::new();
        _ = Shape::SquarePyramid.to_sql(&Type::INT2, &mut buf).unwrap();
        assert_eq!(
            Shape::from_sql(&Type::INT2, &buf).unwrap(),
            Shape::SquarePyramid,
        );

        assert!(Shape::from_sql(&Type::INT2, &7_i16.to_be_bytes()).is_err());
        assert!(Shape::from_sql(&Type::INT2, &(-1_i16).to_be_bytes()).is_err());
    }
}
