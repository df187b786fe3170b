//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod pipeline;
pub mod query;
pub mod read;
pub mod staging;
pub mod submission;

use derive_more::Debug;

#[cfg(doc)]
use infra::{Database, Storage};
#[cfg(test)]
use tempfile as _;

use crate::domain::image;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] decoding key of the access tokens issued by the authentication
    /// backend.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Audience the access tokens are expected to be issued for.
    ///
    /// [`None`] accepts tokens of any audience.
    pub jwt_audience: Option<String>,

    /// [`Buckets`] to store images in.
    pub buckets: Buckets,
}

impl Config {
    /// Returns the [`jsonwebtoken::Validation`] of access tokens.
    #[must_use]
    pub fn jwt_validation(&self) -> jsonwebtoken::Validation {
        let mut validation = jsonwebtoken::Validation::default();
        if let Some(aud) = &self.jwt_audience {
            validation.set_audience(&[aud]);
        } else {
            validation.validate_aud = false;
        }
        validation
    }
}

/// [`image::Bucket`]s of the [`Storage`] to store images of records in.
#[derive(Clone, Debug)]
pub struct Buckets {
    /// [`image::Bucket`] for images of [`domain::House`]s.
    pub houses: image::Bucket,

    /// [`image::Bucket`] for images of [`domain::Room`]s.
    pub rooms: image::Bucket,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, St> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Storage`] of this [`Service`].
    storage: St,

    /// [`submission::Registry`] of this [`Service`].
    submissions: submission::Registry,
}

impl<Db, St> Service<Db, St> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db, storage: St) -> Self {
        Self {
            config,
            database,
            storage,
            submissions: submission::Registry::new(),
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Storage`] of this [`Service`].
    #[must_use]
    pub fn storage(&self) -> &St {
        &self.storage
    }

    /// Returns [`submission::Registry`] of this [`Service`].
    #[must_use]
    pub fn submissions(&self) -> &submission::Registry {
        &self.submissions
    }
}
