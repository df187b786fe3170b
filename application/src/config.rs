//! [`Config`]-related definitions.

use std::path::PathBuf;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use service::domain::image;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Authentication configuration.
    pub auth: Auth,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Storage configuration.
    pub storage: Storage,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// Maximum size of a request body in bytes.
    ///
    /// Bounds the total size of images submitted with a single form.
    #[default(25 * 1024 * 1024)]
    pub body_limit: usize,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Authentication configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Auth {
    /// [JWT] secret shared with the authentication backend issuing access
    /// tokens.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default(SecretString::from("secret"))]
    pub jwt_secret: SecretString,

    /// Audience (`aud` claim) access tokens must be issued for.
    ///
    /// Unset value accepts tokens of any audience.
    #[default(Some("authenticated".into()))]
    pub jwt_audience: Option<String>,
}

impl From<&Auth> for jsonwebtoken::DecodingKey {
    fn from(auth: &Auth) -> Self {
        Self::from_secret(auth.jwt_secret.expose_secret().as_bytes())
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default(SecretString::from("postgres"))]
    pub password: SecretString,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password.expose_secret().to_owned()),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Storage configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Storage {
    /// Directory to store objects in.
    #[default(PathBuf::from("storage"))]
    pub root: PathBuf,

    /// Base URL this server is publicly available by, used in URLs of the
    /// stored objects.
    #[default("http://localhost:8080".to_owned())]
    pub public_url: String,

    /// Names of the buckets to store images in.
    pub buckets: Buckets,
}

/// Names of the buckets to store images in.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Buckets {
    /// Bucket for images of houses.
    #[default("house_images".to_owned())]
    pub houses: String,

    /// Bucket for images of rooms.
    #[default("room_images".to_owned())]
    pub rooms: String,
}

impl TryFrom<Buckets> for service::Buckets {
    type Error = String;

    fn try_from(value: Buckets) -> Result<Self, Self::Error> {
        let Buckets { houses, rooms } = value;

        let bucket = |name: String| {
            image::Bucket::new(name.clone())
                .ok_or_else(|| format!("`{name}` is not a valid bucket name"))
        };
        Ok(Self {
            houses: bucket(houses)?,
            rooms: bucket(rooms)?,
        })
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::ExposeSecret as _;

    use super::{Buckets, Config};

    #[test]
    fn defaults_without_file() {
        let conf = Config::new("does-not-exist.toml").unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.storage.buckets.rooms, "room_images");
        assert_eq!(conf.auth.jwt_secret.expose_secret(), "secret");
        assert_eq!(conf.auth.jwt_audience.as_deref(), Some("authenticated"));
    }

    #[test]
    fn validates_bucket_names() {
        assert!(service::Buckets::try_from(Buckets::default()).is_ok());
        assert!(service::Buckets::try_from(Buckets {
            houses: "House Images".to_owned(),
            rooms: "room_images".to_owned(),
        })
        .is_err());
    }
}
