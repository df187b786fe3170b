//! Filesystem [`Storage`] implementation.

use std::{io, path::PathBuf};

use common::operations::{Resolve, Upload};
use derive_more::{Display, Error as StdError, From};
use tokio::fs;
use tracerr::Traced;

use crate::{
    domain::image,
    infra::{storage, Storage},
};

/// Path under which [`Fs`] objects are publicly served.
pub const PUBLIC_PATH: &str = "/storage/v1/object/public";

/// [`Storage`] keeping objects as files in a local directory.
///
/// An object is stored in the `{root}/{bucket}/{key}` file and is publicly
/// available by the `{public_url}/storage/v1/object/public/{bucket}/{key}`
/// URL.
#[derive(Clone, Debug)]
pub struct Fs {
    /// Root directory containing [`image::Bucket`] directories.
    root: PathBuf,

    /// Base URL the stored objects are publicly served from.
    public_url: String,
}

impl Fs {
    /// Creates a new [`Fs`] [`Storage`] rooted in the provided directory.
    ///
    /// # Errors
    ///
    /// If the provided `public_url` is not an absolute HTTP(S) URL.
    pub fn new(
        root: impl Into<PathBuf>,
        public_url: impl Into<String>,
    ) -> Result<Self, Traced<storage::Error>> {
        let public_url = public_url.into();
        let public_url = image::Url::new(public_url.trim_end_matches('/'))
            .ok_or_else(|| tracerr::new!(Error::InvalidUrl(public_url)))
            .map_err(tracerr::map_from)?;

        Ok(Self {
            root: root.into(),
            public_url: public_url.to_string(),
        })
    }

    /// Returns the root directory of this [`Fs`] [`Storage`].
    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Returns the path of the file storing an object at the provided
    /// [`image::Location`].
    #[must_use]
    pub fn path(&self, location: &image::Location) -> PathBuf {
        let image::Location { bucket, key } = location;
        let mut path = self.root.join(AsRef::<str>::as_ref(bucket));
        for segment in AsRef::<str>::as_ref(key).split('/') {
            path.push(segment);
        }
        path
    }
}

impl Storage<Upload<image::Object>> for Fs {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Upload(object): Upload<image::Object>,
    ) -> Result<Self::Ok, Self::Err> {
        let image::Object { location, blob } = object;

        let path = self.path(&location);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?;
        }

        // Existing object under the same key is overwritten.
        fs::write(&path, &blob.bytes)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl Storage<Resolve<image::Location>> for Fs {
    type Ok = image::Url;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Resolve(location): Resolve<image::Location>,
    ) -> Result<Self::Ok, Self::Err> {
        let url = format!("{}{PUBLIC_PATH}/{location}", self.public_url);
        image::Url::new(url.clone())
            .ok_or_else(|| tracerr::new!(Error::InvalidUrl(url)))
            .map_err(tracerr::map_from)
    }
}

/// [`Fs`] [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Filesystem I/O error.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),

    /// URL is not a valid public [`image::Url`].
    #[display("`{_0}` is not a valid public URL")]
    #[from(ignore)]
    InvalidUrl(#[error(not(source))] String),
}

#[cfg(test)]
mod spec {
    use common::operations::{Resolve, Upload};

    use crate::{
        domain::image,
        infra::{storage::Storage as _, Fs},
    };

    fn location(bucket: &str, owner: &str, ordinal: usize) -> image::Location {
        image::Location {
            bucket: image::Bucket::new(bucket).unwrap(),
            key: image::Key::new(owner, ordinal),
        }
    }

    fn object(location: image::Location, bytes: &[u8]) -> image::Object {
        image::Object {
            location,
            blob: image::Blob {
                content_type: Some("image/jpeg".into()),
                bytes: bytes.to_vec(),
            },
        }
    }

    #[tokio::test]
    async fn stores_object_under_bucket_and_key() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Fs::new(dir.path(), "http://localhost:8080").unwrap();
        let loc = location("room_images", "r1", 0);

        fs.execute(Upload(object(loc.clone(), b"jpeg"))).await.unwrap();

        let stored = dir.path().join("room_images").join("r1").join("0");
        assert_eq!(fs.path(&loc), stored);
        assert_eq!(std::fs::read(stored).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn overwrites_existing_object_silently() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Fs::new(dir.path(), "http://localhost:8080").unwrap();
        let loc = location("room_images", "r1", 1);

        fs.execute(Upload(object(loc.clone(), b"old"))).await.unwrap();
        fs.execute(Upload(object(loc.clone(), b"new"))).await.unwrap();

        assert_eq!(std::fs::read(fs.path(&loc)).unwrap(), b"new");
    }

    #[tokio::test]
    async fn resolves_public_url_deterministically() {
        let fs = Fs::new("/tmp/unused", "https://cdn.example.com/").unwrap();
        let loc = location("house_images", "h7", 2);

        let first = fs.execute(Resolve(loc.clone())).await.unwrap();
        let second = fs.execute(Resolve(loc)).await.unwrap();

        assert_eq!(
            first.to_string(),
            "https://cdn.example.com/storage/v1/object/public/house_images/h7/2",
        );
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_non_http_public_url() {
        assert!(Fs::new("/tmp/unused", "cdn.example.com").is_err());
        assert!(Fs::new("/tmp/unused", "").is_err());
    }
}
