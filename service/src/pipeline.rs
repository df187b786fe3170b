//! Pipeline committing a record along with its staged images.
//!
//! Committing goes through three steps, without any transaction spanning
//! them:
//! 1. The record is inserted into the [`Database`], obtaining its ID.
//! 2. Every staged image is uploaded concurrently into the [`Storage`] under
//!    the `{id}/{ordinal}` key and resolved into its public [`image::Url`].
//!    A failed image is logged and skipped, the rest are not affected.
//! 3. The record is patched with the [`image::Url`]s in staging order.

use std::fmt;

use common::operations::{Insert, Resolve, Update, Upload};
use derive_more::{Display, Error as StdError, From};
use futures::future;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::image,
    infra::{database, storage, Database, Storage},
    staging,
};

/// Record committed by the pipeline.
#[derive(Debug)]
pub struct Committed<Id> {
    /// ID of the created record.
    pub id: Id,

    /// [`image::Url`]s attached to the record, in staging order.
    pub images: Vec<image::Url>,

    /// Images that failed to be uploaded, in staging order.
    pub skipped: Vec<Skipped>,
}

/// Staged image skipped due to its upload failure.
#[derive(Debug)]
pub struct Skipped {
    /// Position of the image in the staging order.
    pub ordinal: usize,

    /// [`staging::PreviewUrl`] of the image.
    pub preview: staging::PreviewUrl,

    /// [`image::Location`] the image is stored at, if it has been stored but
    /// its public [`image::Url`] failed to be resolved.
    pub stored: Option<image::Location>,

    /// Error the upload failed with.
    pub error: Traced<storage::Error>,
}

/// Record created along with its images.
#[derive(Debug)]
pub struct Created<T> {
    /// Created record with its attached images.
    pub record: T,

    /// Images that failed to be uploaded and weren't attached.
    pub skipped: Vec<Skipped>,
}

/// Commits the provided `record` along with its staged `images`, storing
/// them in the provided [`image::Bucket`].
///
/// # Errors
///
/// - [`Error::Create`] if the `record` cannot be inserted. Nothing is uploaded
///   then.
/// - [`Error::Finalize`] if the inserted record cannot be patched with the
///   uploaded images. Uploaded images are kept in the [`Storage`].
#[tracing::instrument(
    skip_all,
    fields(bucket = %bucket, images = images.len()),
)]
pub async fn commit<Db, St, R, Id>(
    database: &Db,
    storage: &St,
    bucket: &image::Bucket,
    record: R,
    images: staging::Store,
) -> Result<Committed<Id>, Traced<Error<Id>>>
where
    Db: Database<Insert<R>, Ok = Id, Err = Traced<database::Error>>
        + Database<
            Update<image::Attachment<Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    St: Storage<Upload<image::Object>, Ok = (), Err = Traced<storage::Error>>
        + Storage<
            Resolve<image::Location>,
            Ok = image::Url,
            Err = Traced<storage::Error>,
        >,
    Id: Clone + fmt::Display,
{
    let id = database
        .execute(Insert(record))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> Error<Id>))?;

    let settled =
        future::join_all(images.into_iter().enumerate().map(|(ord, img)| {
            let location = image::Location {
                bucket: bucket.clone(),
                key: image::Key::new(&id, ord),
            };
            async move {
                let url = upload(storage, location.clone(), img.blob).await;
                (ord, img.preview, location, url)
            }
        }))
        .await;

    let mut images = Vec::with_capacity(settled.len());
    let mut uploaded = Vec::with_capacity(settled.len());
    let mut skipped = Vec::new();
    for (ordinal, preview, location, url) in settled {
        match url {
            Ok(url) => {
                images.push(url);
                uploaded.push(location);
            }
            Err(Failure { error, stored }) => {
                let stored = if stored {
                    log::warn!(
                        "failed to resolve uploaded image `{location}`: \
                         {error}",
                    );
                    uploaded.push(location.clone());
                    Some(location)
                } else {
                    log::warn!("failed to upload image `{location}`: {error}");
                    None
                };
                skipped.push(Skipped {
                    ordinal,
                    preview,
                    stored,
                    error,
                });
            }
        }
    }

    if !images.is_empty() {
        database
            .execute(Update(image::Attachment {
                owner: id.clone(),
                urls: images.clone(),
            }))
            .await
            .map_err(|source| {
                log::error!(
                    "failed to attach {} uploaded images to `{id}`: {source}",
                    uploaded.len(),
                );
                tracerr::new!(Error::Finalize(FinalizeError {
                    owner: id.clone(),
                    orphaned: uploaded,
                    source,
                }))
            })?;
    }

    Ok(Committed {
        id,
        images,
        skipped,
    })
}

/// Failure of a single image upload.
#[derive(Debug)]
struct Failure {
    /// Error the upload failed with.
    error: Traced<storage::Error>,

    /// Indicator whether the image has been stored before the failure.
    stored: bool,
}

/// Uploads the provided [`image::Blob`] to the [`image::Location`] and
/// resolves its public [`image::Url`].
async fn upload<St>(
    storage: &St,
    location: image::Location,
    blob: image::Blob,
) -> Result<image::Url, Failure>
where
    St: Storage<Upload<image::Object>, Ok = (), Err = Traced<storage::Error>>
        + Storage<
            Resolve<image::Location>,
            Ok = image::Url,
            Err = Traced<storage::Error>,
        >,
{
    storage
        .execute(Upload(image::Object {
            location: location.clone(),
            blob,
        }))
        .await
        .map_err(|e| Failure {
            error: tracerr::new!(e),
            stored: false,
        })?;
    storage
        .execute(Resolve(location))
        .await
        .map_err(|e| Failure {
            error: tracerr::new!(e),
            stored: true,
        })
}

/// Error of committing a record.
#[derive(Debug, Display, From, StdError)]
pub enum Error<Id> {
    /// Record cannot be created.
    #[display("Failed to create a record: {_0}")]
    Create(database::Error),

    /// Created record cannot be patched with its images.
    #[display("{_0}")]
    Finalize(FinalizeError<Id>),
}

/// Error of patching a created record with its uploaded images.
#[derive(Debug, Display, StdError)]
#[display(
    "Failed to attach {} uploaded images to `{owner}`: {source}",
    orphaned.len(),
)]
pub struct FinalizeError<Id> {
    /// ID of the created record.
    pub owner: Id,

    /// [`image::Location`]s of the uploaded images the record doesn't
    /// reference.
    pub orphaned: Vec<image::Location>,

    /// [`Database`] error the patch failed with.
    #[error(source)]
    pub source: Traced<database::Error>,
}
