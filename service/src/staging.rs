//! Local staging of images before they are committed to a record.

use derive_more::{AsRef, Display};
use uuid::Uuid;

use crate::domain::image;

/// URL previewing a [`StagedImage`] locally, in the `blob:<uuid>` form.
///
/// Never leaves the staging [`Store`] and is never persisted.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    /// Generates a new unique [`PreviewUrl`].
    #[must_use]
    fn generate() -> Self {
        Self(format!("blob:{}", Uuid::new_v4()))
    }
}

/// Image [`image::Blob`] staged for a commit along with its [`PreviewUrl`].
#[derive(Clone, Debug)]
pub struct StagedImage {
    /// [`PreviewUrl`] of this [`StagedImage`].
    pub preview: PreviewUrl,

    /// Contents of this [`StagedImage`].
    pub blob: image::Blob,
}

/// Ordered store of [`StagedImage`]s.
///
/// Staging order is the order images get committed in. Dropping the [`Store`]
/// discards everything staged.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// [`StagedImage`]s in staging order.
    images: Vec<StagedImage>,
}

impl Store {
    /// Creates a new empty [`Store`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages the provided [`image::Blob`] at the end of this [`Store`].
    pub fn stage(&mut self, blob: image::Blob) -> &StagedImage {
        self.images.push(StagedImage {
            preview: PreviewUrl::generate(),
            blob,
        });
        &self.images[self.images.len() - 1]
    }

    /// Removes the [`StagedImage`] previewed by the provided [`PreviewUrl`].
    ///
    /// Returns the removed [`StagedImage`], if any was staged.
    pub fn unstage(&mut self, preview: &PreviewUrl) -> Option<StagedImage> {
        let pos = self.images.iter().position(|i| &i.preview == preview)?;
        Some(self.images.remove(pos))
    }

    /// Returns [`StagedImage`]s of this [`Store`] in staging order.
    #[must_use]
    pub fn images(&self) -> &[StagedImage] {
        &self.images
    }

    /// Returns the number of [`StagedImage`]s in this [`Store`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Indicates whether this [`Store`] has nothing staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl IntoIterator for Store {
    type Item = StagedImage;
    type IntoIter = std::vec::IntoIter<StagedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

impl FromIterator<image::Blob> for Store {
    fn from_iter<I: IntoIterator<Item = image::Blob>>(iter: I) -> Self {
        let mut store = Self::new();
        for blob in iter {
            _ = store.stage(blob);
        }
        store
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::image;

    use super::{PreviewUrl, Store};

    fn blob(byte: u8) -> image::Blob {
        image::Blob {
            content_type: Some("image/png".into()),
            bytes: vec![byte],
        }
    }

    #[test]
    fn stages_in_order_with_unique_previews() {
        let mut store = Store::new();
        let first = store.stage(blob(1)).preview.clone();
        let second = store.stage(blob(2)).preview.clone();

        assert_ne!(first, second);
        assert!(first.to_string().starts_with("blob:"));
        assert_eq!(
            store.images().iter().map(|i| i.blob.bytes[0]).collect::<Vec<_>>(),
            [1, 2],
        );
    }

    #[test]
    fn unstages_only_matching_image() {
        let mut store = Store::new();
        _ = store.stage(blob(1));
        let middle = store.stage(blob(2)).preview.clone();
        _ = store.stage(blob(3));

        let removed = store.unstage(&middle).unwrap();
        assert_eq!(removed.blob.bytes, [2]);
        assert_eq!(
            store.into_iter().map(|i| i.blob.bytes[0]).collect::<Vec<_>>(),
            [1, 3],
        );
    }

    #[test]
    fn unstaging_unknown_preview_is_noop() {
        let mut store: Store = [blob(1)].into_iter().collect();

        assert!(store.unstage(&PreviewUrl::generate()).is_none());
        assert!(store.unstage(&PreviewUrl("blob:unknown".into())).is_none());
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }
}
