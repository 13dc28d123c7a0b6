//! Asset downloader: resolves descriptors into decoded gallery entries.
//!
//! Per-descriptor fetches are independent and run concurrently, but results
//! are joined positionally so output order always matches input order. A
//! failed download or decode is absorbed into [`BitmapState::Unavailable`]
//! for that entry alone; it never fails the operation and is never retried.

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::contract::{BitmapState, GalleryEntry, HttpTransport, ImageDescriptor, TransportError};

#[derive(Debug, Error)]
enum AssetError {
    #[error("asset unreachable: {0}")]
    Transport(#[from] TransportError),
    #[error("asset endpoint returned status {0}")]
    Status(u16),
    #[error("asset bytes are not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Materialize every descriptor into a [`GalleryEntry`], preserving input
/// order and length. Entries whose asset could not be fetched or decoded come
/// back `Unavailable` rather than erroring the whole gallery.
pub async fn materialize<T>(transport: &T, descriptors: Vec<ImageDescriptor>) -> Vec<GalleryEntry>
where
    T: HttpTransport + ?Sized,
{
    // join_all yields results in the order the futures were created, which
    // gives the positional join regardless of per-item completion time.
    let fetches = descriptors
        .into_iter()
        .map(|descriptor| materialize_one(transport, descriptor));
    join_all(fetches).await
}

async fn materialize_one<T>(transport: &T, descriptor: ImageDescriptor) -> GalleryEntry
where
    T: HttpTransport + ?Sized,
{
    let mut entry = GalleryEntry::new(descriptor);
    match fetch_and_decode(transport, &entry.descriptor.source_url).await {
        Ok(img) => {
            debug!(
                url = %entry.descriptor.source_url,
                width = img.width(),
                height = img.height(),
                "Decoded gallery asset"
            );
            entry.bitmap = BitmapState::Available(img);
        }
        Err(e) => {
            // Deliberately absorbed: the entry is omitted from the visible
            // gallery for the rest of the session.
            warn!(url = %entry.descriptor.source_url, error = %e, "Gallery asset unavailable");
            entry.bitmap = BitmapState::Unavailable;
        }
    }
    entry
}

async fn fetch_and_decode<T>(transport: &T, url: &str) -> Result<image::DynamicImage, AssetError>
where
    T: HttpTransport + ?Sized,
{
    let response = transport.get(url).await?;
    if !response.is_success() {
        return Err(AssetError::Status(response.status));
    }
    // Format is inferred from the bytes, not from any response header.
    let img = image::load_from_memory(&response.body)?;
    Ok(img)
}
