//! # contract: shared data model and trait seams for the gallery pipeline
//!
//! This module defines the wire-facing data types (descriptors, gallery
//! entries, upload targets/receipts) and the two traits the pipeline is built
//! against:
//!
//! - [`HttpTransport`] — the raw HTTP seam. The metadata fetcher, the asset
//!   downloader and the upload client all talk to the network through it, so
//!   every network interaction is mockable in tests.
//! - [`ImagePublisher`] — the two-phase publish seam the orchestrator calls on
//!   a user save, implemented by the real client in [`crate::upload`] and by
//!   mocks in tests.
//!
//! ## Mocking & Testing
//! Both traits are annotated for `mockall`; the generated `MockHttpTransport`
//! and `MockImagePublisher` are exported behind the `test-export-mocks`
//! feature (on by default) so integration tests in `tests/` can use them.
//!
//! ## Error Types
//! Only the errors that cross a trait seam live here ([`TransportError`],
//! [`PublishError`]). Component-local errors (fetch, filter) live next to
//! their component.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use image::DynamicImage;
use mockall::{automock, predicate::*};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use uuid::Uuid;

/// Fixed-locale timestamp format used by the gallery metadata endpoint,
/// e.g. `"Jun 11, 2023 3:04:05 PM"`. Not ISO-8601.
pub const GALLERY_TIMESTAMP_FORMAT: &str = "%b %d, %Y %I:%M:%S %p";

fn gallery_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, GALLERY_TIMESTAMP_FORMAT).map_err(|e| {
        serde::de::Error::custom(format!("timestamp {raw:?} does not match gallery format: {e}"))
    })
}

/// Metadata record describing one remote image, prior to byte-level download.
/// Immutable once parsed. Wire fields are `url`, `created` and `updated`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageDescriptor {
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "created", deserialize_with = "gallery_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "updated", deserialize_with = "gallery_timestamp")]
    pub updated_at: NaiveDateTime,
}

/// Download outcome for one gallery entry.
///
/// `Unavailable` is terminal for the session: a failed download is never
/// retried, the entry simply stops being selectable.
#[derive(Debug, Clone)]
pub enum BitmapState {
    /// Download not attempted yet.
    Pending,
    /// Decoded image bytes, ready for display and editing.
    Available(DynamicImage),
    /// Download or decode failed; entry is excluded from the visible gallery.
    Unavailable,
}

impl BitmapState {
    pub fn is_available(&self) -> bool {
        matches!(self, BitmapState::Available(_))
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        match self {
            BitmapState::Available(img) => Some(img),
            _ => None,
        }
    }
}

/// A descriptor combined with its (possibly absent) decoded bitmap.
///
/// Identity is assigned locally since the server provides none; it is stable
/// for the lifetime of the in-memory list and has no meaning across fetches.
#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub id: Uuid,
    pub descriptor: ImageDescriptor,
    pub bitmap: BitmapState,
}

impl GalleryEntry {
    pub fn new(descriptor: ImageDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            descriptor,
            bitmap: BitmapState::Pending,
        }
    }

    /// An entry with no decoded bitmap must never be rendered as selectable.
    pub fn is_selectable(&self) -> bool {
        self.bitmap.is_available()
    }
}

/// One-time write destination obtained from the negotiate phase.
/// Created and consumed within a single publish call; never cached or reused.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub destination_url: String,
}

/// Outcome of a successful publish: the server's 200 response body, verbatim,
/// for the caller to report upstream.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

/// A raw HTTP exchange result. Status is carried rather than mapped to an
/// error so each consumer can apply its own policy to non-2xx responses.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response body as text, lossily decoded, for diagnostics.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failure at the raw transport level: connect, timeout, or body read.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Failure of a publish attempt. One attempt per call: no retry, no backoff.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Negotiate phase failed: endpoint unreachable, non-2xx, bad JSON, or a
    /// response object without a `url` field.
    #[error("upload negotiation failed: {0}")]
    NegotiationFailed(String),
    /// Transmit phase reached the server but was not answered with 200.
    /// Carries the response body as diagnostic text.
    #[error("upload rejected with status {status}: {body}")]
    UploadRejected { status: u16, body: String },
    /// Transmit phase never reached the server.
    #[error("upload transport failed: {0}")]
    TransportFailed(#[from] TransportError),
    /// The artifact could not be encoded as JPEG.
    #[error("jpeg encoding failed: {0}")]
    Encoding(#[from] image::ImageError),
}

/// Raw HTTP seam shared by all networked components.
///
/// Implemented by the reqwest-backed transport in [`crate::transport`] and by
/// generated mocks in tests. Non-2xx statuses are returned as responses, not
/// errors; only transport-level failures produce [`TransportError`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET and return the full response body.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// Issue a POST with the given `Content-Type` header and body.
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Two-phase publish seam used by the orchestrator on a user save.
///
/// The application identifier and upload endpoint are implementation state;
/// callers supply only the artifact and the original source URL (empty string
/// if none).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ImagePublisher: Send + Sync {
    async fn publish(
        &self,
        image: &DynamicImage,
        original_source_url: &str,
    ) -> Result<UploadReceipt, PublishError>;
}
