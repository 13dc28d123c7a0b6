//! Metadata fetcher: retrieves the gallery index from the remote endpoint.
//!
//! One GET per call, no retry. The body must be a JSON array of
//! `{url, created, updated}` objects; any malformed entry fails the whole
//! fetch, since there is no per-entry error isolation at this stage.

use thiserror::Error;
use tracing::{error, info};

use crate::contract::{HttpTransport, ImageDescriptor, TransportError};

/// Failure of a whole-gallery metadata fetch. Fatal to gallery population;
/// the orchestrator surfaces it while keeping the last-known-good snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("gallery endpoint unreachable: {0}")]
    Http(#[from] TransportError),
    #[error("gallery endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("gallery response is not a well-formed descriptor array: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

/// Fetch the gallery index. Each call performs a fresh round-trip; descriptors
/// are returned in the order the server listed them.
pub async fn fetch_gallery<T>(
    transport: &T,
    endpoint: &str,
) -> Result<Vec<ImageDescriptor>, FetchError>
where
    T: HttpTransport + ?Sized,
{
    info!(endpoint = %endpoint, "Fetching gallery metadata");
    let response = transport.get(endpoint).await?;
    if !response.is_success() {
        error!(endpoint = %endpoint, status = response.status, "Gallery endpoint returned error status");
        return Err(FetchError::Status {
            status: response.status,
            body: response.text(),
        });
    }
    let descriptors: Vec<ImageDescriptor> = serde_json::from_slice(&response.body)?;
    info!(count = descriptors.len(), "Fetched gallery metadata");
    Ok(descriptors)
}
