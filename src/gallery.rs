//! Gallery orchestrator: sequences fetch → materialize on refresh and
//! transform → publish on save.
//!
//! The orchestrator holds no algorithm of its own, only the current gallery
//! snapshot and the active edit session. The snapshot is an immutable list
//! replaced wholesale on each successful refresh: readers always observe a
//! complete, consistent gallery, and a failed refresh leaves the
//! last-known-good snapshot in place. Failures from the components propagate
//! verbatim; nothing here retries.
//!
//! User intents arrive from the presentation layer (out of scope here) as
//! plain method calls: [`GalleryOrchestrator::select`],
//! [`GalleryOrchestrator::set_overlay_text`],
//! [`GalleryOrchestrator::toggle_overlay`],
//! [`GalleryOrchestrator::apply_filter`],
//! [`GalleryOrchestrator::remove_filter`], [`GalleryOrchestrator::save`].

use image::DynamicImage;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::contract::{GalleryEntry, HttpTransport, ImagePublisher, PublishError, UploadReceipt};
use crate::download::materialize;
use crate::fetch::{fetch_gallery, FetchError};
use crate::transform::{
    apply_tone_filter, composite_overlay, FilterError, DEFAULT_TONE_INTENSITY,
};

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("no gallery entry with id {0}")]
    UnknownEntry(Uuid),
    #[error("gallery entry {0} has no decoded image and cannot be selected")]
    NotSelectable(Uuid),
    #[error("no image is open for editing")]
    NoActiveSession,
}

/// Transient state for one user interaction with one image. Created by
/// [`GalleryOrchestrator::select`], destroyed by dismiss or the next select;
/// unsaved state is discarded with it.
#[derive(Debug, Clone)]
pub struct EditSession {
    entry_id: Uuid,
    original_source_url: String,
    base_image: DynamicImage,
    filtered_image: Option<DynamicImage>,
    overlay_text: String,
    overlay_enabled: bool,
}

impl EditSession {
    fn new(entry_id: Uuid, original_source_url: String, base_image: DynamicImage) -> Self {
        Self {
            entry_id,
            original_source_url,
            base_image,
            filtered_image: None,
            overlay_text: String::new(),
            overlay_enabled: false,
        }
    }

    pub fn entry_id(&self) -> Uuid {
        self.entry_id
    }

    pub fn overlay_text(&self) -> &str {
        &self.overlay_text
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay_enabled
    }

    pub fn has_filter(&self) -> bool {
        self.filtered_image.is_some()
    }

    /// The artifact handed to the upload client, recomputed on demand:
    /// `composite_overlay(filtered ?? base, overlay_text, overlay_enabled)`.
    pub fn composed(&self) -> DynamicImage {
        let base = self.filtered_image.as_ref().unwrap_or(&self.base_image);
        composite_overlay(base, &self.overlay_text, self.overlay_enabled)
    }
}

/// Sequences the pipeline components and owns the gallery snapshot plus the
/// active [`EditSession`].
pub struct GalleryOrchestrator<T, P> {
    transport: T,
    publisher: P,
    gallery_endpoint: String,
    snapshot: Vec<GalleryEntry>,
    session: Option<EditSession>,
}

impl<T, P> GalleryOrchestrator<T, P>
where
    T: HttpTransport,
    P: ImagePublisher,
{
    pub fn new(transport: T, publisher: P, gallery_endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            publisher,
            gallery_endpoint: gallery_endpoint.into(),
            snapshot: Vec::new(),
            session: None,
        }
    }

    /// Fetch metadata, materialize assets, and replace the snapshot
    /// wholesale. On error the previous snapshot survives untouched.
    pub async fn refresh(&mut self) -> Result<(), GalleryError> {
        info!(endpoint = %self.gallery_endpoint, "Refreshing gallery");
        let descriptors = fetch_gallery(&self.transport, &self.gallery_endpoint).await?;
        let entries = materialize(&self.transport, descriptors).await;
        info!(
            total = entries.len(),
            selectable = entries.iter().filter(|e| e.is_selectable()).count(),
            "Installed new gallery snapshot"
        );
        self.snapshot = entries;
        self.session = None;
        Ok(())
    }

    /// The current snapshot, in server order, unavailable entries included.
    pub fn entries(&self) -> &[GalleryEntry] {
        &self.snapshot
    }

    /// Entries the presentation layer may offer for selection.
    pub fn selectable_entries(&self) -> impl Iterator<Item = &GalleryEntry> {
        self.snapshot.iter().filter(|e| e.is_selectable())
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Open an entry for editing. Replaces any active session, discarding its
    /// unsaved state. Entries without a decoded bitmap cannot be selected.
    pub fn select(&mut self, entry_id: Uuid) -> Result<(), GalleryError> {
        let entry = self
            .snapshot
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or(GalleryError::UnknownEntry(entry_id))?;
        let image = entry
            .bitmap
            .image()
            .ok_or(GalleryError::NotSelectable(entry_id))?;
        info!(entry_id = %entry_id, url = %entry.descriptor.source_url, "Opened edit session");
        self.session = Some(EditSession::new(
            entry_id,
            entry.descriptor.source_url.clone(),
            image.clone(),
        ));
        Ok(())
    }

    /// Close the editor, discarding unsaved state.
    pub fn dismiss(&mut self) {
        self.session = None;
    }

    pub fn set_overlay_text(&mut self, text: impl Into<String>) -> Result<(), GalleryError> {
        let session = self.session.as_mut().ok_or(GalleryError::NoActiveSession)?;
        session.overlay_text = text.into();
        Ok(())
    }

    pub fn toggle_overlay(&mut self, enabled: bool) -> Result<(), GalleryError> {
        let session = self.session.as_mut().ok_or(GalleryError::NoActiveSession)?;
        session.overlay_enabled = enabled;
        Ok(())
    }

    /// Apply the tone filter at the editor's fixed intensity.
    pub fn apply_filter(&mut self) -> Result<(), GalleryError> {
        let session = self.session.as_mut().ok_or(GalleryError::NoActiveSession)?;
        session.filtered_image = Some(apply_tone_filter(
            &session.base_image,
            DEFAULT_TONE_INTENSITY,
        )?);
        Ok(())
    }

    pub fn remove_filter(&mut self) -> Result<(), GalleryError> {
        let session = self.session.as_mut().ok_or(GalleryError::NoActiveSession)?;
        session.filtered_image = None;
        Ok(())
    }

    /// Compose the artifact from the active session and publish it. The
    /// result, success or failure, is reported upstream verbatim; there is no
    /// automatic retry and the session stays open either way.
    pub async fn save(&mut self) -> Result<UploadReceipt, GalleryError> {
        let session = self.session.as_ref().ok_or(GalleryError::NoActiveSession)?;
        let artifact = session.composed();
        info!(entry_id = %session.entry_id, "Publishing edited image");
        let receipt = self
            .publisher
            .publish(&artifact, &session.original_source_url)
            .await;
        match &receipt {
            Ok(r) => info!(status = r.status, "Publish succeeded"),
            Err(e) => error!(error = %e, "Publish failed"),
        }
        Ok(receipt?)
    }
}
