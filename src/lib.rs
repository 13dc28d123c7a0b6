#![doc = "gallery-sync: client-side pipeline for synchronising and republishing a remote image gallery."]

//! The pipeline runs in two legs. On startup (or refresh) the metadata
//! fetcher retrieves the gallery index and the asset downloader materializes
//! it into decoded entries. On a user save the transform engine composes the
//! edited artifact and the upload client publishes it through a two-phase
//! handshake (negotiate a one-time destination, then transmit a multipart
//! payload).
//!
//! Presentation is an external collaborator: it feeds user intents into
//! [`gallery::GalleryOrchestrator`] and renders what comes back.

pub mod cli;
pub mod config;
pub mod contract;
pub mod download;
pub mod fetch;
pub mod gallery;
pub mod load_config;
pub mod transform;
pub mod transport;
pub mod upload;
