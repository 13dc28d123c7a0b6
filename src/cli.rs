//! CLI surface: a scripted driver for the pipeline, standing in for the
//! out-of-scope presentation layer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::contract::BitmapState;
use crate::gallery::GalleryOrchestrator;
use crate::load_config::{load_config, resolve, ResolvedConfig};
use crate::transform::{apply_tone_filter, composite_overlay, DEFAULT_TONE_INTENSITY};
use crate::transport::ReqwestTransport;
use crate::upload::GalleryPublisher;

/// CLI for gallery-sync: fetch a remote image gallery, edit, and publish.
#[derive(Parser)]
#[clap(
    name = "gallery-sync",
    version,
    about = "Synchronise a remote image gallery and publish edited images"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the gallery index, download every image, and list the entries
    Sync {
        /// Path to the YAML config file (defaults apply when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Edit a local image (tone filter and/or text overlay) and publish it
    Publish {
        /// Path to the YAML config file (defaults apply when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
        /// Image file to edit and upload
        #[clap(long)]
        image: PathBuf,
        /// Remote URL of the original image, recorded with the upload
        #[clap(long, default_value = "")]
        original: String,
        /// Overlay text to composite onto the image
        #[clap(long)]
        overlay: Option<String>,
        /// Apply the sepia tone filter before uploading
        #[clap(long)]
        filter: bool,
    },
}

fn resolved(config: Option<PathBuf>) -> Result<ResolvedConfig> {
    match config {
        Some(path) => load_config(path),
        None => resolve(Config::default()),
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync { config } => {
            let config = resolved(config)?;
            let transport = ReqwestTransport::new().context("failed to build HTTP client")?;
            let publisher = GalleryPublisher::new(
                ReqwestTransport::new().context("failed to build HTTP client")?,
                config.upload_endpoint,
                config.app_id,
            );
            let mut orchestrator =
                GalleryOrchestrator::new(transport, publisher, config.gallery_endpoint);
            orchestrator.refresh().await?;

            println!("Gallery synchronised: {} entries", orchestrator.entries().len());
            for entry in orchestrator.entries() {
                let state = match &entry.bitmap {
                    BitmapState::Available(img) => {
                        format!("{}x{}", img.width(), img.height())
                    }
                    BitmapState::Unavailable => "unavailable".to_string(),
                    BitmapState::Pending => "pending".to_string(),
                };
                println!(
                    "  {}  {}  created {}  [{}]",
                    entry.id,
                    entry.descriptor.source_url,
                    entry.descriptor.created_at,
                    state
                );
            }
            Ok(())
        }
        Commands::Publish {
            config,
            image,
            original,
            overlay,
            filter,
        } => {
            let config = resolved(config)?;
            let img = image::open(&image)
                .with_context(|| format!("failed to open image {}", image.display()))?;

            let edited = if filter {
                apply_tone_filter(&img, DEFAULT_TONE_INTENSITY)?
            } else {
                img
            };
            let overlay_text = overlay.unwrap_or_default();
            let artifact = composite_overlay(&edited, &overlay_text, !overlay_text.is_empty());

            let publisher = GalleryPublisher::new(
                ReqwestTransport::new().context("failed to build HTTP client")?,
                config.upload_endpoint,
                config.app_id,
            );
            use crate::contract::ImagePublisher;
            let receipt = publisher.publish(&artifact, &original).await?;
            println!("Upload accepted ({}): {}", receipt.status, receipt.body);
            Ok(())
        }
    }
}
