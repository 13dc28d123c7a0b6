use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Gallery metadata endpoint used when the config file does not override it.
pub const DEFAULT_GALLERY_ENDPOINT: &str = "https://eulerity-hackathon.appspot.com/image";

/// Upload negotiation endpoint used when the config file does not override it.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://eulerity-hackathon.appspot.com/upload";

/// Static configuration as it appears in the YAML file. The application
/// identifier may instead come from the environment; see
/// [`crate::load_config::load_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_gallery_endpoint")]
    pub gallery_endpoint: String,
    #[serde(default = "default_upload_endpoint")]
    pub upload_endpoint: String,
    #[serde(default)]
    pub app_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gallery_endpoint: DEFAULT_GALLERY_ENDPOINT.to_string(),
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            app_id: None,
        }
    }
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            gallery_endpoint = %self.gallery_endpoint,
            upload_endpoint = %self.upload_endpoint,
            app_id_set = self.app_id.is_some(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

fn default_gallery_endpoint() -> String {
    DEFAULT_GALLERY_ENDPOINT.to_string()
}

fn default_upload_endpoint() -> String {
    DEFAULT_UPLOAD_ENDPOINT.to_string()
}
