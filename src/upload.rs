//! Upload client: the two-phase publish protocol.
//!
//! Phase 1 (**negotiate**) GETs the upload endpoint and extracts the one-time
//! destination URL from the JSON response. Phase 2 (**transmit**) encodes the
//! artifact as JPEG and POSTs a multipart/form-data body with exactly three
//! parts, in order: `appid`, `original`, `file`. The phases are a strict
//! sequential dependency chain and each runs exactly once per call — callers
//! that want resilience must wrap [`GalleryPublisher::publish`] themselves.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::{error, info};
use uuid::Uuid;

use crate::contract::{
    HttpTransport, ImagePublisher, PublishError, UploadReceipt, UploadTarget,
};

/// Fixed JPEG quality factor for the transmitted artifact (0.8).
const JPEG_QUALITY: u8 = 80;

/// Uploaded file part name, filename and content type are fixed by the wire
/// format.
const FILE_PART_NAME: &str = "file";
const FILE_PART_FILENAME: &str = "image.jpg";
const FILE_PART_CONTENT_TYPE: &str = "image/jpeg";

/// Structured multipart/form-data body builder.
///
/// Parts appear in the body in the order they are added. The boundary token
/// is generated per request and never reused.
pub struct MultipartBody {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("Boundary-{}", Uuid::new_v4()),
            buf: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a plain form field.
    pub fn text_part(&mut self, name: &str, value: &str) {
        self.append(format!("--{}\r\n", self.boundary));
        self.append(format!(
            "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
        ));
        self.append(format!("{value}\r\n"));
    }

    /// Append a file field with an explicit filename and content type.
    pub fn file_part(&mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) {
        self.append(format!("--{}\r\n", self.boundary));
        self.append(format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
        ));
        self.append(format!("Content-Type: {content_type}\r\n\r\n"));
        self.buf.extend_from_slice(bytes);
        self.append("\r\n".to_string());
    }

    /// Close the body with the terminal boundary and return the raw bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.append(format!("--{}--\r\n", self.boundary));
        self.buf
    }

    fn append(&mut self, s: String) {
        self.buf.extend_from_slice(s.as_bytes());
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Real upload client: negotiates a destination, then transmits the artifact.
pub struct GalleryPublisher<T> {
    transport: T,
    upload_endpoint: String,
    app_id: String,
}

impl<T: HttpTransport> GalleryPublisher<T> {
    pub fn new(transport: T, upload_endpoint: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            transport,
            upload_endpoint: upload_endpoint.into(),
            app_id: app_id.into(),
        }
    }

    /// Phase 1: exchange a generic upload request for a one-time destination.
    async fn negotiate(&self) -> Result<UploadTarget, PublishError> {
        info!(endpoint = %self.upload_endpoint, "Negotiating upload destination");
        let response = self
            .transport
            .get(&self.upload_endpoint)
            .await
            .map_err(|e| PublishError::NegotiationFailed(format!("endpoint unreachable: {e}")))?;
        if !response.is_success() {
            error!(status = response.status, "Upload negotiation returned error status");
            return Err(PublishError::NegotiationFailed(format!(
                "endpoint returned status {}",
                response.status
            )));
        }
        let value: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| PublishError::NegotiationFailed(format!("response is not JSON: {e}")))?;
        let destination_url = value
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                PublishError::NegotiationFailed("response lacks a \"url\" field".to_string())
            })?
            .to_string();
        info!(destination = %destination_url, "Negotiated upload destination");
        Ok(UploadTarget { destination_url })
    }

    /// Phase 2: POST the multipart payload to the negotiated destination.
    async fn transmit(
        &self,
        target: &UploadTarget,
        image: &DynamicImage,
        original_source_url: &str,
    ) -> Result<UploadReceipt, PublishError> {
        let jpeg = encode_jpeg(image)?;

        let mut body = MultipartBody::new();
        body.text_part("appid", &self.app_id);
        body.text_part("original", original_source_url);
        body.file_part(
            FILE_PART_NAME,
            FILE_PART_FILENAME,
            FILE_PART_CONTENT_TYPE,
            &jpeg,
        );
        let content_type = body.content_type();

        info!(
            destination = %target.destination_url,
            jpeg_bytes = jpeg.len(),
            "Transmitting multipart upload"
        );
        let response = self
            .transport
            .post(&target.destination_url, &content_type, body.finish())
            .await?;

        // Success is an exact 200, as the server defines it.
        if response.status == 200 {
            let receipt = UploadReceipt {
                status: response.status,
                body: response.text(),
            };
            info!(status = receipt.status, "Upload accepted");
            Ok(receipt)
        } else {
            error!(status = response.status, "Upload rejected");
            Err(PublishError::UploadRejected {
                status: response.status,
                body: response.text(),
            })
        }
    }
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, PublishError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    // JPEG has no alpha channel; flatten before encoding.
    image.to_rgb8().write_with_encoder(encoder)?;
    Ok(buf)
}

#[async_trait]
impl<T: HttpTransport> ImagePublisher for GalleryPublisher<T> {
    async fn publish(
        &self,
        image: &DynamicImage,
        original_source_url: &str,
    ) -> Result<UploadReceipt, PublishError> {
        let target = self.negotiate().await?;
        self.transmit(&target, image, original_source_url).await
    }
}
