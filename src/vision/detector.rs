//! Face detection via a sidecar service
//!
//! The detection model itself is an external collaborator: the kiosk posts
//! a JPEG and receives face locations plus embeddings. The trait seam lets
//! tests substitute a scripted detector.

use async_trait::async_trait;
use image::RgbImage;
use serde::Deserialize;

use crate::vision::{Detection, FaceBox, encode_jpeg};
use crate::{Error, Result};

/// Detects faces in an image, returning locations and embeddings
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in `image`
    ///
    /// Locations are in the coordinates of `image`. An image with no faces
    /// yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the detection backend fails
    async fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>>;
}

/// Wire format of the detection sidecar response
#[derive(Deserialize)]
struct DetectResponse {
    faces: Vec<DetectedFace>,
}

#[derive(Deserialize)]
struct DetectedFace {
    #[serde(rename = "box")]
    location: FaceBox,
    embedding: Vec<f32>,
}

/// Face detector backed by an HTTP sidecar service
pub struct HttpFaceDetector {
    client: reqwest::Client,
    url: String,
}

impl HttpFaceDetector {
    /// Create a detector client for the given sidecar URL
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(Error::Config("detector URL required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url,
        })
    }
}

#[async_trait]
impl FaceDetector for HttpFaceDetector {
    async fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let jpeg = encode_jpeg(image)?;
        tracing::trace!(bytes = jpeg.len(), "sending frame to detector");

        let form = reqwest::multipart::Form::new().part(
            "image",
            reqwest::multipart::Part::bytes(jpeg)
                .file_name("frame.jpg")
                .mime_str("image/jpeg")
                .map_err(|e| Error::Detector(e.to_string()))?,
        );

        let response = self.client.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Detector(format!(
                "detection service error {status}: {body}"
            )));
        }

        let body = response.bytes().await?;
        let parsed: DetectResponse = serde_json::from_slice(&body)?;

        let detections: Vec<Detection> = parsed
            .faces
            .into_iter()
            .map(|f| Detection {
                location: f.location,
                embedding: f.embedding,
            })
            .collect();

        tracing::debug!(faces = detections.len(), "detection complete");
        Ok(detections)
    }
}
