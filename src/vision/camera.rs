//! Frame capture from an HTTP snapshot camera

use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;

use crate::{Error, Result};

/// Produces a continuous sequence of frames
#[async_trait]
pub trait FrameSource: Send {
    /// Read the next frame
    ///
    /// `Ok(None)` is a transient empty read; the caller retries on the next
    /// iteration. `Err` is terminal.
    ///
    /// # Errors
    ///
    /// Returns error only when the source is permanently unusable
    async fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Frame source polling an HTTP snapshot endpoint (IP camera style)
pub struct SnapshotCamera {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl SnapshotCamera {
    /// Create a snapshot camera client
    ///
    /// `interval` paces the polling so a fast loop does not hammer the
    /// camera.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty
    pub fn new(url: impl Into<String>, interval: Duration) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(Error::Config("camera URL required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url,
            interval,
        })
    }

    async fn fetch(&self) -> Result<RgbImage> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Camera(format!("snapshot error {status}")));
        }

        let body = response.bytes().await?;
        let image = image::load_from_memory(&body)?;
        Ok(image.to_rgb8())
    }
}

#[async_trait]
impl FrameSource for SnapshotCamera {
    async fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        tokio::time::sleep(self.interval).await;

        // Fetch and decode failures are transient empty reads: the camera
        // may be rebooting or mid-exposure. The loop retries next tick.
        match self.fetch().await {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                tracing::warn!(error = %e, "frame read failed, retrying");
                Ok(None)
            }
        }
    }
}
