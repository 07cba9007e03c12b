//! The kiosk daemon - detection loop and greeting dispatch
//!
//! Owns the gallery, cooldown tracker, and speech dispatcher as explicit
//! state. Reads frames, runs detection on a subsample of them, resolves
//! identities, and enqueues cooldown-gated greetings. Speech never blocks
//! this loop.

use std::time::{Duration, Instant};

use image::RgbImage;
use tokio::sync::mpsc;

use crate::vision::{Annotation, FaceDetector, FrameSource, Surface};
use crate::{Config, CooldownTracker, Gallery, Result, SpeechDispatcher, greetings_for};

/// How long shutdown waits for queued greetings to finish playing
const DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

/// The foyer kiosk daemon
pub struct Kiosk {
    config: Config,
    gallery: Gallery,
    cooldown: CooldownTracker,
    dispatcher: SpeechDispatcher,
}

impl Kiosk {
    /// Create a kiosk from its constructed parts
    #[must_use]
    pub fn new(config: Config, gallery: Gallery, dispatcher: SpeechDispatcher) -> Self {
        let cooldown = CooldownTracker::new(config.cooldown_window());
        Self {
            config,
            gallery,
            cooldown,
            dispatcher,
        }
    }

    /// Run until the quit key, an interrupt, or a terminal source error
    ///
    /// On exit the shutdown sentinel is enqueued first, then the capture
    /// source and surface are released, and finally the speech worker is
    /// given time to drain.
    ///
    /// # Errors
    ///
    /// Returns error if the frame source fails terminally or the surface
    /// can no longer render
    pub async fn run<S, D, F>(
        mut self,
        mut source: S,
        detector: &D,
        mut surface: F,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<()>
    where
        S: FrameSource,
        D: FaceDetector,
        F: Surface,
    {
        tracing::info!(
            gallery = self.gallery.len(),
            cooldown_secs = self.config.cooldown_secs,
            "kiosk running, press q to exit"
        );

        let stride = self.config.frame_stride.max(1);
        let mut frame_count: u64 = 0;

        loop {
            let frame = tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                frame = source.next_frame() => frame?,
            };

            // Empty read: transient, retry next iteration
            let Some(frame) = frame else { continue };

            frame_count += 1;
            if frame_count % stride != 0 {
                surface.present(&frame, &[])?;
                if surface.quit_requested() {
                    break;
                }
                continue;
            }

            let annotations = self.process_frame(&frame, detector).await;
            surface.present(&frame, &annotations)?;
            if surface.quit_requested() {
                break;
            }
        }

        // Sentinel first, then release capture and display, then wait for
        // the queue to drain. The worker stays detached if it overruns.
        self.dispatcher.request_stop();
        drop(source);
        drop(surface);
        let drained = self.dispatcher.join(DRAIN_TIMEOUT);
        tracing::info!(drained, "kiosk stopped");

        Ok(())
    }

    /// Detect faces on a sampled frame, dispatch greetings, and return the
    /// full-resolution annotations
    async fn process_frame<D: FaceDetector>(
        &mut self,
        frame: &RgbImage,
        detector: &D,
    ) -> Vec<Annotation> {
        let downscale = self.config.detect_downscale.max(1);
        let small = downscaled(frame, downscale);

        let detections = match detector.detect(&small).await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "detection failed, skipping frame");
                return Vec::new();
            }
        };

        let now = Instant::now();
        let mut annotations = Vec::with_capacity(detections.len());

        for detection in detections {
            let name = self
                .gallery
                .resolve(&detection.embedding, self.config.match_tolerance);

            if self.cooldown.try_greet(name, now) {
                tracing::info!(identity = %name, "greeting dispatched");
                for job in greetings_for(name) {
                    self.dispatcher.enqueue(job);
                }
            }

            annotations.push(Annotation {
                location: detection.location.scale(downscale),
                label: name.to_uppercase(),
            });
        }

        annotations
    }
}

/// Downscale a frame by an integer divisor before detection
fn downscaled(frame: &RgbImage, divisor: u32) -> RgbImage {
    if divisor <= 1 {
        return frame.clone();
    }
    let width = (frame.width() / divisor).max(1);
    let height = (frame.height() / divisor).max(1);
    image::imageops::resize(frame, width, height, image::imageops::FilterType::Triangle)
}
