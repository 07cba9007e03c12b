//! Display surface for annotated frames
//!
//! The kiosk display is an external collaborator. The bundled
//! [`PreviewSurface`] draws face boxes into the frame, writes a JPEG
//! preview atomically (so a viewer never sees a torn file), and watches
//! stdin for the `q` quit key.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::{Rgb, RgbImage};

use crate::vision::{FaceBox, encode_jpeg};
use crate::{Error, Result};

/// Box border color (green, as the original display drew)
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Box border thickness in pixels
const BOX_THICKNESS: u32 = 2;

/// A face box plus its identity label, in full-frame coordinates
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Where to draw the box
    pub location: FaceBox,
    /// Label shown with the box (already uppercased by the caller)
    pub label: String,
}

/// Renders frames and reports quit requests
pub trait Surface: Send {
    /// Present a frame with its annotations
    ///
    /// # Errors
    ///
    /// Returns error if the surface can no longer render
    fn present(&mut self, frame: &RgbImage, annotations: &[Annotation]) -> Result<()>;

    /// True once the operator has requested exit (`q` / `Q`)
    fn quit_requested(&mut self) -> bool;
}

/// Surface writing annotated JPEG previews to a file
pub struct PreviewSurface {
    path: PathBuf,
    quit: Arc<AtomicBool>,
}

impl PreviewSurface {
    /// Create a preview surface writing to `path`
    ///
    /// Spawns a detached thread watching stdin for the quit key.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let quit = Arc::new(AtomicBool::new(false));
        spawn_key_watcher(Arc::clone(&quit));
        Self { path, quit }
    }
}

impl Surface for PreviewSurface {
    fn present(&mut self, frame: &RgbImage, annotations: &[Annotation]) -> Result<()> {
        let mut canvas = frame.clone();
        for annotation in annotations {
            draw_box(&mut canvas, annotation.location);
            tracing::debug!(label = %annotation.label, "annotated face");
        }

        let jpeg = encode_jpeg(&canvas)?;

        // Write-then-rename so the preview file is always a complete JPEG
        let tmp = self.path.with_extension("jpg.tmp");
        std::fs::write(&tmp, &jpeg)?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Display(format!("preview rename failed: {e}")))?;

        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

/// Watch stdin for a line starting with `q` or `Q`
fn spawn_key_watcher(quit: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("q") {
                quit.store(true, Ordering::Relaxed);
                break;
            }
        }
    });
}

/// Draw a rectangle outline onto the frame, clamped to its bounds
pub fn draw_box(frame: &mut RgbImage, location: FaceBox) {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return;
    }

    let top = location.top.min(height - 1);
    let bottom = location.bottom.min(height - 1);
    let left = location.left.min(width - 1);
    let right = location.right.min(width - 1);

    for t in 0..BOX_THICKNESS {
        // horizontal edges
        for x in left..=right {
            frame.put_pixel(x, (top + t).min(height - 1), BOX_COLOR);
            frame.put_pixel(x, bottom.saturating_sub(t), BOX_COLOR);
        }
        // vertical edges
        for y in top..=bottom {
            frame.put_pixel((left + t).min(width - 1), y, BOX_COLOR);
            frame.put_pixel(right.saturating_sub(t), y, BOX_COLOR);
        }
    }
}
