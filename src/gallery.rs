//! Gallery of known identities
//!
//! Built once at startup from a directory of labeled images, then read-only.
//! Each entry pairs a derived name (lowercased file stem) with the reference
//! embedding extracted from that image.

use std::path::Path;

use crate::vision::FaceDetector;
use crate::{Error, Result};

/// Identity returned when no gallery entry matches
pub const GUEST: &str = "guest";

/// Known identity names and their reference embeddings, in insertion order
#[derive(Debug, Default)]
pub struct Gallery {
    names: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl Gallery {
    /// Create an empty gallery
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity
    ///
    /// Duplicate names are permitted; resolution picks whichever entry
    /// matches first in insertion order.
    pub fn register(&mut self, name: impl Into<String>, embedding: Vec<f32>) {
        self.names.push(name.into());
        self.embeddings.push(embedding);
    }

    /// Load a gallery from a directory of `.jpg` / `.png` reference images
    ///
    /// Each image is run through the detector; the first embedding found is
    /// registered under the file's lowercased stem. Images that fail to
    /// decode or yield no face are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be read
    pub async fn load(dir: &Path, detector: &dyn FaceDetector) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::Gallery(format!("cannot read known-faces dir {}: {e}", dir.display()))
        })?;

        let mut gallery = Self::new();

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !is_reference_image(&path) {
                continue;
            }

            let Some(name) = derived_name(&path) else {
                continue;
            };

            let image = match image::open(&path) {
                Ok(img) => img.to_rgb8(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable image");
                    continue;
                }
            };

            match detector.detect(&image).await {
                Ok(detections) => match detections.into_iter().next() {
                    Some(detection) => {
                        tracing::info!(name = %name, "gallery entry loaded");
                        gallery.register(name, detection.embedding);
                    }
                    None => {
                        tracing::info!(path = %path.display(), "no face found, skipping");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "detection failed, skipping");
                }
            }
        }

        tracing::info!(entries = gallery.len(), "gallery ready");
        Ok(gallery)
    }

    /// Resolve a query embedding to an identity
    ///
    /// Returns the name of the first entry (in insertion order) whose
    /// distance to the query is within `tolerance`, or [`GUEST`] if none
    /// match. First-match-wins, not closest-match: with two entries both
    /// within tolerance, insertion order decides.
    #[must_use]
    pub fn resolve(&self, query: &[f32], tolerance: f32) -> &str {
        for (name, reference) in self.names.iter().zip(&self.embeddings) {
            if euclidean_distance(reference, query) <= tolerance {
                return name;
            }
        }
        GUEST
    }

    /// Registered names in insertion order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of registered identities
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no identities are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Euclidean distance between two embeddings
///
/// Mismatched dimensions never match (infinite distance).
#[must_use]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// True for the supported reference image extensions
fn is_reference_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "png"))
}

/// Lowercased file stem used as the identity name
fn derived_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn distance_of_identical_embeddings_is_zero() {
        let e = vec![0.3, -0.1, 0.8];
        assert!(euclidean_distance(&e, &e) < f32::EPSILON);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_dimensions_never_match() {
        let a = vec![0.0, 0.0];
        let b = vec![0.0, 0.0, 0.0];
        assert!(euclidean_distance(&a, &b).is_infinite());
    }

    #[test]
    fn resolve_returns_guest_when_nothing_matches() {
        let mut gallery = Gallery::new();
        gallery.register("yash", vec![1.0, 0.0, 0.0]);

        assert_eq!(gallery.resolve(&[0.0, 1.0, 0.0], 0.45), GUEST);
    }

    #[test]
    fn resolve_matches_within_tolerance() {
        let mut gallery = Gallery::new();
        gallery.register("yash", vec![1.0, 0.0, 0.0]);

        assert_eq!(gallery.resolve(&[1.0, 0.1, 0.0], 0.45), "yash");
    }

    #[test]
    fn first_match_wins_over_closer_later_entry() {
        let mut gallery = Gallery::new();
        // both entries are within tolerance; the second is strictly closer
        gallery.register("first", vec![0.2, 0.0]);
        gallery.register("second", vec![0.05, 0.0]);

        assert_eq!(gallery.resolve(&[0.0, 0.0], 0.45), "first");
    }

    #[test]
    fn duplicate_names_resolve_by_gallery_order() {
        let mut gallery = Gallery::new();
        gallery.register("twin", vec![5.0, 5.0]);
        gallery.register("twin", vec![0.0, 0.0]);

        // only the second is close, and duplicates are fine
        assert_eq!(gallery.resolve(&[0.0, 0.0], 0.45), "twin");
        assert_eq!(gallery.len(), 2);
    }

    #[test]
    fn reference_image_extensions() {
        assert!(is_reference_image(&PathBuf::from("faces/Yash.JPG")));
        assert!(is_reference_image(&PathBuf::from("faces/guest.png")));
        assert!(!is_reference_image(&PathBuf::from("faces/notes.txt")));
        assert!(!is_reference_image(&PathBuf::from("faces/noext")));
    }

    #[test]
    fn derived_name_is_lowercased_stem() {
        assert_eq!(
            derived_name(&PathBuf::from("faces/Sanjay Malpani Sir.jpg")),
            Some("sanjay malpani sir".to_string())
        );
    }
}
