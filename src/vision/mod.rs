//! Vision collaborators
//!
//! Frame capture, face detection, and the display surface are external
//! collaborators reached through trait seams. Concrete implementations
//! talk HTTP (camera snapshot endpoint, detection sidecar) and write an
//! annotated preview frame.

mod camera;
mod detector;
mod surface;
mod types;

pub use camera::{FrameSource, SnapshotCamera};
pub use detector::{FaceDetector, HttpFaceDetector};
pub use surface::{Annotation, PreviewSurface, Surface};
pub use types::{Detection, FaceBox, encode_jpeg};
