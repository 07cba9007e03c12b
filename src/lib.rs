//! Foyer - face-recognition welcome kiosk
//!
//! This library provides the core functionality for the foyer kiosk:
//! - Gallery of known identities (name → facial embedding)
//! - Cooldown-gated greeting dispatch
//! - FIFO speech queue with a single playback worker
//! - Trait seams for the external collaborators (camera, face detector,
//!   display surface, speech synthesis)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Collaborators                       │
//! │  Camera  │  Face detector  │  Display  │  TTS       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Foyer Kiosk                          │
//! │  Detection loop │ Gallery │ Cooldown │ Greeting     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ FIFO speech jobs
//! ┌────────────────────▼────────────────────────────────┐
//! │       Speech worker (synthesize → play → clean)      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod cooldown;
pub mod error;
pub mod gallery;
pub mod greeting;
pub mod kiosk;
pub mod speech;
pub mod vision;

pub use config::Config;
pub use cooldown::CooldownTracker;
pub use error::{Error, Result};
pub use gallery::{GUEST, Gallery};
pub use greeting::greetings_for;
pub use kiosk::Kiosk;
pub use speech::{
    AudioPlayback, AudioSink, GoogleTranslateTts, SpeechDispatcher, SpeechJob, Synthesizer,
};
pub use vision::{
    Annotation, Detection, FaceBox, FaceDetector, FrameSource, HttpFaceDetector, PreviewSurface,
    SnapshotCamera, Surface,
};
