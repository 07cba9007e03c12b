//! Speech pipeline
//!
//! A single worker thread consumes speech jobs in FIFO order: synthesize
//! text to MP3, play it to completion, clean up the scratch file, take the
//! next job. The detection loop never blocks on playback.

mod dispatch;
mod playback;
mod synth;

pub use dispatch::{SpeechDispatcher, SpeechJob};
pub use playback::{AudioPlayback, AudioSink};
pub use synth::{GoogleTranslateTts, Synthesizer};
