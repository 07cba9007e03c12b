//! Speech dispatch queue
//!
//! Producers enqueue jobs from the detection loop; exactly one worker
//! thread dequeues, renders, and plays them in submission order. A
//! distinguished stop item is the queue's shutdown sentinel: the worker
//! drains everything enqueued before it, then exits. One bad job is logged
//! and discarded, never stopping the queue.

use std::io::Write;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::speech::{AudioSink, Synthesizer};
use crate::{Error, Result};

/// One utterance to render and play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechJob {
    /// Text to speak
    pub text: String,
    /// Language tag (e.g. "mr", "en")
    pub lang: String,
}

impl SpeechJob {
    /// Create a speech job
    #[must_use]
    pub fn new(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
        }
    }
}

/// Queue items: a job to speak, or the shutdown sentinel
enum QueueItem {
    Speak(SpeechJob),
    Stop,
}

/// Handle to the speech queue and its worker thread
pub struct SpeechDispatcher {
    tx: mpsc::Sender<QueueItem>,
    done_rx: mpsc::Receiver<()>,
    worker: Option<JoinHandle<()>>,
    stop_sent: bool,
}

impl SpeechDispatcher {
    /// Spawn the worker thread
    ///
    /// The worker owns the synthesizer and the playback sink for its whole
    /// lifetime; the playback device is released when the worker exits.
    pub fn spawn<S, P>(synth: S, sink: P) -> Self
    where
        S: Synthesizer + Send + 'static,
        P: AudioSink + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let worker = std::thread::Builder::new()
            .name("speech-worker".to_string())
            .spawn(move || worker_loop(&rx, &synth, sink, &done_tx))
            .ok();

        if worker.is_none() {
            tracing::error!("failed to spawn speech worker");
        }

        Self {
            tx,
            done_rx,
            worker,
            stop_sent: false,
        }
    }

    /// Enqueue a job
    ///
    /// Unbounded and non-blocking; FIFO order is preserved. Enqueueing
    /// after [`request_stop`](Self::request_stop) is a contract violation
    /// and is logged; the worker never processes such jobs.
    pub fn enqueue(&self, job: SpeechJob) {
        if self.stop_sent {
            tracing::warn!(text = %job.text, "job enqueued after shutdown, dropping");
            return;
        }
        if self.tx.send(QueueItem::Speak(job)).is_err() {
            tracing::warn!("speech worker gone, job dropped");
        }
    }

    /// Enqueue the shutdown sentinel
    ///
    /// Must be the last item ever placed in the queue. Idempotent.
    pub fn request_stop(&mut self) {
        if self.stop_sent {
            return;
        }
        self.stop_sent = true;
        let _ = self.tx.send(QueueItem::Stop);
    }

    /// Wait for the worker to drain the queue and exit
    ///
    /// Sends the sentinel if not already sent. Returns true if the worker
    /// finished within `timeout`; on false the worker is left detached so
    /// process exit is never blocked on it.
    pub fn join(&mut self, timeout: Duration) -> bool {
        self.request_stop();

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) => {
                if let Some(worker) = self.worker.take() {
                    let _ = worker.join();
                }
                tracing::debug!("speech worker drained");
                true
            }
            Err(_) => {
                tracing::warn!("speech worker did not drain in time, detaching");
                self.worker.take();
                false
            }
        }
    }
}

impl Drop for SpeechDispatcher {
    fn drop(&mut self) {
        // Best-effort stop; the worker stays detached if mid-playback.
        self.request_stop();
    }
}

fn worker_loop<S, P>(
    rx: &mpsc::Receiver<QueueItem>,
    synth: &S,
    mut sink: P,
    done_tx: &mpsc::Sender<()>,
) where
    S: Synthesizer,
    P: AudioSink,
{
    tracing::debug!("speech worker started");

    while let Ok(item) = rx.recv() {
        match item {
            QueueItem::Stop => break,
            QueueItem::Speak(job) => {
                if let Err(e) = process_job(synth, &mut sink, &job) {
                    tracing::warn!(error = %e, lang = %job.lang, "speech job failed, discarding");
                }
            }
        }
    }

    tracing::debug!("speech worker stopped");
    let _ = done_tx.send(());
}

/// Render one job to a scratch file and play it to completion
///
/// The scratch file is uniquely named per job and removed on both the
/// success and failure paths (drop of the temp handle).
fn process_job<S, P>(synth: &S, sink: &mut P, job: &SpeechJob) -> Result<()>
where
    S: Synthesizer,
    P: AudioSink,
{
    let audio = synth.synthesize(&job.text, &job.lang)?;

    let mut artifact = tempfile::Builder::new()
        .prefix("foyer-speech-")
        .suffix(".mp3")
        .tempfile()
        .map_err(|e| Error::Tts(format!("scratch file: {e}")))?;
    artifact.write_all(&audio)?;
    artifact.flush()?;

    sink.play(artifact.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Synthesizer recording every request, optionally failing on chosen texts
    struct ScriptedSynth {
        rendered: Arc<Mutex<Vec<String>>>,
        fail_on: Vec<String>,
    }

    impl Synthesizer for ScriptedSynth {
        fn synthesize(&self, text: &str, _lang: &str) -> Result<Vec<u8>> {
            if self.fail_on.iter().any(|t| t == text) {
                return Err(Error::Tts("scripted failure".to_string()));
            }
            self.rendered.lock().unwrap().push(text.to_string());
            Ok(text.as_bytes().to_vec())
        }
    }

    /// Sink recording played artifacts' contents in order
    struct RecordingSink {
        played: Arc<Mutex<Vec<String>>>,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, path: &Path) -> Result<()> {
            let content = std::fs::read_to_string(path)?;
            self.played.lock().unwrap().push(content);
            Ok(())
        }
    }

    fn harness(fail_on: &[&str]) -> (SpeechDispatcher, Arc<Mutex<Vec<String>>>) {
        let played = Arc::new(Mutex::new(Vec::new()));
        let synth = ScriptedSynth {
            rendered: Arc::new(Mutex::new(Vec::new())),
            fail_on: fail_on.iter().map(ToString::to_string).collect(),
        };
        let sink = RecordingSink {
            played: Arc::clone(&played),
        };
        (SpeechDispatcher::spawn(synth, sink), played)
    }

    #[test]
    fn jobs_play_in_fifo_order() {
        let (mut dispatcher, played) = harness(&[]);

        for text in ["one", "two", "three"] {
            dispatcher.enqueue(SpeechJob::new(text, "en"));
        }
        assert!(dispatcher.join(Duration::from_secs(5)));

        assert_eq!(*played.lock().unwrap(), vec!["one", "two", "three"]);
    }

    #[test]
    fn sentinel_terminates_after_draining() {
        let (mut dispatcher, played) = harness(&[]);

        dispatcher.enqueue(SpeechJob::new("before", "en"));
        dispatcher.request_stop();
        // contract violation: enqueued after the sentinel, must never play
        dispatcher.enqueue(SpeechJob::new("after", "en"));

        assert!(dispatcher.join(Duration::from_secs(5)));
        assert_eq!(*played.lock().unwrap(), vec!["before"]);
    }

    #[test]
    fn failed_job_does_not_block_successors() {
        let (mut dispatcher, played) = harness(&["bad"]);

        dispatcher.enqueue(SpeechJob::new("good-1", "en"));
        dispatcher.enqueue(SpeechJob::new("bad", "en"));
        dispatcher.enqueue(SpeechJob::new("good-2", "en"));

        assert!(dispatcher.join(Duration::from_secs(5)));
        assert_eq!(*played.lock().unwrap(), vec!["good-1", "good-2"]);
    }

    #[test]
    fn scratch_artifact_is_removed_after_playback() {
        let captured = Arc::new(Mutex::new(Vec::new()));

        struct PathSink(Arc<Mutex<Vec<std::path::PathBuf>>>);
        impl AudioSink for PathSink {
            fn play(&mut self, path: &Path) -> Result<()> {
                self.0.lock().unwrap().push(path.to_path_buf());
                Ok(())
            }
        }

        let synth = ScriptedSynth {
            rendered: Arc::new(Mutex::new(Vec::new())),
            fail_on: Vec::new(),
        };
        let mut dispatcher = SpeechDispatcher::spawn(synth, PathSink(Arc::clone(&captured)));

        dispatcher.enqueue(SpeechJob::new("hello", "en"));
        assert!(dispatcher.join(Duration::from_secs(5)));

        let paths = captured.lock().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists());
    }

    #[test]
    fn join_is_idempotent_after_stop() {
        let (mut dispatcher, _played) = harness(&[]);
        dispatcher.request_stop();
        dispatcher.request_stop();
        assert!(dispatcher.join(Duration::from_secs(5)));
    }
}
