//! Detection loop integration tests
//!
//! Runs the kiosk daemon against scripted collaborators: a frame source
//! with a fixed reel, a detector that answers from a script, and a surface
//! that records annotations and requests quit.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::RgbImage;

use foyer_kiosk::{
    Annotation, AudioSink, Config, Detection, FaceBox, FaceDetector, FrameSource, Gallery, Kiosk,
    Result, SpeechDispatcher, Surface, Synthesizer,
};

struct EchoSynth;

impl Synthesizer for EchoSynth {
    fn synthesize(&self, text: &str, _lang: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

struct RecordingSink(Arc<Mutex<Vec<String>>>);

impl AudioSink for RecordingSink {
    fn play(&mut self, path: &Path) -> Result<()> {
        self.0.lock().unwrap().push(std::fs::read_to_string(path)?);
        Ok(())
    }
}

/// Frame source playing a fixed reel, then empty reads forever
struct Reel {
    frames: VecDeque<RgbImage>,
}

impl Reel {
    fn of(count: usize) -> Self {
        Self {
            frames: (0..count).map(|_| RgbImage::new(640, 480)).collect(),
        }
    }
}

#[async_trait]
impl FrameSource for Reel {
    async fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }
}

/// Detector answering each call from a script of detection lists
struct ScriptedDetector {
    script: Mutex<VecDeque<Vec<Detection>>>,
}

impl ScriptedDetector {
    fn new(script: Vec<Vec<Detection>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl FaceDetector for ScriptedDetector {
    async fn detect(&self, _image: &RgbImage) -> Result<Vec<Detection>> {
        Ok(self.script.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Surface recording every present's annotations, quitting after a count
struct CountingSurface {
    presented: Arc<Mutex<Vec<Vec<Annotation>>>>,
    quit_after: usize,
}

impl Surface for CountingSurface {
    fn present(&mut self, _frame: &RgbImage, annotations: &[Annotation]) -> Result<()> {
        self.presented.lock().unwrap().push(annotations.to_vec());
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        self.presented.lock().unwrap().len() >= self.quit_after
    }
}

fn face_at(embedding: Vec<f32>) -> Detection {
    Detection {
        location: FaceBox {
            top: 10,
            right: 40,
            bottom: 35,
            left: 12,
        },
        embedding,
    }
}

fn test_config() -> Config {
    Config {
        frame_stride: 3,
        detect_downscale: 4,
        match_tolerance: 0.45,
        ..Config::default()
    }
}

#[tokio::test]
async fn known_face_is_greeted_and_annotated_at_full_resolution() {
    let mut gallery = Gallery::new();
    gallery.register("yash", vec![1.0, 0.0]);

    let played = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = SpeechDispatcher::spawn(EchoSynth, RecordingSink(Arc::clone(&played)));

    // 3 frames; only the 3rd is sampled for detection
    let source = Reel::of(3);
    let detector = ScriptedDetector::new(vec![vec![face_at(vec![1.0, 0.0])]]);
    let presented = Arc::new(Mutex::new(Vec::new()));
    let surface = CountingSurface {
        presented: Arc::clone(&presented),
        quit_after: 3,
    };

    let (_keep_alive, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let kiosk = Kiosk::new(test_config(), gallery, dispatcher);
    kiosk
        .run(source, &detector, surface, &mut shutdown_rx)
        .await
        .unwrap();

    // yash's two-job greeting played in order
    let played = played.lock().unwrap();
    assert_eq!(played.len(), 2);
    assert!(played[0].contains("यश"));
    assert!(played[1].contains("Yash"));

    // skipped frames were presented unannotated; the sampled frame carries
    // the box scaled back up by the downscale factor
    let presented = presented.lock().unwrap();
    assert_eq!(presented.len(), 3);
    assert!(presented[0].is_empty());
    assert!(presented[1].is_empty());
    assert_eq!(presented[2].len(), 1);
    assert_eq!(presented[2][0].label, "YASH");
    assert_eq!(
        presented[2][0].location,
        FaceBox {
            top: 40,
            right: 160,
            bottom: 140,
            left: 48,
        }
    );
}

#[tokio::test]
async fn repeat_sightings_within_cooldown_greet_once() {
    let mut gallery = Gallery::new();
    gallery.register("yash", vec![1.0, 0.0]);

    let played = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = SpeechDispatcher::spawn(EchoSynth, RecordingSink(Arc::clone(&played)));

    // 6 frames: detection fires on frames 3 and 6, same face both times
    let source = Reel::of(6);
    let detector = ScriptedDetector::new(vec![
        vec![face_at(vec![1.0, 0.0])],
        vec![face_at(vec![1.0, 0.0])],
    ]);
    let presented = Arc::new(Mutex::new(Vec::new()));
    let surface = CountingSurface {
        presented: Arc::clone(&presented),
        quit_after: 6,
    };

    let (_keep_alive, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let kiosk = Kiosk::new(test_config(), gallery, dispatcher);
    kiosk
        .run(source, &detector, surface, &mut shutdown_rx)
        .await
        .unwrap();

    // second sighting suppressed: still one greeting (2 jobs)
    assert_eq!(played.lock().unwrap().len(), 2);

    // but the face is annotated on both sampled frames
    let presented = presented.lock().unwrap();
    assert_eq!(presented[2].len(), 1);
    assert_eq!(presented[5].len(), 1);
}

#[tokio::test]
async fn unknown_face_is_labeled_guest() {
    let mut gallery = Gallery::new();
    gallery.register("yash", vec![1.0, 0.0]);

    let played = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = SpeechDispatcher::spawn(EchoSynth, RecordingSink(Arc::clone(&played)));

    let source = Reel::of(3);
    let detector = ScriptedDetector::new(vec![vec![face_at(vec![0.0, 1.0])]]);
    let presented = Arc::new(Mutex::new(Vec::new()));
    let surface = CountingSurface {
        presented: Arc::clone(&presented),
        quit_after: 3,
    };

    let (_keep_alive, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    let kiosk = Kiosk::new(test_config(), gallery, dispatcher);
    kiosk
        .run(source, &detector, surface, &mut shutdown_rx)
        .await
        .unwrap();

    let played = played.lock().unwrap();
    assert_eq!(played.len(), 2);
    assert_eq!(played[1], "Welcome to our department");
    assert_eq!(presented.lock().unwrap()[2][0].label, "GUEST");
}

#[tokio::test]
async fn interrupt_signal_stops_the_loop() {
    let gallery = Gallery::new();
    let played = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = SpeechDispatcher::spawn(EchoSynth, RecordingSink(Arc::clone(&played)));

    /// Source that never produces a frame
    struct Idle;

    #[async_trait]
    impl FrameSource for Idle {
        async fn next_frame(&mut self) -> Result<Option<RgbImage>> {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Ok(None)
        }
    }

    let detector = ScriptedDetector::new(vec![]);
    let surface = CountingSurface {
        presented: Arc::new(Mutex::new(Vec::new())),
        quit_after: usize::MAX,
    };

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    shutdown_tx.send(()).await.unwrap();

    let kiosk = Kiosk::new(test_config(), gallery, dispatcher);
    kiosk
        .run(Idle, &detector, surface, &mut shutdown_rx)
        .await
        .unwrap();

    assert!(played.lock().unwrap().is_empty());
}
