use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use foyer_kiosk::{
    AudioPlayback, AudioSink, Config, Gallery, GoogleTranslateTts, HttpFaceDetector, Kiosk,
    PreviewSurface, SnapshotCamera, SpeechDispatcher, Synthesizer,
};

/// Foyer - face-recognition welcome kiosk
#[derive(Parser)]
#[command(name = "foyer", version, about)]
struct Cli {
    /// Path to the kiosk config file (TOML)
    #[arg(short, long, env = "FOYER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the known-faces directory
    #[arg(long, env = "FOYER_FACES_DIR")]
    faces_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test speaker output with a short tone
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Welcome to our department")]
        text: String,
        /// Language tag
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
    /// Load the gallery and list the registered identities
    Gallery,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,foyer_kiosk=info",
        1 => "info,foyer_kiosk=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.faces_dir {
        config.known_faces_dir = dir;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text, lang } => test_tts(&config, text, lang).await,
            Command::Gallery => list_gallery(&config).await,
        };
    }

    run_kiosk(config).await
}

/// Start the kiosk daemon
async fn run_kiosk(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        faces = %config.known_faces_dir.display(),
        camera = %config.camera_url,
        "starting foyer kiosk"
    );

    let detector = HttpFaceDetector::new(config.detector_url.clone())?;

    tracing::info!("loading known faces");
    let gallery = Gallery::load(&config.known_faces_dir, &detector).await?;
    if gallery.is_empty() {
        tracing::warn!("gallery is empty - every face will be greeted as a guest");
    }

    // Blocking HTTP client; construct off the runtime threads
    let tld = config.tts.tld.clone();
    let timeout = Duration::from_secs(config.tts.timeout_secs);
    let synth =
        tokio::task::spawn_blocking(move || GoogleTranslateTts::new(tld, timeout)).await??;
    let playback = AudioPlayback::new()?;
    let dispatcher = SpeechDispatcher::spawn(synth, playback);

    let source = SnapshotCamera::new(config.camera_url.clone(), config.frame_interval())?;
    let surface = PreviewSurface::new(config.preview_path.clone());

    // Ctrl-C doubles as the quit key for headless runs
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(()).await;
        }
    });

    let kiosk = Kiosk::new(config, gallery, dispatcher);
    kiosk.run(source, &detector, surface, &mut shutdown_rx).await?;

    Ok(())
}

/// Test speaker output with a sine tone
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    tokio::task::spawn_blocking(|| -> anyhow::Result<()> {
        let playback = AudioPlayback::new()?;

        let sample_rate = 22_050_f32;
        let frequency = 440.0_f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let num_samples = (sample_rate * 2.0) as usize;

        #[allow(clippy::cast_precision_loss)]
        let samples: Vec<f32> = (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate;
                (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
            })
            .collect();

        playback.play_samples(&samples)?;
        Ok(())
    })
    .await??;

    println!("If you heard the tone, your speakers are working!");
    Ok(())
}

/// Synthesize and play a test utterance
async fn test_tts(config: &Config, text: String, lang: String) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\" ({lang})\n");

    let tld = config.tts.tld.clone();
    let timeout = Duration::from_secs(config.tts.timeout_secs);

    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let synth = GoogleTranslateTts::new(tld, timeout)?;
        let audio = synth.synthesize(&text, &lang)?;
        println!("Got {} bytes of audio data", audio.len());

        let mut artifact = tempfile::Builder::new().suffix(".mp3").tempfile()?;
        std::io::Write::write_all(&mut artifact, &audio)?;

        let mut playback = AudioPlayback::new()?;
        playback.play(artifact.path())?;
        Ok(())
    })
    .await??;

    println!("\nIf you heard the speech, TTS is working!");
    Ok(())
}

/// Load the gallery and print its entries
async fn list_gallery(config: &Config) -> anyhow::Result<()> {
    let detector = HttpFaceDetector::new(config.detector_url.clone())?;
    let gallery = Gallery::load(&config.known_faces_dir, &detector).await?;

    if gallery.is_empty() {
        println!("No identities registered");
        return Ok(());
    }

    println!("Registered identities ({}):", gallery.len());
    for name in gallery.names() {
        println!("  {name}");
    }
    Ok(())
}
