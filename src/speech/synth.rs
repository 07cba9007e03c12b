//! Speech synthesis
//!
//! Rendering text to audio is an external collaborator. The bundled
//! implementation uses the Google Translate TTS endpoint, which serves
//! short MP3 clips per request; longer messages are split into chunks and
//! the MP3 payloads concatenated (frame streams decode back-to-back).

use std::time::Duration;

use crate::{Error, Result};

/// Longest text accepted per TTS request
const MAX_CHUNK_CHARS: usize = 180;

/// Renders text plus language tag to playable MP3 audio
pub trait Synthesizer: Send {
    /// Synthesize `text` in language `lang` to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error if the synthesis backend fails
    fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>>;
}

/// Synthesizer backed by the Google Translate TTS endpoint
///
/// Runs on the speech worker thread, so it uses a blocking HTTP client.
pub struct GoogleTranslateTts {
    client: reqwest::blocking::Client,
    tld: String,
}

impl GoogleTranslateTts {
    /// Create a synthesizer
    ///
    /// `tld` selects the endpoint's top-level domain, which affects accent
    /// (the kiosk default is `co.in`).
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(tld: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Tts(format!("client init: {e}")))?;

        Ok(Self {
            client,
            tld: tld.into(),
        })
    }

    fn fetch_chunk(&self, chunk: &str, lang: &str) -> Result<Vec<u8>> {
        let url = request_url(&self.tld, chunk, lang);
        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Tts(format!("translate TTS error {status}")));
        }

        Ok(response.bytes()?.to_vec())
    }
}

impl Synthesizer for GoogleTranslateTts {
    fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(Error::Tts("empty text".to_string()));
        }

        tracing::debug!(lang, chunks = chunks.len(), "synthesizing");

        let mut audio = Vec::new();
        for chunk in &chunks {
            audio.extend(self.fetch_chunk(chunk, lang)?);
        }
        Ok(audio)
    }
}

/// Build the translate TTS request URL for one chunk
fn request_url(tld: &str, text: &str, lang: &str) -> String {
    format!(
        "https://translate.google.{tld}/translate_tts?ie=UTF-8&client=tw-ob&tl={lang}&q={}",
        urlencoding::encode(text)
    )
}

/// Split text into chunks of at most `max_chars` characters
///
/// Splits on line boundaries first, then on whitespace for oversized
/// lines. Blank lines are dropped; chunk order follows the text.
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.chars().count() <= max_chars {
            chunks.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        let mut current_chars = 0;
        for word in line.split_whitespace() {
            let word_chars = word.chars().count();
            if current_chars > 0 && current_chars + 1 + word_chars > max_chars {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if current_chars > 0 {
                current.push(' ');
                current_chars += 1;
            }
            current.push_str(word);
            current_chars += word_chars;
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_text("Welcome to our department", 180);
        assert_eq!(chunks, vec!["Welcome to our department"]);
    }

    #[test]
    fn multiline_text_splits_on_lines() {
        let chunks = split_text("नमस्कार\n\nआपले स्वागत आहे\n", 180);
        assert_eq!(chunks, vec!["नमस्कार", "आपले स्वागत आहे"]);
    }

    #[test]
    fn long_line_splits_on_whitespace_within_limit() {
        let line = "word ".repeat(100);
        let chunks = split_text(&line, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
        assert_eq!(chunks.join(" "), line.trim());
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_text("  \n \n", 180).is_empty());
    }

    #[test]
    fn request_url_encodes_query() {
        let url = request_url("co.in", "hello world", "en");
        assert!(url.starts_with("https://translate.google.co.in/translate_tts?"));
        assert!(url.contains("tl=en"));
        assert!(url.contains("q=hello%20world"));
    }
}
