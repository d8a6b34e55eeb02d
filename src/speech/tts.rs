//! Text-to-speech synthesis over the translate TTS endpoint
//!
//! The endpoint caps each utterance at 200 characters, so longer responses
//! are split on whitespace and fetched chunk by chunk; the resulting MP3
//! frames concatenate into one playable stream. Synthesis failures are
//! non-fatal: the response text is unaffected.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{Result, SketchSolveError};

/// Character limit per synthesis request
pub const CHUNK_LIMIT: usize = 200;

/// Configuration for the TTS engine
#[derive(Clone, Debug)]
pub struct TtsConfig {
    /// BCP-47 language tag for the synthesized voice
    pub lang: String,

    /// Synthesis endpoint
    pub endpoint: String,

    /// Per-chunk request timeout
    pub timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            endpoint: "https://translate.google.com/translate_tts".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TtsConfig {
    /// Set the voice language
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the synthesis endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Commands that can be sent to the TTS pipeline
#[derive(Debug, Clone)]
pub enum TtsCommand {
    /// Synthesize the given text to MP3
    Synthesize {
        /// Text to speak
        text: String,
        /// Unique request ID for tracking
        request_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the TTS pipeline
#[derive(Debug, Clone)]
pub enum TtsEvent {
    /// Synthesis completed
    Audio {
        /// MP3 byte stream
        mp3: Vec<u8>,
        /// Request ID
        request_id: Uuid,
    },

    /// Synthesis failed; non-fatal
    Error {
        /// Error message
        error: String,
        /// Request ID
        request_id: Uuid,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// TTS pipeline with channel-based communication
pub struct TtsPipeline {
    config: TtsConfig,
    command_tx: Sender<TtsCommand>,
    command_rx: Receiver<TtsCommand>,
    event_tx: Sender<TtsEvent>,
    event_rx: Receiver<TtsEvent>,
}

impl TtsPipeline {
    /// Create a new TTS pipeline
    pub fn new(config: TtsConfig) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(16);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<TtsCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<TtsEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    pub fn start_worker(self) -> Result<()> {
        let config = self.config.clone();
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        std::thread::spawn(move || {
            info!("TTS pipeline worker starting");

            let runtime = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    let _ = event_tx.send(TtsEvent::Shutdown);
                    return;
                }
            };

            let client = match reqwest::Client::builder().timeout(config.timeout).build() {
                Ok(c) => c,
                Err(e) => {
                    error!("Failed to build HTTP client: {}", e);
                    let _ = event_tx.send(TtsEvent::Shutdown);
                    return;
                }
            };

            while let Ok(command) = command_rx.recv() {
                match command {
                    TtsCommand::Synthesize { text, request_id } => {
                        debug!("TTS request {}: {} chars", request_id, text.len());
                        let event = match runtime
                            .block_on(synthesize(&client, &config, &text))
                        {
                            Ok(mp3) => {
                                info!("TTS request {} produced {} bytes", request_id, mp3.len());
                                TtsEvent::Audio { mp3, request_id }
                            }
                            Err(e) => {
                                error!("TTS request {} failed: {}", request_id, e);
                                TtsEvent::Error {
                                    error: e.to_string(),
                                    request_id,
                                }
                            }
                        };

                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                    TtsCommand::Shutdown => {
                        info!("TTS pipeline worker shutting down");
                        let _ = event_tx.send(TtsEvent::Shutdown);
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}

/// Fetch MP3 audio for the full text, one request per chunk
async fn synthesize(client: &reqwest::Client, config: &TtsConfig, text: &str) -> Result<Vec<u8>> {
    let chunks = chunk_text(text, CHUNK_LIMIT);
    if chunks.is_empty() {
        return Err(SketchSolveError::SynthesisError(
            "nothing to speak".to_string(),
        ));
    }

    let mut mp3 = Vec::new();
    for chunk in chunks {
        let response = client
            .get(&config.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", config.lang.as_str()),
                ("q", chunk.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SketchSolveError::SynthesisError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SketchSolveError::SynthesisError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SketchSolveError::SynthesisError(e.to_string()))?;
        mp3.extend_from_slice(&bytes);
    }

    Ok(mp3)
}

/// Split text into whitespace-aligned chunks of at most `limit` characters
///
/// A single word longer than the limit is hard-split so every chunk stays
/// under the endpoint's cap.
fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if word.chars().count() > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut piece = String::new();
            for ch in word.chars() {
                if piece.chars().count() == limit {
                    chunks.push(std::mem::take(&mut piece));
                }
                piece.push(ch);
            }
            current = piece;
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
