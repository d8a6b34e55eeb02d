//! AI request pipeline
//!
//! Channel-based interface to the hosted multimodal API: the UI thread sends
//! [`AiCommand`]s and polls [`AiEvent`]s each frame, while a worker thread
//! owns the HTTP client and a tokio runtime. Fail-fast, no retries; every
//! failure surfaces as an [`AiEvent::Error`] and requires explicit user
//! re-action.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde_json::{json, Value};
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::ai::config::AiConfig;
use crate::ai::prompts::PromptKind;
use crate::{Result, SketchSolveError};

/// Commands that can be sent to the AI pipeline
#[derive(Debug, Clone)]
pub enum AiCommand {
    /// Submit a composited image for the given prompt kind
    Ask {
        /// What the AI should do with the image
        prompt: PromptKind,
        /// PNG-encoded snapshot of the composite
        png: Vec<u8>,
        /// Unique request ID for tracking
        request_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the AI pipeline
#[derive(Debug, Clone)]
pub enum AiEvent {
    /// The request completed successfully
    Complete {
        /// The response text
        text: String,
        /// The prompt kind that was asked
        prompt: PromptKind,
        /// Request ID
        request_id: Uuid,
        /// Round-trip time in milliseconds
        elapsed_ms: u64,
    },

    /// The request failed; no history entry must be added
    Error {
        /// Error message
        error: String,
        /// Request ID
        request_id: Uuid,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// AI request pipeline with channel-based communication
pub struct AiPipeline {
    config: AiConfig,
    command_tx: Sender<AiCommand>,
    command_rx: Receiver<AiCommand>,
    event_tx: Sender<AiEvent>,
    event_rx: Receiver<AiEvent>,
}

impl AiPipeline {
    /// Create a new AI pipeline
    pub fn new(config: AiConfig) -> Self {
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
    pub fn command_sender(&self) -> Sender<AiCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<AiEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    ///
    /// The worker serializes requests: one in flight at a time, matching the
    /// one-interaction-at-a-time session model.
    pub fn start_worker(self) -> Result<()> {
        let config = self.config.clone();
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        std::thread::spawn(move || {
            info!("AI pipeline worker starting");

            let runtime = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    let _ = event_tx.send(AiEvent::Shutdown);
                    return;
                }
            };

            let client = match reqwest::Client::builder().timeout(config.timeout).build() {
                Ok(c) => c,
                Err(e) => {
                    error!("Failed to build HTTP client: {}", e);
                    let _ = event_tx.send(AiEvent::Shutdown);
                    return;
                }
            };

            while let Ok(command) = command_rx.recv() {
                match command {
                    AiCommand::Ask {
                        prompt,
                        png,
                        request_id,
                    } => {
                        debug!(
                            "AI request {}: {} ({} byte png)",
                            request_id,
                            prompt.label(),
                            png.len()
                        );
                        let started = Instant::now();
                        let result = runtime.block_on(generate_content(
                            &client, &config, prompt, &png,
                        ));
                        let elapsed_ms = started.elapsed().as_millis() as u64;

                        let event = match result {
                            Ok(text) => {
                                info!("AI request {} completed in {}ms", request_id, elapsed_ms);
                                AiEvent::Complete {
                                    text,
                                    prompt,
                                    request_id,
                                    elapsed_ms,
                                }
                            }
                            Err(e) => {
                                error!("AI request {} failed: {}", request_id, e);
                                AiEvent::Error {
                                    error: e.to_string(),
                                    request_id,
                                }
                            }
                        };

                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                    AiCommand::Shutdown => {
                        info!("AI pipeline worker shutting down");
                        let _ = event_tx.send(AiEvent::Shutdown);
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}

/// Issue one generateContent call: instruction text plus inline PNG
async fn generate_content(
    client: &reqwest::Client,
    config: &AiConfig,
    prompt: PromptKind,
    png: &[u8],
) -> Result<String> {
    let body = request_body(prompt, png);

    let response = client
        .post(config.request_url())
        .json(&body)
        .send()
        .await
        .map_err(|e| SketchSolveError::RequestError(e.to_string()))?;

    let status = response.status();
    let value: Value = response
        .json()
        .await
        .map_err(|e| SketchSolveError::RequestError(e.to_string()))?;

    if !status.is_success() {
        let detail = value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("no detail");
        return Err(SketchSolveError::RequestError(format!(
            "HTTP {status}: {detail}"
        )));
    }

    extract_text(&value).ok_or_else(|| {
        SketchSolveError::RequestError("response contained no text parts".to_string())
    })
}

/// Build the generateContent request body with the image as inline data
fn request_body(prompt: PromptKind, png: &[u8]) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "text": prompt.instruction() },
                {
                    "inline_data": {
                        "mime_type": "image/png",
                        "data": BASE64.encode(png),
                    }
                }
            ]
        }]
    })
}

/// Pull the concatenated text parts out of the first candidate
fn extract_text(value: &Value) -> Option<String> {
    let parts = value.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = request_body(PromptKind::Solve, &[1, 2, 3]);
        assert_eq!(
            body.pointer("/contents/0/parts/0/text").and_then(Value::as_str),
            Some("Solve this handwritten or drawn math problem:")
        );
        assert_eq!(
            body.pointer("/contents/0/parts/1/inline_data/mime_type")
                .and_then(Value::as_str),
            Some("image/png")
        );
        let data = body
            .pointer("/contents/0/parts/1/inline_data/data")
            .and_then(Value::as_str)
            .unwrap();
        assert_eq!(BASE64.decode(data).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let value = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "x = " },
                        { "text": "42" }
                    ]
                }
            }]
        });
        assert_eq!(extract_text(&value).as_deref(), Some("x = 42"));
    }

    #[test]
    fn test_extract_text_rejects_empty_response() {
        assert_eq!(extract_text(&json!({})), None);
        assert_eq!(
            extract_text(&json!({"candidates": [{"content": {"parts": []}}]})),
            None
        );
    }

    #[test]
    fn test_pipeline_channels_are_wired() {
        let pipeline = AiPipeline::new(AiConfig::new("test-key"));
        let tx = pipeline.command_sender();
        let rx = pipeline.event_receiver();
        assert!(tx.send(AiCommand::Shutdown).is_ok());
        // Worker not started; the event side stays empty
        assert!(rx.try_recv().is_err());
    }
}
