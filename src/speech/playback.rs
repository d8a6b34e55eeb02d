//! Audio playback for synthesized speech
//!
//! rodio's output stream is tied to the thread that opens it, so a dedicated
//! worker owns the device and receives MP3 buffers over a channel. Playback
//! failures are non-fatal: the MP3 can still be saved to disk.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::Result;

/// Commands that can be sent to the audio player
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    /// Decode and play an MP3 buffer, replacing anything already playing
    Play {
        /// MP3 byte stream
        mp3: Vec<u8>,
    },

    /// Stop the current playback
    Stop,

    /// Shutdown the player
    Shutdown,
}

/// Events emitted by the audio player
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// Playback started
    Started,

    /// Playback ran to completion or was stopped
    Finished,

    /// Playback failed; non-fatal
    Error {
        /// Error message
        error: String,
    },

    /// Player has shut down
    Shutdown,
}

/// Audio player with channel-based communication
pub struct AudioPlayer {
    command_tx: Sender<PlaybackCommand>,
    command_rx: Receiver<PlaybackCommand>,
    event_tx: Sender<PlaybackEvent>,
    event_rx: Receiver<PlaybackEvent>,
}

impl AudioPlayer {
    /// Create a new audio player
    pub fn new() -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(16);

        Self {
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<PlaybackCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<PlaybackEvent> {
        self.event_rx.clone()
    }

    /// Start the player worker thread
    pub fn start_worker(self) -> Result<()> {
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        std::thread::spawn(move || {
            info!("Audio player worker starting");

            let (_stream, handle) = match rodio::OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    error!("No audio output device: {}", e);
                    let _ = event_tx.send(PlaybackEvent::Error {
                        error: format!("No audio output device: {}", e),
                    });
                    let _ = event_tx.send(PlaybackEvent::Shutdown);
                    return;
                }
            };

            let sink = match rodio::Sink::try_new(&handle) {
                Ok(s) => s,
                Err(e) => {
                    error!("Failed to open audio sink: {}", e);
                    let _ = event_tx.send(PlaybackEvent::Error {
                        error: format!("Failed to open audio sink: {}", e),
                    });
                    let _ = event_tx.send(PlaybackEvent::Shutdown);
                    return;
                }
            };

            let mut playing = false;

            // Poll with a timeout so the idle branch can detect a sink that
            // drained on its own and report Finished.
            loop {
                match command_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(PlaybackCommand::Play { mp3 }) => {
                        debug!("Playing {} MP3 bytes", mp3.len());
                        sink.stop();
                        match rodio::Decoder::new(Cursor::new(mp3)) {
                            Ok(source) => {
                                sink.append(source);
                                sink.play();
                                playing = true;
                                if event_tx.send(PlaybackEvent::Started).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                error!("MP3 decode failed: {}", e);
                                playing = false;
                                if event_tx
                                    .send(PlaybackEvent::Error {
                                        error: format!("MP3 decode failed: {}", e),
                                    })
                                    .is_err()
                                {
                                    break;
                                }
                            }
                        }
                    }
                    Ok(PlaybackCommand::Stop) => {
                        sink.stop();
                        if playing {
                            playing = false;
                            if event_tx.send(PlaybackEvent::Finished).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(PlaybackCommand::Shutdown) => {
                        info!("Audio player worker shutting down");
                        sink.stop();
                        let _ = event_tx.send(PlaybackEvent::Shutdown);
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if playing && sink.empty() {
                            playing = false;
                            if event_tx.send(PlaybackEvent::Finished).is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("Command channel closed, stopping audio player");
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}
