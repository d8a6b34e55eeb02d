pub mod ai;
pub mod canvas;
pub mod export;
pub mod history;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SketchSolveError {
    #[error("Image decode error: {0}")]
    DecodeError(String),

    #[error("AI request error: {0}")]
    RequestError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("Audio playback error: {0}")]
    PlaybackError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for SketchSolveError {
    fn from(e: std::io::Error) -> Self {
        SketchSolveError::IOError(e.to_string())
    }
}

impl SketchSolveError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the session intact; the user simply
    /// re-triggers the action that failed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // A bad upload leaves the prior base image in place
            SketchSolveError::DecodeError(_) => true,
            // Network/quota failures; the drawing is untouched
            SketchSolveError::RequestError(_) => true,
            // The response text is still available
            SketchSolveError::SynthesisError(_) => true,
            // The MP3 can still be saved to disk
            SketchSolveError::PlaybackError(_) => true,
            // The user can retry with a different save location
            SketchSolveError::IOError(_) => true,
            // Channel errors indicate a dead worker
            SketchSolveError::ChannelError(_) => false,
            // Missing API key requires user intervention
            SketchSolveError::ConfigError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            SketchSolveError::DecodeError(_) => {
                "Could not read that image. Please upload a PNG or JPEG.".to_string()
            }
            SketchSolveError::RequestError(_) => {
                "The AI request failed. Please try again.".to_string()
            }
            SketchSolveError::SynthesisError(_) => {
                "Text-to-speech failed. The response is still shown as text.".to_string()
            }
            SketchSolveError::PlaybackError(_) => {
                "Audio playback failed. You can still save the MP3.".to_string()
            }
            SketchSolveError::IOError(_) => {
                "Could not save the file. Please try a different location.".to_string()
            }
            SketchSolveError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            SketchSolveError::ConfigError(_) => {
                "Configuration error. Please check your API key setup.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SketchSolveError>;
