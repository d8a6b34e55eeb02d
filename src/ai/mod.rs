pub mod config;
pub mod pipeline;
pub mod prompts;

pub use config::AiConfig;
pub use pipeline::{AiCommand, AiEvent, AiPipeline};
pub use prompts::PromptKind;
