pub mod playback;
pub mod tts;

pub use playback::{AudioPlayer, PlaybackCommand, PlaybackEvent};
pub use tts::{TtsCommand, TtsConfig, TtsEvent, TtsPipeline};
