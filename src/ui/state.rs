//! Application state management
//!
//! The central session context: current input mode and drawing state, the
//! selected prompt kind, the response history, and the channel endpoints of
//! the AI, TTS, and playback workers. Everything a handler needs is here; there are no
//! process-wide globals. One instance lives for one session.

use crossbeam_channel::{Receiver, Sender as ChannelSender};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::ai::{AiCommand, AiEvent, PromptKind};
use crate::canvas::{Compositor, InputMode, Stroke};
use crate::history::{ResponseHistory, ResponseRecord};
use crate::speech::{PlaybackCommand, PlaybackEvent, TtsCommand, TtsEvent};
use crate::SketchSolveError;

/// Central application state
pub struct AppState {
    /// Drawing/image compositor: the current input image
    pub compositor: Compositor,

    /// Selected prompt kind
    pub prompt: PromptKind,

    /// Session history of successful AI responses
    pub history: ResponseHistory,

    /// MP3 audio synthesized for the last response, if any
    pub last_audio: Option<Vec<u8>>,

    /// Stroke being drawn right now, in canvas coordinates
    pub active_stroke: Vec<(f32, f32)>,

    /// Cached texture of the current composite
    pub canvas_texture: Option<egui::TextureHandle>,

    /// Set when the composite changed and the texture must be rebuilt
    pub canvas_dirty: bool,

    /// Channel to send AI commands
    pub ai_command_tx: Option<ChannelSender<AiCommand>>,

    /// Channel to receive AI events
    pub ai_event_rx: Option<Receiver<AiEvent>>,

    /// Channel to send TTS commands
    pub tts_command_tx: Option<ChannelSender<TtsCommand>>,

    /// Channel to receive TTS events
    pub tts_event_rx: Option<Receiver<TtsEvent>>,

    /// Channel to send playback commands
    pub playback_command_tx: Option<ChannelSender<PlaybackCommand>>,

    /// Channel to receive playback events
    pub playback_event_rx: Option<Receiver<PlaybackEvent>>,

    /// Request ID of the in-flight AI call, if any
    pub pending_ask: Option<Uuid>,

    /// Request ID of the in-flight synthesis, if any
    pub pending_tts: Option<Uuid>,

    /// True while the last response is being read aloud
    pub is_playing: bool,

    /// Last error message, shown until the next action
    pub last_error: Option<String>,

    /// Status line for the last completed action
    pub status: Option<String>,

    /// Whether the dark palette is active
    pub dark_mode: bool,

    /// Whether the history panel is open
    pub show_history: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create a fresh session: empty history, no response, freehand mode
    pub fn new() -> Self {
        Self {
            compositor: Compositor::new(),
            prompt: PromptKind::default(),
            history: ResponseHistory::new(),
            last_audio: None,
            active_stroke: Vec::new(),
            canvas_texture: None,
            canvas_dirty: true,
            ai_command_tx: None,
            ai_event_rx: None,
            tts_command_tx: None,
            tts_event_rx: None,
            playback_command_tx: None,
            playback_event_rx: None,
            pending_ask: None,
            pending_tts: None,
            is_playing: false,
            last_error: None,
            status: None,
            dark_mode: false,
            show_history: false,
        }
    }

    /// True while an AI request is in flight
    pub fn is_asking(&self) -> bool {
        self.pending_ask.is_some()
    }

    /// Switch the input mode, discarding the other mode's drawing state
    pub fn select_mode(&mut self, mode: InputMode) {
        self.compositor.select_mode(mode);
        self.active_stroke.clear();
        self.canvas_dirty = true;
    }

    /// Feed uploaded or captured image bytes to the compositor
    pub fn set_base_image(&mut self, bytes: &[u8]) {
        match self.compositor.set_base_image(bytes) {
            Ok(()) => {
                self.last_error = None;
                self.canvas_dirty = true;
            }
            Err(e) => {
                warn!("upload rejected: {}", e);
                self.last_error = Some(e.user_message());
            }
        }
    }

    /// Commit the in-progress stroke to the compositor
    pub fn commit_active_stroke(&mut self) {
        if self.active_stroke.is_empty() {
            return;
        }
        let points = std::mem::take(&mut self.active_stroke);
        let stroke = match self.compositor.mode() {
            InputMode::Freehand => Stroke::freehand(points),
            InputMode::Overlay => Stroke::annotation(points),
        };
        self.compositor.apply_stroke(&stroke);
        self.canvas_dirty = true;
    }

    /// Blank the active drawing surface
    pub fn clear_drawing(&mut self) {
        self.compositor.clear();
        self.active_stroke.clear();
        self.canvas_dirty = true;
    }

    /// Snapshot the composite and submit it to the AI pipeline
    ///
    /// The PNG is encoded here, before the command is queued, so edits made
    /// while the request is in flight cannot reach the submitted image.
    pub fn submit_ask(&mut self) {
        if self.is_asking() {
            debug!("ask ignored: request already in flight");
            return;
        }
        self.status = None;

        let png = match self.compositor.composite_png() {
            None => {
                self.last_error = Some("Nothing to submit yet. Upload a photo first.".to_string());
                return;
            }
            Some(Err(e)) => {
                error!("composite encode failed: {}", e);
                self.last_error = Some(e.user_message());
                return;
            }
            Some(Ok(png)) => png,
        };

        let Some(tx) = &self.ai_command_tx else {
            self.last_error =
                Some(SketchSolveError::ConfigError(String::new()).user_message());
            return;
        };

        let request_id = Uuid::new_v4();
        let command = AiCommand::Ask {
            prompt: self.prompt,
            png,
            request_id,
        };
        match tx.send(command) {
            Ok(()) => {
                info!("submitted AI request {}", request_id);
                self.pending_ask = Some(request_id);
                self.last_error = None;
            }
            Err(e) => {
                error!("AI command channel closed: {}", e);
                self.last_error =
                    Some(SketchSolveError::ChannelError(e.to_string()).user_message());
            }
        }
    }

    /// Read the last response aloud
    ///
    /// Audio already synthesized for this response is replayed directly;
    /// otherwise the text goes through the TTS pipeline first and playback
    /// starts when the MP3 arrives.
    pub fn request_speech(&mut self) {
        if let Some(mp3) = self.last_audio.clone() {
            self.play_audio(mp3);
            return;
        }
        let Some(record) = self.history.last() else {
            return;
        };
        let Some(tx) = &self.tts_command_tx else {
            self.last_error =
                Some(SketchSolveError::ChannelError("no TTS worker".to_string()).user_message());
            return;
        };

        let request_id = Uuid::new_v4();
        match tx.send(TtsCommand::Synthesize {
            text: record.text,
            request_id,
        }) {
            Ok(()) => {
                self.pending_tts = Some(request_id);
                self.last_error = None;
            }
            Err(e) => {
                error!("TTS command channel closed: {}", e);
                self.last_error =
                    Some(SketchSolveError::ChannelError(e.to_string()).user_message());
            }
        }
    }

    /// Send an MP3 buffer to the audio player
    pub fn play_audio(&mut self, mp3: Vec<u8>) {
        let Some(tx) = &self.playback_command_tx else {
            self.last_error =
                Some(SketchSolveError::PlaybackError("no audio worker".to_string()).user_message());
            return;
        };
        match tx.send(PlaybackCommand::Play { mp3 }) {
            Ok(()) => {
                self.last_error = None;
            }
            Err(e) => {
                error!("playback command channel closed: {}", e);
                self.last_error =
                    Some(SketchSolveError::PlaybackError(e.to_string()).user_message());
            }
        }
    }

    /// Stop the current playback, if any
    pub fn stop_audio(&mut self) {
        if let Some(tx) = &self.playback_command_tx {
            if tx.send(PlaybackCommand::Stop).is_err() {
                self.playback_command_tx = None;
            }
        }
        self.is_playing = false;
    }

    /// Drain and apply all pending pipeline events
    pub fn poll_events(&mut self) {
        // Collect first; applying an event needs &mut self
        let mut ai_events = Vec::new();
        if let Some(rx) = &self.ai_event_rx {
            while let Ok(event) = rx.try_recv() {
                ai_events.push(event);
            }
        }
        for event in ai_events {
            self.handle_ai_event(event);
        }

        let mut tts_events = Vec::new();
        if let Some(rx) = &self.tts_event_rx {
            while let Ok(event) = rx.try_recv() {
                tts_events.push(event);
            }
        }
        for event in tts_events {
            self.handle_tts_event(event);
        }

        let mut playback_events = Vec::new();
        if let Some(rx) = &self.playback_event_rx {
            while let Ok(event) = rx.try_recv() {
                playback_events.push(event);
            }
        }
        for event in playback_events {
            self.handle_playback_event(event);
        }
    }

    /// Apply one AI pipeline event
    ///
    /// Only a `Complete` for the in-flight request touches the history; an
    /// `Error` leaves history and last response exactly as they were.
    pub fn handle_ai_event(&mut self, event: AiEvent) {
        match event {
            AiEvent::Complete {
                text,
                prompt,
                request_id,
                elapsed_ms,
            } => {
                if self.pending_ask != Some(request_id) {
                    warn!("dropping stale AI response {}", request_id);
                    return;
                }
                self.pending_ask = None;
                self.history.record(ResponseRecord::new(prompt, text));
                // Audio belongs to the previous response now
                self.last_audio = None;
                self.status = Some(format!("Responded in {elapsed_ms} ms"));
                self.last_error = None;
            }
            AiEvent::Error { error, request_id } => {
                if self.pending_ask != Some(request_id) {
                    warn!("dropping stale AI error {}", request_id);
                    return;
                }
                self.pending_ask = None;
                self.last_error =
                    Some(SketchSolveError::RequestError(error).user_message());
            }
            AiEvent::Shutdown => {
                debug!("AI pipeline reported shutdown");
                self.ai_command_tx = None;
            }
        }
    }

    /// Apply one TTS pipeline event
    pub fn handle_tts_event(&mut self, event: TtsEvent) {
        match event {
            TtsEvent::Audio { mp3, request_id } => {
                if self.pending_tts != Some(request_id) {
                    warn!("dropping stale TTS audio {}", request_id);
                    return;
                }
                self.pending_tts = None;
                self.last_audio = Some(mp3.clone());
                self.play_audio(mp3);
            }
            TtsEvent::Error { error, request_id } => {
                if self.pending_tts != Some(request_id) {
                    warn!("dropping stale TTS error {}", request_id);
                    return;
                }
                self.pending_tts = None;
                self.last_error =
                    Some(SketchSolveError::SynthesisError(error).user_message());
            }
            TtsEvent::Shutdown => {
                debug!("TTS pipeline reported shutdown");
                self.tts_command_tx = None;
            }
        }
    }

    /// Apply one audio player event
    pub fn handle_playback_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Started => {
                self.is_playing = true;
                self.status = Some("Reading response aloud".to_string());
            }
            PlaybackEvent::Finished => {
                self.is_playing = false;
            }
            PlaybackEvent::Error { error } => {
                warn!("playback failed: {}", error);
                self.is_playing = false;
                self.last_error =
                    Some(SketchSolveError::PlaybackError(error).user_message());
            }
            PlaybackEvent::Shutdown => {
                debug!("audio player reported shutdown");
                self.playback_command_tx = None;
                self.is_playing = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn state_with_ai_channel() -> (AppState, Receiver<AiCommand>) {
        let mut state = AppState::new();
        let (tx, rx) = bounded(4);
        state.ai_command_tx = Some(tx);
        (state, rx)
    }

    fn state_with_playback_channel() -> (AppState, Receiver<PlaybackCommand>) {
        let mut state = AppState::new();
        let (tx, rx) = bounded(4);
        state.playback_command_tx = Some(tx);
        (state, rx)
    }

    #[test]
    fn test_fresh_session_is_empty() {
        let state = AppState::new();
        assert!(state.history.is_empty());
        assert!(state.history.last().is_none());
        assert_eq!(state.prompt, PromptKind::Solve);
        assert_eq!(state.compositor.mode(), InputMode::Freehand);
        assert!(!state.is_asking());
        assert!(!state.is_playing);
        // Light palette until the user flips the toggle
        assert!(!state.dark_mode);
    }

    #[test]
    fn test_submit_ask_queues_snapshot() {
        let (mut state, rx) = state_with_ai_channel();
        state.active_stroke = vec![(10.0, 10.0), (50.0, 50.0)];
        state.commit_active_stroke();

        state.submit_ask();
        assert!(state.is_asking());

        let AiCommand::Ask { png, prompt, .. } = rx.try_recv().unwrap() else {
            panic!("expected an Ask command");
        };
        assert_eq!(prompt, PromptKind::Solve);
        // The queued bytes decode back to the fixed canvas
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.to_rgba8().dimensions(), (400, 400));
    }

    #[test]
    fn test_second_ask_waits_for_first() {
        let (mut state, rx) = state_with_ai_channel();
        state.submit_ask();
        state.submit_ask();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_overlay_without_base_cannot_submit() {
        let (mut state, rx) = state_with_ai_channel();
        state.select_mode(InputMode::Overlay);
        state.submit_ask();
        assert!(!state.is_asking());
        assert!(state.last_error.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_request_error_leaves_history_untouched() {
        let (mut state, _rx) = state_with_ai_channel();
        state
            .history
            .record(ResponseRecord::new(PromptKind::Solve, "earlier answer"));

        state.submit_ask();
        let request_id = state.pending_ask.unwrap();
        state.handle_ai_event(AiEvent::Error {
            error: "quota exceeded".to_string(),
            request_id,
        });

        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.last().unwrap().text, "earlier answer");
        assert!(state.last_error.is_some());
        assert!(!state.is_asking());
    }

    #[test]
    fn test_complete_appends_to_history() {
        let (mut state, _rx) = state_with_ai_channel();
        state.submit_ask();
        let request_id = state.pending_ask.unwrap();

        state.handle_ai_event(AiEvent::Complete {
            text: "x = 4".to_string(),
            prompt: PromptKind::Solve,
            request_id,
            elapsed_ms: 800,
        });

        assert!(!state.is_asking());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.last().unwrap().text, "x = 4");
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let (mut state, _rx) = state_with_ai_channel();
        state.handle_ai_event(AiEvent::Complete {
            text: "late".to_string(),
            prompt: PromptKind::Solve,
            request_id: Uuid::new_v4(),
            elapsed_ms: 1,
        });
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_stale_ai_error_is_dropped() {
        let (mut state, _rx) = state_with_ai_channel();
        state.submit_ask();
        let in_flight = state.pending_ask.unwrap();

        // An error for an abandoned earlier request changes nothing
        state.handle_ai_event(AiEvent::Error {
            error: "timed out".to_string(),
            request_id: Uuid::new_v4(),
        });
        assert!(state.last_error.is_none());
        assert_eq!(state.pending_ask, Some(in_flight));
    }

    #[test]
    fn test_synthesis_error_keeps_response() {
        let mut state = AppState::new();
        state
            .history
            .record(ResponseRecord::new(PromptKind::Explain, "a circle"));
        state.pending_tts = Some(Uuid::new_v4());

        let request_id = state.pending_tts.unwrap();
        state.handle_tts_event(TtsEvent::Error {
            error: "endpoint unreachable".to_string(),
            request_id,
        });

        assert_eq!(state.history.last().unwrap().text, "a circle");
        assert!(state.last_audio.is_none());
        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_tts_audio_starts_playback() {
        let (mut state, rx) = state_with_playback_channel();
        let request_id = Uuid::new_v4();
        state.pending_tts = Some(request_id);

        state.handle_tts_event(TtsEvent::Audio {
            mp3: vec![0xff, 0xfb],
            request_id,
        });

        // The MP3 is kept for export AND sent to the player
        assert_eq!(state.last_audio.as_deref(), Some(&[0xff, 0xfb][..]));
        let PlaybackCommand::Play { mp3 } = rx.try_recv().unwrap() else {
            panic!("expected a Play command");
        };
        assert_eq!(mp3, vec![0xff, 0xfb]);
    }

    #[test]
    fn test_read_aloud_replays_cached_audio() {
        let (mut state, rx) = state_with_playback_channel();
        let (tts_tx, tts_rx) = bounded(4);
        state.tts_command_tx = Some(tts_tx);
        state
            .history
            .record(ResponseRecord::new(PromptKind::Solve, "x = 4"));
        state.last_audio = Some(vec![9, 9]);

        state.request_speech();

        // Replay goes straight to the player; no second synthesis
        assert!(matches!(
            rx.try_recv().unwrap(),
            PlaybackCommand::Play { .. }
        ));
        assert!(tts_rx.try_recv().is_err());
        assert!(state.pending_tts.is_none());
    }

    #[test]
    fn test_playback_error_keeps_audio_for_export() {
        let (mut state, _rx) = state_with_playback_channel();
        state.last_audio = Some(vec![1, 2]);
        state.is_playing = true;

        state.handle_playback_event(PlaybackEvent::Error {
            error: "no output device".to_string(),
        });

        assert!(!state.is_playing);
        assert!(state.last_error.is_some());
        assert_eq!(state.last_audio.as_deref(), Some(&[1, 2][..]));
    }

    #[test]
    fn test_stop_halts_playback() {
        let (mut state, rx) = state_with_playback_channel();
        state.handle_playback_event(PlaybackEvent::Started);
        assert!(state.is_playing);

        state.stop_audio();
        assert!(!state.is_playing);
        assert!(matches!(rx.try_recv().unwrap(), PlaybackCommand::Stop));
    }

    #[test]
    fn test_new_response_invalidates_old_audio() {
        let (mut state, _rx) = state_with_ai_channel();
        state.last_audio = Some(vec![1, 2, 3]);
        state.submit_ask();
        let request_id = state.pending_ask.unwrap();

        state.handle_ai_event(AiEvent::Complete {
            text: "new".to_string(),
            prompt: PromptKind::Solve,
            request_id,
            elapsed_ms: 5,
        });
        assert!(state.last_audio.is_none());
    }
}
