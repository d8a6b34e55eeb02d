//! Main application struct and eframe integration

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use tracing::{error, info};

use crate::ai::{AiConfig, AiPipeline, PromptKind};
use crate::canvas::InputMode;
use crate::speech::{AudioPlayer, TtsConfig, TtsPipeline};
use crate::ui::components::{CanvasView, HistoryPanel, ResponsePanel};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;

/// Main SketchSolve application
pub struct SketchSolveApp {
    /// Application state
    state: AppState,
    /// Visual theme
    theme: Theme,
    /// Whether the pipelines have been wired up
    initialized: bool,
}

impl SketchSolveApp {
    /// Create a new SketchSolve application
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = Theme::light();
        theme.apply(&cc.egui_ctx);

        Self {
            state: AppState::new(),
            theme,
            initialized: false,
        }
    }

    /// Start the AI, TTS, and audio workers (called on first frame)
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        match AiConfig::from_env() {
            Ok(config) => {
                let pipeline = AiPipeline::new(config);
                self.state.ai_command_tx = Some(pipeline.command_sender());
                self.state.ai_event_rx = Some(pipeline.event_receiver());
                if let Err(e) = pipeline.start_worker() {
                    error!("AI worker failed to start: {}", e);
                    self.state.ai_command_tx = None;
                    self.state.last_error = Some(e.user_message());
                }
            }
            Err(e) => {
                error!("AI backend unavailable: {}", e);
                self.state.last_error = Some(e.user_message());
            }
        }

        let tts = TtsPipeline::new(TtsConfig::default());
        self.state.tts_command_tx = Some(tts.command_sender());
        self.state.tts_event_rx = Some(tts.event_receiver());
        if let Err(e) = tts.start_worker() {
            error!("TTS worker failed to start: {}", e);
            self.state.tts_command_tx = None;
        }

        let player = AudioPlayer::new();
        self.state.playback_command_tx = Some(player.command_sender());
        self.state.playback_event_rx = Some(player.event_receiver());
        if let Err(e) = player.start_worker() {
            error!("audio player failed to start: {}", e);
            self.state.playback_command_tx = None;
        }

        info!("SketchSolve UI initialized");
    }

    /// Show the top header bar
    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("SketchSolve")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.label(
                        RichText::new("Solve from drawing or photo")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let mut dark = self.state.dark_mode;
                        if ui.checkbox(&mut dark, "🌙 Dark mode").changed() {
                            self.state.dark_mode = dark;
                            self.theme = if dark { Theme::dark() } else { Theme::light() };
                            self.theme.apply(ui.ctx());
                        }

                        if ui
                            .button("📜")
                            .on_hover_text("Toggle history panel")
                            .clicked()
                        {
                            self.state.show_history = !self.state.show_history;
                        }
                    });
                });
            });
    }

    /// Show the input controls: mode, prompt kind, clear and ask actions
    fn show_controls(&mut self, ctx: &egui::Context) {
        SidePanel::left("controls")
            .resizable(false)
            .exact_width(230.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ui.label(
                    RichText::new("Input method")
                        .size(14.0)
                        .strong()
                        .color(self.theme.text_primary),
                );

                let mut mode = self.state.compositor.mode();
                let changed = ui
                    .radio_value(&mut mode, InputMode::Freehand, "🖌 Draw here")
                    .changed()
                    | ui.radio_value(&mut mode, InputMode::Overlay, "📸 Photo + annotate")
                        .changed();
                if changed {
                    self.state.select_mode(mode);
                }

                ui.add_space(self.theme.spacing);

                ui.label(
                    RichText::new("What should it do?")
                        .size(14.0)
                        .strong()
                        .color(self.theme.text_primary),
                );
                egui::ComboBox::from_id_salt("prompt_kind")
                    .selected_text(self.state.prompt.label())
                    .show_ui(ui, |ui| {
                        for kind in PromptKind::ALL {
                            ui.selectable_value(&mut self.state.prompt, kind, kind.label());
                        }
                    });

                ui.add_space(self.theme.spacing);

                if ui.button("🧹 Clear drawing").clicked() {
                    self.state.clear_drawing();
                }

                ui.add_space(self.theme.spacing_sm);

                let asking = self.state.is_asking();
                if ui
                    .add_enabled(!asking, egui::Button::new("🤖 Ask"))
                    .clicked()
                {
                    self.state.submit_ask();
                }
                if asking {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(
                            RichText::new("Thinking…")
                                .size(12.0)
                                .color(self.theme.text_muted),
                        );
                    });
                }

                ui.add_space(self.theme.spacing);

                if let Some(error) = &self.state.last_error {
                    ui.label(RichText::new(format!("❌ {error}")).color(self.theme.error));
                } else if let Some(status) = &self.state.status {
                    ui.label(RichText::new(format!("✅ {status}")).color(self.theme.success));
                }
            });
    }

    /// Show the history side panel when open
    fn show_history(&mut self, ctx: &egui::Context) {
        if !self.state.show_history {
            return;
        }
        SidePanel::right("history")
            .resizable(true)
            .default_width(280.0)
            .min_width(220.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                HistoryPanel::new(&self.state, &self.theme).show(ui);
            });
    }

    /// Show the canvas and the last response
    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::both()
                    .id_salt("content")
                    .show(ui, |ui| {
                        CanvasView::new(&mut self.state, &self.theme).show(ui);
                        ui.add_space(self.theme.spacing);
                        ResponsePanel::new(&mut self.state, &self.theme).show(ui);
                    });
            });
    }
}

impl eframe::App for SketchSolveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.initialize();
        self.state.poll_events();

        self.show_header(ctx);
        self.show_controls(ctx);
        self.show_history(ctx);
        self.show_content(ctx);

        // Keep polling while a request, synthesis, or playback is in flight
        if self.state.is_asking() || self.state.pending_tts.is_some() || self.state.is_playing {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
