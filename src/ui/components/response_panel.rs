//! Response panel component
//!
//! Displays the last AI response with its read-aloud and export actions.

use egui::{self, RichText};
use tracing::error;

use crate::export;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;

/// Response panel component
pub struct ResponsePanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> ResponsePanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let Some(record) = self.state.history.last() else {
            return;
        };

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.label(
                    RichText::new("SketchSolve says")
                        .size(16.0)
                        .strong()
                        .color(self.theme.primary),
                );
                ui.label(
                    RichText::new(record.prompt.label())
                        .size(11.0)
                        .color(self.theme.text_muted),
                );
                ui.add_space(self.theme.spacing_sm);

                egui::ScrollArea::vertical()
                    .id_salt("response_text")
                    .max_height(200.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(&record.text).color(self.theme.text_primary));
                    });

                ui.add_space(self.theme.spacing_sm);

                ui.horizontal(|ui| {
                    if self.state.is_playing {
                        if ui.button("⏹ Stop").clicked() {
                            self.state.stop_audio();
                        }
                    } else {
                        let synthesizing = self.state.pending_tts.is_some();
                        if ui
                            .add_enabled(!synthesizing, egui::Button::new("🔊 Read aloud"))
                            .clicked()
                        {
                            self.state.request_speech();
                        }
                        if synthesizing {
                            ui.spinner();
                        }
                    }

                    if ui.button("💾 Save text").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_file_name(export::default_text_name())
                            .save_file()
                        {
                            if let Err(e) = export::save_text(&path, &record.text) {
                                error!("text export failed: {}", e);
                                self.state.last_error = Some(e.user_message());
                            }
                        }
                    }

                    let audio = self.state.last_audio.clone();
                    if let Some(mp3) = audio {
                        if ui.button("📥 Save MP3").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .set_file_name(export::default_audio_name())
                                .save_file()
                            {
                                if let Err(e) = export::save_audio(&path, &mp3) {
                                    error!("audio export failed: {}", e);
                                    self.state.last_error = Some(e.user_message());
                                }
                            }
                        }
                    }
                });
            });
    }
}
