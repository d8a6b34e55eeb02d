//! History panel component
//!
//! Numbered list of every successful exchange in this session, newest last.

use egui::{self, RichText};

use crate::ui::state::AppState;
use crate::ui::theme::Theme;

/// History panel component
pub struct HistoryPanel<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> HistoryPanel<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let records = self.state.history.get_all();

        ui.label(
            RichText::new("History")
                .size(16.0)
                .strong()
                .color(self.theme.text_primary),
        );
        ui.add_space(self.theme.spacing_sm);

        if records.is_empty() {
            ui.label(
                RichText::new("Nothing asked yet this session.")
                    .size(12.0)
                    .color(self.theme.text_muted),
            );
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("history_list")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (i, record) in records.iter().enumerate() {
                    egui::Frame::none()
                        .fill(self.theme.bg_secondary)
                        .rounding(self.theme.card_rounding)
                        .inner_margin(self.theme.spacing_sm)
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(format!("{}. {}", i + 1, record.prompt.label()))
                                        .size(12.0)
                                        .strong()
                                        .color(self.theme.primary),
                                );
                                ui.label(
                                    RichText::new(record.timestamp.format("%H:%M").to_string())
                                        .size(10.0)
                                        .color(self.theme.text_muted),
                                );
                            });
                            ui.label(
                                RichText::new(&record.text)
                                    .size(12.0)
                                    .color(self.theme.text_secondary),
                            );
                        });
                    ui.add_space(self.theme.spacing_sm);
                }
            });
    }
}
