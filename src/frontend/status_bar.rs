//! Status bar panel: acquisition state, runtime, counters and last error.

use egui::{Color32, RichText, Ui};

use crate::frontend::coordinator::StatusView;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub status: &'a StatusView,
    pub running: bool,
    pub error_count: u64,
    pub last_error: Option<&'a str>,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // === State dot + label ===
        let state_color = if ctx.running {
            Color32::GREEN
        } else {
            Color32::GRAY
        };
        ui.colored_label(state_color, "●");
        ui.label(RichText::new(ctx.status.state).small());

        if ctx.status.runtime.visible {
            ui.separator();
            ui.label(RichText::new(&ctx.status.runtime.text).small());
        }

        if ctx.status.stats.visible {
            ui.separator();
            let stats_color = if ctx.error_count > 0 {
                Color32::LIGHT_RED
            } else {
                Color32::GRAY
            };
            // egui does not expand tabs
            let text = ctx.status.stats.text.replace('\t', "  ");
            ui.colored_label(stats_color, RichText::new(text).small());
        }

        // === Error message (right-aligned) ===
        if let Some(error) = ctx.last_error {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(error).small());
            });
        }
    });
}
