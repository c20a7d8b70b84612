//! Activity panel: results of actions and errors, newest first.

use egui::Ui;

use crate::state::{AppState, NoticeKind};

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.label(egui::RichText::new("Activity").strong());

    if state.notices.is_empty() {
        ui.label(egui::RichText::new("Nothing yet").color(egui::Color32::GRAY).italics());
        return;
    }

    egui::ScrollArea::vertical()
        .max_height(120.0)
        .show(ui, |ui| {
            for notice in state.notices.iter().rev() {
                let color = match notice.kind {
                    NoticeKind::Success => egui::Color32::GREEN,
                    NoticeKind::Error => egui::Color32::RED,
                };
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(notice.at.format("%H:%M:%S").to_string())
                            .color(egui::Color32::GRAY)
                            .monospace(),
                    );
                    ui.colored_label(color, notice.message.as_str());
                });
            }
        });
}
