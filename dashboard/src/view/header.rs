//! Header bar: account, health factor, connect/disconnect.

use egui::Ui;
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::state::AppState;
use crate::view::risk_color;

pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.horizontal(|ui| {
        ui.heading("PolyLend");
        ui.add_space(10.0);

        if ui
            .add_enabled(state.is_connected(), egui::Button::new("Refresh"))
            .clicked()
        {
            let _ = ui_tx.send(UiEvent::Refresh);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match state.account_label() {
                Some(label) => {
                    if ui.button("Disconnect").clicked() {
                        let _ = ui_tx.send(UiEvent::Disconnect);
                    }
                    ui.label(egui::RichText::new(label).monospace());
                    if let Some(chain_id) = state.chain_id {
                        ui.label(
                            egui::RichText::new(format!("chain {}", chain_id))
                                .color(egui::Color32::GRAY),
                        );
                    }

                    ui.add_space(15.0);
                    let health = egui::RichText::new(state.health_label()).strong();
                    let health = match state.health_risk() {
                        Some(risk) => health.color(risk_color(risk)),
                        None => health.color(egui::Color32::GRAY),
                    };
                    ui.label(health);
                    ui.label("Health Factor:");
                }
                None => {
                    let label = if state.connecting {
                        "Connecting..."
                    } else {
                        "Connect Wallet"
                    };
                    if ui
                        .add_enabled(!state.connecting, egui::Button::new(label))
                        .clicked()
                    {
                        state.connecting = true;
                        let _ = ui_tx.send(UiEvent::Connect);
                    }
                }
            }
        });
    });

    if let Some((expected, actual)) = state.wrong_network {
        ui.horizontal(|ui| {
            ui.colored_label(
                egui::Color32::YELLOW,
                format!("Wallet is on chain {}, PolyLend runs on chain {}", actual, expected),
            );
            if ui.button("Switch network").clicked() {
                state.wrong_network = None;
                let _ = ui_tx.send(UiEvent::SwitchNetwork);
            }
        });
    }
}
