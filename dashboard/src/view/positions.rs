//! Per-asset positions with the amount field and action buttons.

use egui::Ui;
use polylend_core::{Action, AssetId};
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.heading("Your Positions");
    ui.add_space(5.0);

    if !state.is_connected() {
        ui.label(
            egui::RichText::new("Connect a wallet to see your positions")
                .color(egui::Color32::GRAY)
                .italics(),
        );
        return;
    }

    for asset in AssetId::ALL {
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            asset_card(ui, state, asset, ui_tx);
        });
        ui.add_space(6.0);
    }
}

fn asset_card(
    ui: &mut Ui,
    state: &mut AppState,
    asset: AssetId,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    let places = state.decimal_places;
    let position = state
        .positions
        .as_ref()
        .and_then(|account| account.position(asset));

    let (supplied, borrowed, wallet) = match position {
        Some(p) => (
            p.supplied_display(places),
            p.borrowed_display(places),
            p.wallet_display(places).unwrap_or_else(|| "?".to_string()),
        ),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(asset.symbol()).size(18.0).strong());
        ui.label(egui::RichText::new(asset.name()).color(egui::Color32::GRAY));
    });

    ui.horizontal(|ui| {
        ui.label(format!("Supplied: {}", supplied));
        ui.add_space(20.0);
        ui.label(format!("Borrowed: {}", borrowed));
        ui.add_space(20.0);
        ui.label(egui::RichText::new(format!("Wallet: {}", wallet)).color(egui::Color32::GRAY));
    });

    for action in Action::ALL {
        ui.horizontal(|ui| {
            let input = state.amount_input(asset, action);
            ui.add(
                egui::TextEdit::singleline(input)
                    .hint_text(format!("Amount in {}", asset.symbol()))
                    .desired_width(160.0),
            );
            let amount = input.clone();

            let busy = state.is_pending(asset, action);
            let label = if busy {
                format!("{}...", action.label())
            } else {
                action.label().to_string()
            };
            let enabled = !busy && !amount.trim().is_empty();
            if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                let _ = ui_tx.send(UiEvent::Submit {
                    asset,
                    action,
                    amount,
                });
            }
        });
    }
}
