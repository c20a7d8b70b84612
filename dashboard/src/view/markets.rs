//! Market table.

use egui::Ui;
use egui_extras::{Column, TableBuilder};
use polylend_core::{AssetId, MarketData};

use crate::state::AppState;

const COLUMNS: [&str; 6] = [
    "Asset",
    "Total Supplied",
    "Total Borrowed",
    "Supply APY",
    "Borrow APY",
    "Available",
];

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui| {
        ui.heading("Markets");
        if let Some(at) = state.last_refresh {
            ui.label(
                egui::RichText::new(format!("updated {}", at.format("%H:%M:%S")))
                    .color(egui::Color32::GRAY),
            );
        }
    });
    ui.add_space(5.0);

    if state.markets.is_empty() {
        ui.label(
            egui::RichText::new("Loading markets...")
                .color(egui::Color32::GRAY)
                .italics(),
        );
        return;
    }

    let places = state.decimal_places;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(80.0))
        .columns(Column::remainder(), COLUMNS.len() - 1)
        .header(22.0, |mut header| {
            for title in COLUMNS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for asset in AssetId::ALL {
                let Some(data) = state.markets.get(asset) else {
                    continue;
                };
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(asset.symbol());
                    });
                    match data {
                        MarketData::Live(m) => {
                            let cells = [
                                m.amount_display(m.total_supplied, places),
                                m.amount_display(m.total_borrowed, places),
                                m.supply_apy(),
                                m.borrow_apy(),
                                m.amount_display(m.available_liquidity, places),
                            ];
                            for cell in cells {
                                row.col(|ui| {
                                    ui.label(cell);
                                });
                            }
                        }
                        MarketData::Unavailable { reason } => {
                            for _ in 1..COLUMNS.len() {
                                row.col(|ui| {
                                    ui.label(
                                        egui::RichText::new("unavailable")
                                            .color(egui::Color32::GRAY)
                                            .italics(),
                                    )
                                    .on_hover_text(reason.as_str());
                                });
                            }
                        }
                    }
                });
            }
        });
}
