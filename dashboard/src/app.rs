//! Application struct: the eframe::App implementation.
//!
//! Thin wrapper: drains service events, dispatches to view modules.
//! No async, no network, no contract logic.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::{ServiceEvent, UiEvent};
use crate::state::AppState;
use crate::view;

/// The dashboard application.
pub struct App {
    pub state: AppState,
    pub ui_tx: mpsc::UnboundedSender<UiEvent>,
    svc_rx: mpsc::UnboundedReceiver<ServiceEvent>,
    shutdown_token: CancellationToken,
}

impl App {
    /// Create a new App, spawning the background service task.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (svc_tx, svc_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let state = AppState::with_decimal_places(config.decimal_places);

        let svc_token = token.clone();
        tokio::spawn(crate::service::run(svc_token, ui_rx, svc_tx, config));

        Self {
            state,
            ui_tx,
            svc_rx,
            shutdown_token: token,
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.ui_tx.send(UiEvent::Shutdown);
        self.shutdown_token.cancel();
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Ensure we repaint regularly to pick up background service events
        ctx.request_repaint_after(std::time::Duration::from_secs(1));

        // 1. Drain all pending service events (non-blocking)
        while let Ok(event) = self.svc_rx.try_recv() {
            self.state.apply(event);
            ctx.request_repaint();
        }

        // 2. Header
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            view::header::show(ui, &mut self.state, &self.ui_tx);
            ui.add_space(6.0);
        });

        // 3. Activity log
        egui::TopBottomPanel::bottom("activity")
            .resizable(true)
            .show(ctx, |ui| {
                view::activity::show(ui, &self.state);
            });

        // 4. Positions and markets
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                view::positions::show(ui, &mut self.state, &self.ui_tx);
                ui.add_space(15.0);
                ui.separator();
                view::markets::show(ui, &self.state);
            });
        });
    }
}
