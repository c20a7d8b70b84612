//! UI view modules: pure rendering functions.
//!
//! Each submodule renders one panel. Views read from [`AppState`] and send
//! [`UiEvent`]s on user interaction. No async, no network, no contract logic.
//!
//! [`AppState`]: crate::state::AppState
//! [`UiEvent`]: crate::events::UiEvent

pub mod activity;
pub mod header;
pub mod markets;
pub mod positions;

use egui::Color32;
use polylend_core::RiskLevel;

/// Health factor colour: green at 2.0 and above, yellow from 1.2, red below.
pub fn risk_color(risk: RiskLevel) -> Color32 {
    match risk {
        RiskLevel::Healthy => Color32::GREEN,
        RiskLevel::Caution => Color32::YELLOW,
        RiskLevel::AtRisk => Color32::RED,
    }
}
