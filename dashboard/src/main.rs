use eframe::egui;

mod app;
mod config;
mod contracts;
mod events;
mod rpc_client;
mod service;
mod state;
mod view;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    env_logger::init();

    let config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default config: {}", e);
            config::Config::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([760.0, 560.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "PolyLend Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, config)))),
    );

    drop(_guard);
    rt.shutdown_timeout(std::time::Duration::from_secs(2));

    Ok(result?)
}
