use std::sync::Arc;

use tab_roi::api::HttpTabsClient;
use tab_roi::gui::TabRoiApp;
use tab_roi::logging;
use tab_roi::settings::Settings;

use eframe::egui;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load("settings.json")?;
    logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!(backend = %settings.backend_url, "starting");

    let backend = Arc::new(HttpTabsClient::new(
        &settings.backend_url,
        settings.request_timeout(),
    )?);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([620.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Guitar Tabs Generator",
        native_options,
        Box::new(move |_cc| Box::new(TabRoiApp::new(settings, backend))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start UI: {e}"))
}
