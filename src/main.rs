use chart_desk::api::{EhrApi, HttpEhrClient, OfflineApi};
use chart_desk::desk::{Desk, DeskOptions};
use chart_desk::drafts::DraftStore;
use chart_desk::gui::DeskApp;
use chart_desk::logging;
use chart_desk::settings::Settings;

use eframe::egui;
use std::sync::Arc;

const SETTINGS_FILE: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.clone());

    let api: Arc<dyn EhrApi> = match settings.api_config()? {
        Some(config) => {
            tracing::info!(base = %config.base_url, "using EHR api");
            Arc::new(HttpEhrClient::new(config)?)
        }
        None => {
            tracing::info!("no api base url configured; running offline");
            Arc::new(OfflineApi)
        }
    };

    let drafts = DraftStore::new(settings.draft_dir());
    let mut desk = Desk::new(DeskOptions::from(&settings), api, Some(drafts));
    desk.restore_drafts();
    desk.load_lists();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Chart Desk",
        native_options,
        Box::new(move |_cc| Box::new(DeskApp::new(desk, &settings))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}
