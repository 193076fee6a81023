mod app;

use app::StudyApp;
use env_logger::Env;
use log::{error, info, warn};
use studybuddy::config::{self, StudyConfig};
use studybuddy::context::AppContext;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::load_config()
        .unwrap_or_else(|e| {
            warn!("{}, using defaults", e);
            StudyConfig::default()
        })
        .resolve();

    let context = match AppContext::initialize(config) {
        Ok(context) => context,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("StudyBuddy starting with app id '{}'", context.config.app_id);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(context.config.window_size),
        ..Default::default()
    };
    eframe::run_native(
        "StudyBuddy",
        options,
        Box::new(|_cc| Ok(Box::new(StudyApp::new(context)))),
    )
}
