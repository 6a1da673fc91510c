mod api;
mod app;
mod catalog;
mod event;
mod insights;
mod prefs;
mod session;
mod theme;
mod ui;

use api::{ApiClient, Endpoints};
use app::TangramApp;
use eframe::egui;
use prefs::FileStorage;
use std::sync::mpsc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tangram-runtime")
        .build()?;

    let endpoints = Endpoints::from_env();
    let api = runtime.block_on(async { ApiClient::new(endpoints, tx.clone()) })?;

    let storage = Box::new(FileStorage::load_default());
    let app = TangramApp::new(rx, api, storage);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tangram",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
