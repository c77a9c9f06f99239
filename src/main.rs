//! StudyShelf - study material browser
//!
//! Loads a manifest of subjects and their documents, shows them in a
//! collapsible navigation tree and displays the selected Markdown note or PDF.

mod app;
mod core;
mod ui;

use app::ShelfApp;
use crate::core::config::AppConfig;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting StudyShelf...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {:#}", e);
        AppConfig::default()
    });
    tracing::info!("Library: {}", config.library.base);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title("StudyShelf"),
        ..Default::default()
    };

    eframe::run_native(
        "StudyShelf",
        native_options,
        Box::new(move |cc| Ok(Box::new(ShelfApp::new(cc, config)))),
    )
}
