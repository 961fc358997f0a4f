// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Exploded View
//!
//! A desktop editor for placing numbered callout markers on 700x900
//! product illustrations and saving them as self-contained SVG artifacts
//! that always keep the untouched original image.

mod app;
mod config;
mod editor;
mod error;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::ExplodedViewApp;
use config::EditorConfig;

fn main() -> Result<()> {
    let config = EditorConfig::load()?;

    // Initialize logging, RUST_LOG overrides the configured filter
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    log::info!("Storing exploded views in {}", config.storage_dir.display());

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Exploded View"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Exploded View",
        options,
        Box::new(|_cc| Ok(Box::new(ExplodedViewApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
