// main.rs - Conway's Game of Life window
// The simulation runs on its own engine thread; the window only sends intents
// and repaints when a new snapshot is published.

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use eframe::egui;
use life_core::{LifeConfig, Simulation, spawn_engine_thread};
use log::info;

mod ui;

use ui::LifeApp;

const CONFIG_PATH: &str = "life.toml";

fn main() -> Result<()> {
    env_logger::init();

    let config = LifeConfig::load_or_default(CONFIG_PATH)?;
    info!(
        "Board {}x{}, step every {} ms",
        config.rows, config.cols, config.step_delay_ms
    );

    let simulation = Simulation::new(&config)?;

    // The egui context only exists once the window is up.
    let repaint: Arc<OnceLock<egui::Context>> = Arc::default();
    let notify = Arc::clone(&repaint);
    let (handle, _engine) = spawn_engine_thread(simulation, move || {
        if let Some(ctx) = notify.get() {
            ctx.request_repaint();
        }
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 950.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(move |cc| {
            let _ = repaint.set(cc.egui_ctx.clone());
            Box::new(LifeApp::new(handle))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Window closed with an error: {e}"))?;

    info!("Window closed");
    Ok(())
}
