// src/main.rs

mod capture;
mod config;
mod display;
mod error;
mod flow;
mod overlay;
mod preprocessing;
mod session;
mod types;

use anyhow::Result;
use capture::CameraSource;
use display::HighguiWindow;
use flow::FarnebackEstimator;
use session::StopReason;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use types::Config;

const CONFIG_PATH: &str = "config.yaml";

fn main() -> Result<()> {
    let loaded = Config::load_optional(CONFIG_PATH)?;
    let from_file = loaded.is_some();
    let config = loaded.unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🎥 Optical Flow (Arrows) starting");
    if from_file {
        info!("✓ Configuration loaded from {}", CONFIG_PATH);
    } else {
        info!("✓ No {} found, using built-in defaults", CONFIG_PATH);
    }

    info!(
        "Flow params: pyr_scale={:.2}, levels={}, winsize={}, iterations={}, poly_n={}, poly_sigma={:.2}, flags={}",
        config.flow.pyr_scale,
        config.flow.levels,
        config.flow.winsize,
        config.flow.iterations,
        config.flow.poly_n,
        config.flow.poly_sigma,
        config.flow.flags
    );

    let mut estimator = FarnebackEstimator::new(config.flow);
    let device_index = config.camera.device_index;

    let report = session::run_session(
        || CameraSource::open(device_index),
        |cfg: &Config| {
            HighguiWindow::create(
                &cfg.display,
                cfg.camera.resize_width,
                cfg.camera.resize_height,
            )
        },
        &mut estimator,
        &config,
    );

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };

    info!("\n✓ Session ended");
    info!(
        "  Reason: {}",
        match report.stop_reason {
            StopReason::QuitRequested => "quit key",
            StopReason::CaptureFailed => "capture failed",
        }
    );
    info!("  Frames processed: {}", report.frames_processed);
    info!("  Arrows drawn: {}", report.arrows_drawn);
    info!("  Processing speed: {:.1} FPS", report.fps());

    Ok(())
}
