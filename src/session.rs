// src/session.rs
//
// The capture → flow → overlay → display loop.
//
//   RUNNING ── capture failed ──► STOPPED(CaptureFailed)
//      │
//      └────── quit key ────────► STOPPED(QuitRequested)
//
// RUNNING is the loop body; leaving it yields the StopReason.
//
// The previous gray frame is the only state carried between iterations. The
// capture source and display are owned here, so both are released on every
// exit path, `?` included.

use crate::capture::FrameSource;
use crate::display::{is_quit_key, DisplaySurface};
use crate::error::FlowResult;
use crate::flow::FlowEstimator;
use crate::overlay::{render_flow, ArrowStyle};
use crate::preprocessing::preprocess;
use crate::types::Config;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const PROGRESS_LOG_INTERVAL: u64 = 300;

/// Why a session entered STOPPED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CaptureFailed,
    QuitRequested,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Loop iterations that reached the display
    pub frames_processed: u64,
    pub arrows_drawn: u64,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

impl SessionReport {
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.01 {
            self.frames_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Run one capture session until the source fails or the quit key is pressed.
///
/// `open_source` runs first; if it fails nothing else happens (no display is
/// created, no flow is computed). The first frame is read and preprocessed
/// before the display is opened, establishing the initial previous frame.
pub fn run_session<S, D, E, OS, OD>(
    open_source: OS,
    open_display: OD,
    estimator: &mut E,
    config: &Config,
) -> Result<SessionReport>
where
    S: FrameSource,
    D: DisplaySurface,
    E: FlowEstimator,
    OS: FnOnce() -> FlowResult<S>,
    OD: FnOnce(&Config) -> FlowResult<D>,
{
    let mut source = open_source()?;
    let target = config.camera.target_size();

    let first = source.read_frame().context("reading first frame")?;
    debug!("First frame {}x{}", first.width(), first.height());
    let (_, mut prev_gray) = preprocess(&first, target)?;

    let mut display = open_display(config)?;
    let style = ArrowStyle::from(&config.arrows);
    let stride = config.arrows.stride;

    info!(
        "▶ Session running at {}x{} (stride {}px, press '{}' to quit)",
        target.width, target.height, stride, config.display.quit_key
    );

    let started_at = Instant::now();
    let mut frames_processed: u64 = 0;
    let mut arrows_drawn: u64 = 0;

    let stop_reason = loop {
        let raw = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("{}", e);
                break StopReason::CaptureFailed;
            }
        };

        let (mut frame, gray) = preprocess(&raw, target)?;
        let flow = estimator.estimate(&prev_gray, &gray)?;
        let drawn = render_flow(&mut frame, &flow, stride, &style)?;
        display.show(&frame)?;

        frames_processed += 1;
        arrows_drawn += drawn as u64;

        if frames_processed % PROGRESS_LOG_INTERVAL == 0 {
            debug!(
                "Frame {}: {} arrows, {:.1} FPS",
                frames_processed,
                drawn,
                frames_processed as f64 / started_at.elapsed().as_secs_f64().max(0.001)
            );
        }

        let key = display.wait_key()?;
        if is_quit_key(key, config.display.quit_key) {
            info!("Quit key pressed");
            break StopReason::QuitRequested;
        }

        prev_gray = gray;
    };

    if let Err(e) = source.release() {
        warn!("Failed to release capture source: {}", e);
    }
    drop(display);

    Ok(SessionReport {
        frames_processed,
        arrows_drawn,
        stop_reason,
        elapsed: started_at.elapsed(),
    })
}
