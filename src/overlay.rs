// src/overlay.rs
//
// Flow-vector arrows drawn over the live frame.
//
// The field is sampled on a fixed grid (every `stride` pixels in both axes,
// starting at the top-left corner). Each sample becomes one arrow from the
// pixel to the pixel displaced by its flow vector.

use opencv::{
    core::{self, Scalar},
    imgproc,
};

use crate::error::FlowResult;
use crate::flow::FlowField;
use crate::types::{ArrowConfig, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrow {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl Arrow {
    #[cfg(test)]
    pub fn is_zero_length(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArrowStyle {
    pub color: Scalar,
    pub thickness: i32,
    pub tip_length: f64,
}

impl From<&ArrowConfig> for ArrowStyle {
    fn from(cfg: &ArrowConfig) -> Self {
        Self {
            color: Scalar::new(cfg.color[0], cfg.color[1], cfg.color[2], 0.0),
            thickness: cfg.thickness,
            tip_length: cfg.tip_length,
        }
    }
}

/// Row-major grid of sample points `(x, y)` inside a `width x height` field.
///
/// Yields `ceil(height / stride) * ceil(width / stride)` points. A stride of 0
/// yields nothing.
pub fn grid_points(width: i32, height: i32, stride: usize) -> impl Iterator<Item = (i32, i32)> {
    let (width, height) = (width.max(0), height.max(0));
    let stride = if stride == 0 { None } else { Some(stride) };

    stride.into_iter().flat_map(move |stride| {
        (0..height)
            .step_by(stride)
            .flat_map(move |y| (0..width).step_by(stride).map(move |x| (x, y)))
    })
}

/// End point of the arrow starting at `(x, y)`: the displacement is truncated
/// toward zero before being added. Non-finite or huge displacements clamp to
/// the i32 range instead of overflowing.
pub fn arrow_endpoint(x: i32, y: i32, dx: f32, dy: f32) -> (i32, i32) {
    (
        x.saturating_add(dx.trunc() as i32),
        y.saturating_add(dy.trunc() as i32),
    )
}

pub fn plan_arrows(flow: &FlowField, stride: usize) -> FlowResult<Vec<Arrow>> {
    let mut arrows = Vec::new();

    for (x, y) in grid_points(flow.width(), flow.height(), stride) {
        let (dx, dy) = flow.vector_at(x, y)?;
        arrows.push(Arrow {
            start: (x, y),
            end: arrow_endpoint(x, y, dx, dy),
        });
    }

    Ok(arrows)
}

pub fn draw_arrows(frame: &mut Frame, arrows: &[Arrow], style: &ArrowStyle) -> FlowResult<()> {
    for arrow in arrows {
        imgproc::arrowed_line(
            frame.mat_mut(),
            core::Point::new(arrow.start.0, arrow.start.1),
            core::Point::new(arrow.end.0, arrow.end.1),
            style.color,
            style.thickness,
            imgproc::LINE_8,
            0,
            style.tip_length,
        )?;
    }
    Ok(())
}

/// Sample `flow` and draw the arrows onto `frame` in place. Returns the
/// number of arrows drawn.
pub fn render_flow(
    frame: &mut Frame,
    flow: &FlowField,
    stride: usize,
    style: &ArrowStyle,
) -> FlowResult<usize> {
    let arrows = plan_arrows(flow, stride)?;
    draw_arrows(frame, &arrows, style)?;
    Ok(arrows.len())
}
