// src/flow.rs
//
// Dense optical flow between consecutive grayscale frames. The numerics are
// OpenCV's Farneback implementation; this module only owns the calling
// contract (equal-size inputs, fixed parameters) and the shape of the output.

use crate::error::{FlowError, FlowResult};
use crate::types::{FlowParams, GrayFrame};
use opencv::{
    core::{self, Mat, Scalar},
    prelude::*,
    video,
};

/// Per-pixel displacement field (CV_32FC2), same size as the gray pair.
#[derive(Debug)]
pub struct FlowField(pub Mat);

impl FlowField {
    /// Field with zero displacement everywhere.
    #[cfg(test)]
    pub fn zeros(width: i32, height: i32) -> FlowResult<Self> {
        let mat =
            Mat::new_rows_cols_with_default(height, width, core::CV_32FC2, Scalar::all(0.0))?;
        Ok(Self(mat))
    }

    pub fn width(&self) -> i32 {
        self.0.cols()
    }

    pub fn height(&self) -> i32 {
        self.0.rows()
    }

    /// Displacement `(dx, dy)` at pixel `(x, y)`.
    pub fn vector_at(&self, x: i32, y: i32) -> FlowResult<(f32, f32)> {
        let v = self.0.at_2d::<core::Vec2f>(y, x)?;
        Ok((v[0], v[1]))
    }

    #[cfg(test)]
    pub fn set_vector(&mut self, x: i32, y: i32, dx: f32, dy: f32) -> FlowResult<()> {
        let v = self.0.at_2d_mut::<core::Vec2f>(y, x)?;
        v[0] = dx;
        v[1] = dy;
        Ok(())
    }
}

pub trait FlowEstimator {
    fn estimate(&mut self, prev: &GrayFrame, curr: &GrayFrame) -> FlowResult<FlowField>;
}

pub struct FarnebackEstimator {
    params: FlowParams,
}

impl FarnebackEstimator {
    pub fn new(params: FlowParams) -> Self {
        Self { params }
    }
}

impl FlowEstimator for FarnebackEstimator {
    fn estimate(&mut self, prev: &GrayFrame, curr: &GrayFrame) -> FlowResult<FlowField> {
        let prev_dims = (prev.width(), prev.height());
        let curr_dims = (curr.width(), curr.height());
        if prev_dims != curr_dims {
            return Err(FlowError::DimensionMismatch {
                prev: prev_dims,
                curr: curr_dims,
            });
        }

        let p = &self.params;
        let mut flow = Mat::default();
        video::calc_optical_flow_farneback(
            prev.mat(),
            curr.mat(),
            &mut flow,
            p.pyr_scale,
            p.levels,
            p.winsize,
            p.iterations,
            p.poly_n,
            p.poly_sigma,
            p.flags,
        )?;

        Ok(FlowField(flow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: i32, height: i32, value: f64) -> GrayFrame {
        GrayFrame(
            Mat::new_rows_cols_with_default(height, width, core::CV_8UC1, Scalar::all(value))
                .unwrap(),
        )
    }

    /// Gray frame with a bright square whose top-left corner sits at (ox, oy).
    fn square(width: i32, height: i32, ox: i32, oy: i32) -> GrayFrame {
        let mut frame = gray(width, height, 40.0);
        for y in oy..oy + 40 {
            for x in ox..ox + 40 {
                *frame.0.at_2d_mut::<u8>(y, x).unwrap() = 220;
            }
        }
        frame
    }

    #[test]
    fn test_flow_field_matches_input_dimensions() {
        let mut estimator = FarnebackEstimator::new(FlowParams::default());
        let prev = gray(960, 720, 128.0);
        let curr = gray(960, 720, 128.0);

        let flow = estimator.estimate(&prev, &curr).unwrap();
        assert_eq!(flow.width(), 960);
        assert_eq!(flow.height(), 720);
        assert_eq!(flow.0.channels(), 2);
        assert_eq!(flow.0.typ(), core::CV_32FC2);
    }

    #[test]
    fn test_flow_field_small_frames() {
        let mut estimator = FarnebackEstimator::new(FlowParams::default());
        let flow = estimator
            .estimate(&gray(64, 48, 10.0), &gray(64, 48, 10.0))
            .unwrap();
        assert_eq!((flow.width(), flow.height()), (64, 48));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut estimator = FarnebackEstimator::new(FlowParams::default());
        let result = estimator.estimate(&gray(960, 720, 0.0), &gray(640, 480, 0.0));

        match result {
            Err(FlowError::DimensionMismatch { prev, curr }) => {
                assert_eq!(prev, (960, 720));
                assert_eq!(curr, (640, 480));
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_horizontal_shift_is_detected() {
        let mut estimator = FarnebackEstimator::new(FlowParams::default());
        let prev = square(160, 120, 60, 40);
        let curr = square(160, 120, 63, 40);

        let flow = estimator.estimate(&prev, &curr).unwrap();
        // left edge of the square
        let (dx, _) = flow.vector_at(62, 60).unwrap();
        assert!(dx > 0.5, "expected rightward motion, got dx={}", dx);
    }

    #[test]
    fn test_zeros_field() {
        let flow = FlowField::zeros(30, 20).unwrap();
        assert_eq!((flow.width(), flow.height()), (30, 20));
        assert_eq!(flow.vector_at(29, 19).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_set_vector_roundtrip_single_cell() {
        let mut flow = FlowField::zeros(10, 10).unwrap();
        flow.set_vector(3, 7, 1.5, -2.25).unwrap();
        assert_eq!(flow.vector_at(3, 7).unwrap(), (1.5, -2.25));
        assert_eq!(flow.vector_at(7, 3).unwrap(), (0.0, 0.0));
    }
}
