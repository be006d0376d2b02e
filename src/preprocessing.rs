// src/preprocessing.rs

use crate::error::FlowResult;
use crate::types::{Frame, GrayFrame};
use opencv::{
    core::{Mat, Size},
    imgproc,
};

/// Resize a captured frame to `target` and derive its grayscale copy.
///
/// Every frame goes through here, the very first one included, so all gray
/// frames handed to the flow estimator share the same dimensions.
pub fn preprocess(frame: &Frame, target: Size) -> FlowResult<(Frame, GrayFrame)> {
    let mut resized = Mat::default();
    imgproc::resize(
        frame.mat(),
        &mut resized,
        target,
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut gray = Mat::default();
    imgproc::cvt_color(&resized, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

    Ok((Frame(resized), GrayFrame(gray)))
}
