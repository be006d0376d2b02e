//! Typed errors for the capture → flow → overlay pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// Camera could not be opened at startup
    #[error("Could not open camera device {index}")]
    DeviceUnavailable { index: i32 },

    /// A frame read failed or returned an empty image
    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    /// Previous and current gray frames differ in size
    #[error("Frame dimensions changed mid-stream: previous {prev:?}, current {curr:?}")]
    DimensionMismatch { prev: (i32, i32), curr: (i32, i32) },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

pub type FlowResult<T> = std::result::Result<T, FlowError>;
