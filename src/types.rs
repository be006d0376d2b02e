use opencv::core::{Mat, Size};
use opencv::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub flow: FlowParams,
    pub arrows: ArrowConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device_index: i32,
    pub resize_width: i32,
    pub resize_height: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            resize_width: 960,
            resize_height: 720,
        }
    }
}

impl CameraConfig {
    pub fn target_size(&self) -> Size {
        Size::new(self.resize_width, self.resize_height)
    }
}

/// Farneback parameters, passed through to OpenCV unchanged on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Scale between pyramid layers (0.5 = classical pyramid)
    pub pyr_scale: f64,
    /// Number of pyramid layers including the initial image
    pub levels: i32,
    /// Averaging window size
    pub winsize: i32,
    /// Iterations at each pyramid level
    pub iterations: i32,
    /// Pixel neighborhood used for the polynomial expansion (5 or 7)
    pub poly_n: i32,
    /// Gaussian sigma for smoothing the polynomial expansion derivatives
    pub poly_sigma: f64,
    /// OPTFLOW_USE_INITIAL_FLOW / OPTFLOW_FARNEBACK_GAUSSIAN bits
    pub flags: i32,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            pyr_scale: 0.5,
            levels: 3,
            winsize: 15,
            iterations: 3,
            poly_n: 5,
            poly_sigma: 1.2,
            flags: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    pub stride: usize,
    /// BGR
    pub color: [f64; 3],
    pub thickness: i32,
    /// Arrow head length as a fraction of the arrow length
    pub tip_length: f64,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            stride: 15,
            color: [0.0, 255.0, 0.0],
            thickness: 1,
            tip_length: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_name: String,
    pub quit_key: char,
    pub wait_ms: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_name: "Optical Flow (Arrows)".to_string(),
            quit_key: 'q',
            wait_ms: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "optical_flow_arrows=info".to_string(),
        }
    }
}

/// BGR color frame (CV_8UC3), owned by a single loop iteration.
#[derive(Debug)]
pub struct Frame(pub Mat);

/// Single-channel grayscale frame (CV_8UC1).
#[derive(Debug)]
pub struct GrayFrame(pub Mat);

impl Frame {
    pub fn mat(&self) -> &Mat {
        &self.0
    }

    pub fn mat_mut(&mut self) -> &mut Mat {
        &mut self.0
    }

    pub fn width(&self) -> i32 {
        self.0.cols()
    }

    pub fn height(&self) -> i32 {
        self.0.rows()
    }
}

impl GrayFrame {
    pub fn mat(&self) -> &Mat {
        &self.0
    }

    pub fn width(&self) -> i32 {
        self.0.cols()
    }

    pub fn height(&self) -> i32 {
        self.0.rows()
    }
}
