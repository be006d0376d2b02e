// src/capture.rs

use crate::error::{FlowError, FlowResult};
use crate::types::Frame;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, info, warn};

/// Anything that hands out BGR frames one blocking read at a time.
pub trait FrameSource {
    fn read_frame(&mut self) -> FlowResult<Frame>;

    /// Give the underlying device back. Must be safe to call more than once.
    fn release(&mut self) -> FlowResult<()> {
        Ok(())
    }
}

pub struct CameraSource {
    cap: VideoCapture,
    device_index: i32,
    released: bool,
}

impl CameraSource {
    pub fn open(device_index: i32) -> FlowResult<Self> {
        info!("Opening camera device {}", device_index);

        let cap = match VideoCapture::new(device_index, videoio::CAP_ANY) {
            Ok(cap) => cap,
            Err(e) => {
                debug!("VideoCapture::new failed: {}", e);
                return Err(FlowError::DeviceUnavailable {
                    index: device_index,
                });
            }
        };

        if !cap.is_opened().unwrap_or(false) {
            return Err(FlowError::DeviceUnavailable {
                index: device_index,
            });
        }

        let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        let fps = cap.get(videoio::CAP_PROP_FPS)?;

        info!(
            "Camera properties: {}x{} @ {:.1} FPS (native)",
            width, height, fps
        );

        Ok(Self {
            cap,
            device_index,
            released: false,
        })
    }
}

impl FrameSource for CameraSource {
    fn read_frame(&mut self) -> FlowResult<Frame> {
        if self.released {
            return Err(FlowError::CaptureFailed("device already released".into()));
        }

        let mut mat = Mat::default();
        let ok = self
            .cap
            .read(&mut mat)
            .map_err(|e| FlowError::CaptureFailed(e.to_string()))?;

        if !ok || mat.empty() {
            return Err(FlowError::CaptureFailed("no frame returned by device".into()));
        }

        Ok(Frame(mat))
    }

    fn release(&mut self) -> FlowResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.cap.release()?;
        info!("Camera device {} released", self.device_index);
        Ok(())
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = FrameSource::release(self) {
            warn!("Failed to release camera device {}: {}", self.device_index, e);
        }
    }
}
