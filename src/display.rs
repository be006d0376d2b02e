use crate::error::FlowResult;
use crate::types::{DisplayConfig, Frame};
use opencv::highgui;
use tracing::{debug, warn};

/// On-screen sink for annotated frames plus the key-press poll that paces
/// the loop.
pub trait DisplaySurface {
    fn show(&mut self, frame: &Frame) -> FlowResult<()>;

    /// Wait up to the configured delay for a key press. Returns the raw key
    /// code, or -1 when no key was pressed.
    fn wait_key(&mut self) -> FlowResult<i32>;
}

/// A single resizable HighGUI window, destroyed when dropped.
pub struct HighguiWindow {
    name: String,
    wait_ms: i32,
}

impl HighguiWindow {
    pub fn create(config: &DisplayConfig, width: i32, height: i32) -> FlowResult<Self> {
        debug!("Creating display window '{}'", config.window_name);
        highgui::named_window(&config.window_name, highgui::WINDOW_NORMAL)?;
        highgui::resize_window(&config.window_name, width, height)?;

        Ok(Self {
            name: config.window_name.clone(),
            wait_ms: config.wait_ms,
        })
    }
}

impl DisplaySurface for HighguiWindow {
    fn show(&mut self, frame: &Frame) -> FlowResult<()> {
        highgui::imshow(&self.name, frame.mat())?;
        Ok(())
    }

    fn wait_key(&mut self) -> FlowResult<i32> {
        Ok(highgui::wait_key(self.wait_ms)?)
    }
}

impl Drop for HighguiWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.name) {
            warn!("Failed to destroy window '{}': {}", self.name, e);
        }
        debug!("Display window '{}' destroyed", self.name);
    }
}

/// True when `key` (as returned by `wait_key`) is the quit key.
pub fn is_quit_key(key: i32, quit_key: char) -> bool {
    key >= 0 && (key & 0xFF) == quit_key as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_key_matches_low_byte() {
        assert!(is_quit_key('q' as i32, 'q'));
        // some backends set modifier bits above the low byte
        assert!(is_quit_key(0x100000 | 'q' as i32, 'q'));
    }

    #[test]
    fn test_no_key_is_not_quit() {
        assert!(!is_quit_key(-1, 'q'));
        assert!(!is_quit_key('w' as i32, 'q'));
    }
}
