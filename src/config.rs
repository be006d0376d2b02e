use crate::error::FlowError;
use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config file {}", path))?;
        let config = Self::from_yaml(&contents).with_context(|| format!("parsing {}", path))?;
        Ok(config)
    }

    /// Load `path` if it exists. `None` means the built-in defaults apply.
    pub fn load_optional(path: &str) -> Result<Option<Self>> {
        if Path::new(path).exists() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        let invalid = |msg: &str| Err(FlowError::InvalidConfig(msg.to_string()));

        if self.camera.resize_width <= 0 || self.camera.resize_height <= 0 {
            return invalid("camera.resize_width and camera.resize_height must be positive");
        }

        let flow = &self.flow;
        if !(flow.pyr_scale > 0.0 && flow.pyr_scale < 1.0) {
            return invalid("flow.pyr_scale must be in (0, 1)");
        }
        if flow.levels < 1 || flow.winsize < 1 || flow.iterations < 1 {
            return invalid("flow.levels, flow.winsize and flow.iterations must be >= 1");
        }
        if flow.poly_n != 5 && flow.poly_n != 7 {
            return invalid("flow.poly_n must be 5 or 7");
        }
        if flow.poly_sigma <= 0.0 {
            return invalid("flow.poly_sigma must be positive");
        }

        if self.arrows.stride == 0 {
            return invalid("arrows.stride must be at least 1");
        }
        if self.arrows.thickness <= 0 {
            return invalid("arrows.thickness must be positive");
        }
        if self.arrows.tip_length < 0.0 {
            return invalid("arrows.tip_length must not be negative");
        }

        if self.display.wait_ms < 1 {
            return invalid("display.wait_ms must be at least 1 (0 blocks until a key press)");
        }
        if !self.display.quit_key.is_ascii() {
            return invalid("display.quit_key must be an ASCII character");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_tunables() {
        let config = Config::default();
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.camera.resize_width, 960);
        assert_eq!(config.camera.resize_height, 720);
        assert_eq!(config.flow.pyr_scale, 0.5);
        assert_eq!(config.flow.levels, 3);
        assert_eq!(config.flow.winsize, 15);
        assert_eq!(config.flow.iterations, 3);
        assert_eq!(config.flow.poly_n, 5);
        assert_eq!(config.flow.poly_sigma, 1.2);
        assert_eq!(config.flow.flags, 0);
        assert_eq!(config.arrows.stride, 15);
        assert_eq!(config.arrows.color, [0.0, 255.0, 0.0]);
        assert_eq!(config.arrows.thickness, 1);
        assert_eq!(config.arrows.tip_length, 0.3);
        assert_eq!(config.display.quit_key, 'q');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("arrows:\n  stride: 20\n").unwrap();
        assert_eq!(config.arrows.stride, 20);
        assert_eq!(config.arrows.thickness, 1);
        assert_eq!(config.camera.resize_width, 960);
        assert_eq!(config.display.window_name, "Optical Flow (Arrows)");
    }

    #[test]
    fn test_quit_key_from_yaml() {
        let config = Config::from_yaml("display:\n  quit_key: \"x\"\n").unwrap();
        assert_eq!(config.display.quit_key, 'x');
    }

    #[test]
    fn test_zero_stride_rejected() {
        assert!(Config::from_yaml("arrows:\n  stride: 0\n").is_err());
    }

    #[test]
    fn test_invalid_poly_n_rejected() {
        let mut config = Config::default();
        config.flow.poly_n = 6;
        assert!(matches!(
            config.validate(),
            Err(FlowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_pyr_scale_bounds() {
        let mut config = Config::default();
        config.flow.pyr_scale = 1.0;
        assert!(config.validate().is_err());
        config.flow.pyr_scale = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_wait_ms_rejected() {
        assert!(Config::from_yaml("display:\n  wait_ms: 0\n").is_err());

        let mut config = Config::default();
        config.display.wait_ms = -5;
        assert!(matches!(
            config.validate(),
            Err(FlowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file_is_none() {
        let config = Config::load_optional("does/not/exist/config.yaml").unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(Config::from_yaml("camera: [1, 2").is_err());
    }
}
