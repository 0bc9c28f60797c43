use anyhow::{Context, Result, bail};
use revend_camera::CameraConfig;
use revend_classify::{DEFAULT_MIN_SCORE, DEFAULT_TARGET_CLASS};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Kiosk settings, read from a JSON file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial_port: String,
    pub baud_rate: u32,
    pub camera_device: String,
    pub camera_width: u32,
    pub camera_height: u32,
    pub model_path: String,
    pub target_class_id: i64,
    pub min_score_threshold: f32,
    pub voucher_endpoint: String,
    /// Voucher time credited per counted bottle.
    pub seconds_per_object: u64,
    pub voucher_timeout_ms: u64,
    /// Extra attempts after a failed voucher request. 0 means a single attempt.
    pub voucher_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub voucher_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyUSB0".into(),
            baud_rate: 9600,
            camera_device: "/dev/video0".into(),
            camera_width: 640,
            camera_height: 480,
            model_path: "saved_model/model.onnx".into(),
            target_class_id: DEFAULT_TARGET_CLASS,
            min_score_threshold: DEFAULT_MIN_SCORE,
            voucher_endpoint: "http://192.168.1.18:5000/addvoucher".into(),
            seconds_per_object: 5 * 60,
            voucher_timeout_ms: 10_000,
            voucher_retries: 0,
            voucher_backoff_ms: 500,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.serial_port.is_empty() {
            bail!("serial_port must not be empty");
        }
        if self.baud_rate == 0 {
            bail!("baud_rate must be positive");
        }
        if !(0.0..=1.0).contains(&self.min_score_threshold) {
            bail!(
                "min_score_threshold must be within [0, 1], got {}",
                self.min_score_threshold
            );
        }
        if self.seconds_per_object == 0 {
            bail!("seconds_per_object must be positive");
        }
        if self.voucher_endpoint.is_empty() {
            bail!("voucher_endpoint must not be empty");
        }
        Ok(())
    }

    pub fn voucher_timeout(&self) -> Duration {
        Duration::from_millis(self.voucher_timeout_ms)
    }

    pub fn voucher_backoff(&self) -> Duration {
        Duration::from_millis(self.voucher_backoff_ms)
    }

    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig::default()
            .with_device(self.camera_device.clone())
            .with_resolution(self.camera_width, self.camera_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployed_kiosk() {
        let config = Config::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.target_class_id, 44);
        assert_eq!(config.seconds_per_object, 300);
        assert_eq!(config.voucher_retries, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"serial_port":"COM10","min_score_threshold":0.5}"#).unwrap();
        assert_eq!(config.serial_port, "COM10");
        assert!((config.min_score_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.baud_rate, 9600);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            Config {
                baud_rate: 0,
                ..Config::default()
            },
            Config {
                min_score_threshold: 1.5,
                ..Config::default()
            },
            Config {
                seconds_per_object: 0,
                ..Config::default()
            },
            Config {
                voucher_endpoint: String::new(),
                ..Config::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_camera_config_uses_device_and_resolution() {
        let config = Config {
            camera_device: "/dev/video3".into(),
            camera_width: 320,
            camera_height: 240,
            ..Config::default()
        };
        let camera = config.camera_config();
        assert_eq!(camera.device(), "/dev/video3");
        assert_eq!((camera.width(), camera.height()), (320, 240));
    }
}
