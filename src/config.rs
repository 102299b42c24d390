use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    segmentation::{Delegate, ModelSpec},
};

/// Main configuration for the backdrop compositor
///
/// Every section has defaults, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render loop settings
    pub scheduler: SchedulerConfig,

    /// Segmentation model settings
    pub segmentation: SegmentationConfig,

    /// Face detection side channel settings
    pub detection: DetectionConfig,

    /// Pixel compositor settings
    pub compositor: CompositorConfig,

    /// Effect store settings
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()?;
        self.segmentation.validate()?;
        self.detection.validate()?;
        self.compositor.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

fn invalid<V: ToString>(key: &str, value: V) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Render loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Display refresh rate the loop is paced at
    pub target_fps: f64,

    /// Log averaged frame timings every this many rendered frames (0 = never)
    pub stats_interval: u64,

    /// Presentation size used to scale detection boxes; defaults to the frame size
    pub display_size: Option<(u32, u32)>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: 30.0,
            stats_interval: 30,
            display_size: None,
        }
    }
}

impl SchedulerConfig {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps)
    }

    fn validate(&self) -> Result<()> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 || self.target_fps > 1000.0 {
            return Err(invalid("scheduler.target_fps", self.target_fps).into());
        }

        if let Some((w, h)) = self.display_size {
            if w == 0 || h == 0 {
                return Err(invalid("scheduler.display_size", format!("{}x{}", w, h)).into());
            }
        }

        Ok(())
    }
}

/// Segmentation model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Model asset locator, e.g. `chroma:green`
    pub model: String,

    /// Preferred execution delegate
    pub delegate: Delegate,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            model: "chroma:green".to_string(),
            delegate: Delegate::Gpu,
        }
    }
}

impl SegmentationConfig {
    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec::new(self.model.clone(), self.delegate)
    }

    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(invalid("segmentation.model", "<empty>").into());
        }
        Ok(())
    }
}

/// Face detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Whether frames are sent to the detection service at all
    pub enabled: bool,

    /// Detection service URL
    pub endpoint: String,

    /// Minimum time between two dispatches, in milliseconds
    pub interval_ms: u64,

    /// JPEG quality of the uploaded frame (1-100)
    pub jpeg_quality: u8,

    /// Per-request timeout, in milliseconds
    pub timeout_ms: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://127.0.0.1:8080/detect-faces".to_string(),
            interval_ms: 500,
            jpeg_quality: 70,
            timeout_ms: 5000,
        }
    }
}

impl DetectionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if !is_http_url(&self.endpoint) {
            return Err(invalid("detection.endpoint", &self.endpoint).into());
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(invalid("detection.jpeg_quality", self.jpeg_quality).into());
        }

        if self.timeout_ms == 0 {
            return Err(invalid("detection.timeout_ms", self.timeout_ms).into());
        }

        Ok(())
    }
}

/// Pixel compositor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Threads used for the per-pixel pass (1 = run on the render thread)
    pub worker_threads: usize,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
        }
    }
}

impl CompositorConfig {
    fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(invalid("compositor.worker_threads", self.worker_threads).into());
        }
        Ok(())
    }
}

/// Effect store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the project/effect API
    pub base_url: String,

    /// Per-request timeout, in milliseconds
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if !is_http_url(&self.base_url) {
            return Err(invalid("store.base_url", &self.base_url).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.interval(), Duration::from_millis(500));
        assert_eq!(config.detection.jpeg_quality, 70);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("backdrop.toml");

        let mut original = Config::default();
        original.scheduler.target_fps = 60.0;
        original.segmentation.delegate = Delegate::Cpu;

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded.scheduler.target_fps, 60.0);
        assert_eq!(loaded.segmentation.delegate, Delegate::Cpu);
        assert_eq!(loaded.detection.endpoint, original.detection.endpoint);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[detection]\ninterval_ms = 250\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.detection.interval_ms, 250);
        assert_eq!(config.detection.jpeg_quality, 70);
        assert_eq!(config.scheduler.target_fps, 30.0);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(
            err,
            crate::error::BackdropError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.scheduler.target_fps = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.endpoint = "ftp://detector".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.compositor.worker_threads = 0;
        assert!(config.validate().is_err());
    }
}
