//! Application Configuration
//!
//! User settings stored in TOML format under the platform config directory.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::capture::{CaptureConfig, Rotation};
use crate::overlay::OverlayConfig;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera settings
    pub camera: CameraSettings,
    /// Recognition settings
    pub vision: VisionSettings,
    /// Overlay settings
    pub overlay: OverlaySettings,
}

/// Camera-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Capture device path
    pub device: String,
    /// Requested frame width
    pub width: u32,
    /// Requested frame height
    pub height: u32,
    /// Maximum capture FPS
    pub max_fps: u32,
    /// Clockwise rotation of captured frames in degrees (0/90/180/270)
    pub rotation_degrees: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            max_fps: 30,
            rotation_degrees: 0,
        }
    }
}

impl CameraSettings {
    pub fn to_capture_config(&self) -> CaptureConfig {
        let rotation = Rotation::from_degrees(self.rotation_degrees).unwrap_or_else(|| {
            warn!(
                "invalid rotation {} degrees, using 0",
                self.rotation_degrees
            );
            Rotation::Deg0
        });

        CaptureConfig {
            device: PathBuf::from(&self.device),
            width: self.width,
            height: self.height,
            max_fps: self.max_fps,
            rotation,
        }
    }
}

/// Recognition-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionSettings {
    /// Minimum recognized text length to publish
    pub min_text_len: usize,
    /// Directory holding the OCR models; defaults to `models/` in the
    /// config directory
    pub model_dir: Option<String>,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            min_text_len: 1,
            model_dir: None,
        }
    }
}

/// Overlay-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Card background opacity
    pub opacity: f32,
    /// Text size in points
    pub font_size: f32,
    /// Maximum card width in pixels
    pub max_width: f32,
    /// Distance from the bottom edge in pixels
    pub margin: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            opacity: 0.67,
            font_size: 16.0,
            max_width: 350.0,
            margin: 16.0,
        }
    }
}

impl OverlaySettings {
    pub fn to_overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            opacity: self.opacity,
            font_size: self.font_size,
            max_width: self.max_width,
            margin: self.margin,
            ..OverlayConfig::default()
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "vision", "SmartLens")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check camera defaults
        assert_eq!(config.camera.device, "/dev/video0");
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.height, 480);
        assert_eq!(config.camera.max_fps, 30);
        assert_eq!(config.camera.rotation_degrees, 0);

        // Check vision defaults
        assert_eq!(config.vision.min_text_len, 1);
        assert!(config.vision.model_dir.is_none());

        // Check overlay defaults
        assert!((config.overlay.opacity - 0.67).abs() < 0.01);
        assert!((config.overlay.font_size - 16.0).abs() < 0.01);
        assert!((config.overlay.max_width - 350.0).abs() < 0.01);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        // Serialize to TOML
        let toml_str = toml::to_string_pretty(&config).unwrap();

        // Deserialize back
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        // Verify values match
        assert_eq!(config.camera.device, parsed.camera.device);
        assert_eq!(config.camera.max_fps, parsed.camera.max_fps);
        assert_eq!(config.vision.min_text_len, parsed.vision.min_text_len);
        assert!((config.overlay.opacity - parsed.overlay.opacity).abs() < 0.01);
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.camera.device = "/dev/video2".to_string();
        config.camera.max_fps = 60;
        config.vision.min_text_len = 4;
        config.overlay.opacity = 0.5;

        // Serialize and deserialize
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.camera.device, "/dev/video2");
        assert_eq!(parsed.camera.max_fps, 60);
        assert_eq!(parsed.vision.min_text_len, 4);
        assert!((parsed.overlay.opacity - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_save_and_load_config() {
        let config = AppConfig::default();

        // Create a temporary file
        let temp_file = NamedTempFile::new().unwrap();

        // Save config
        save_config(&config, temp_file.path()).unwrap();

        // Load config
        let loaded = load_config(temp_file.path()).unwrap();

        // Verify
        assert_eq!(config.camera.device, loaded.camera.device);
        assert_eq!(config.camera.max_fps, loaded.camera.max_fps);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_capture_config_conversion() {
        let mut settings = CameraSettings::default();
        settings.rotation_degrees = 90;
        settings.device = "/dev/video1".to_string();

        let capture = settings.to_capture_config();
        assert_eq!(capture.rotation, Rotation::Deg90);
        assert_eq!(capture.device, PathBuf::from("/dev/video1"));
    }

    #[test]
    fn test_invalid_rotation_falls_back_to_zero() {
        let mut settings = CameraSettings::default();
        settings.rotation_degrees = 45;

        let capture = settings.to_capture_config();
        assert_eq!(capture.rotation, Rotation::Deg0);
    }
}
