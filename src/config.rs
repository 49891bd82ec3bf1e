//! Configuration file handling

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use face_core::{FaceStyle, Rgb, SurfaceInfo};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub refresh: RefreshConfig,
    pub weather: WeatherConfig,
    pub display: DisplayConfig,
    pub style: StyleConfig,
}

impl Config {
    /// Get the config file path for this platform
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sunshine-face")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load config from the platform path, or create default if it doesn't exist
    pub fn load_or_create() -> Result<Self, Box<dyn Error>> {
        let path = Self::path().ok_or("could not determine config directory")?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save_with_header(&path)?;
            info!("created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save config with header comments for new files
    pub fn save_with_header(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let header = r#"# sunshine-face configuration file
# durations use humantime syntax, e.g. "30m" or "10s"

"#;
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Use fahrenheit instead of celsius
    pub fahrenheit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RefreshConfig {
    /// Weather refresh interval
    #[serde(with = "humantime_serde")]
    pub weather: Duration,
    /// Upper bound on fetching one icon asset
    #[serde(with = "humantime_serde")]
    pub icon_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            weather: Duration::from_secs(60 * 60),
            icon_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    /// Enable weather updates
    pub enabled: bool,
    /// Manual latitude (optional)
    pub latitude: Option<f64>,
    /// Manual longitude (optional)
    pub longitude: Option<f64>,
    /// Directory holding weather icons named by condition, e.g. `rain.png`
    pub icon_dir: Option<PathBuf>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: None,
            longitude: None,
            icon_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Round screen
    pub round: bool,
    /// Screen only supports a few colors in ambient mode
    pub low_bit_ambient: bool,
    /// Show the face immediately on start
    pub start_visible: bool,
    /// Write every drawn frame to this png
    pub snapshot: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 320,
            round: true,
            low_bit_ambient: false,
            start_visible: true,
            snapshot: None,
        }
    }
}

impl DisplayConfig {
    pub fn surface_info(&self) -> SurfaceInfo {
        SurfaceInfo {
            width: self.width,
            height: self.height,
            is_round: self.round,
            low_bit_ambient: self.low_bit_ambient,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    /// Interactive background color (hex)
    pub background_color: String,
    /// Text color (hex)
    pub text_color: String,
    pub text_size_round: f32,
    pub text_size_square: f32,
    pub temperature_size_round: f32,
    pub temperature_size_square: f32,
    pub y_offset: f32,
    pub y_offset_date: f32,
    pub x_offset_round: f32,
    /// Edge length weather icons are scaled to
    pub icon_size: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let style = FaceStyle::default();
        Self {
            background_color: style.background.to_string(),
            text_color: style.text.to_string(),
            text_size_round: style.text_size_round,
            text_size_square: style.text_size_square,
            temperature_size_round: style.temperature_size_round,
            temperature_size_square: style.temperature_size_square,
            y_offset: style.y_offset,
            y_offset_date: style.y_offset_date,
            x_offset_round: style.x_offset_round,
            icon_size: style.icon_size,
        }
    }
}

impl StyleConfig {
    /// Resolve into the engine's style
    pub fn face_style(&self) -> Result<FaceStyle, String> {
        Ok(FaceStyle {
            background: self.background_color.parse::<Rgb>()?,
            text: self.text_color.parse::<Rgb>()?,
            text_size_round: self.text_size_round,
            text_size_square: self.text_size_square,
            temperature_size_round: self.temperature_size_round,
            temperature_size_square: self.temperature_size_square,
            y_offset: self.y_offset,
            y_offset_date: self.y_offset_date,
            x_offset_round: self.x_offset_round,
            icon_size: self.icon_size,
        })
    }
}
