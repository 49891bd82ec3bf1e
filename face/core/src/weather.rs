//! Weather data delivered by companion feeds

use std::path::PathBuf;
use std::sync::Arc;

/// Data path weather items are published on
pub const WEATHER_PATH: &str = "/weather";

/// Opaque reference to an icon asset, resolved by an asset fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    /// Asset stored in a file
    File(PathBuf),
    /// Asset bytes carried inline with the update
    Inline(Arc<[u8]>),
}

/// A changed data item as published by the companion
#[derive(Debug, Clone, Default)]
pub struct DataItem {
    pub path: String,
    pub high: Option<String>,
    pub low: Option<String>,
    pub icon: Option<AssetRef>,
}

/// A complete weather update for the face
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherUpdate {
    pub high: String,
    pub low: String,
    pub icon: Option<AssetRef>,
}

impl WeatherUpdate {
    /// Accept an item published on the weather path carrying both
    /// temperatures. Anything else is not a weather update.
    pub fn from_item(item: DataItem) -> Option<Self> {
        if item.path != WEATHER_PATH {
            return None;
        }
        Some(Self {
            high: item.high?,
            low: item.low?,
            icon: item.icon,
        })
    }
}

/// Rounded temperature with a degree sign
pub fn format_temperature(value: f32) -> String {
    format!("{}°", value.round() as i32)
}

/// Weather icon kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    DayClear,
    DayPartlyCloudy,
    DayPartlyRainy,
    NightPartlyCloudy,
    NightClear,
    Cloudy,
    Rainy,
    Snowfall,
    Thunderstorm,
}

impl WeatherIcon {
    /// Convert a WMO index into a weather icon, adapting for day and night
    /// Adapted from the list at the bottom of <https://open-meteo.com/en/docs>
    pub fn from_wmo(wmo: u8, is_day: bool) -> Option<Self> {
        match wmo {
            // clear and mainly clear
            0 | 1 => Some(if is_day { Self::DayClear } else { Self::NightClear }),

            // partly cloudy
            2 => Some(if is_day { Self::DayPartlyCloudy } else { Self::NightPartlyCloudy }),

            // overcast
            3
            // foggy
            | 45 | 48 => Some(Self::Cloudy),

            // drizzle
            51 | 53 | 55
            // freezing drizzle
            | 56 | 57
            // rain
            | 61 | 63 | 65
            // freezing rain
            | 66 | 67 => Some(Self::Rainy),

            // rain showers
            80..=82 => Some(if is_day { Self::DayPartlyRainy } else { Self::Rainy }),

            // snowfall
            71 | 73 | 75 | 77
            // snow showers
            | 85 | 86 => Some(Self::Snowfall),

            // thunderstorm
            95 | 96 | 99 => Some(Self::Thunderstorm),

            // unknown
            _ => None,
        }
    }

    /// File stem icon assets are looked up by
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::DayClear => "clear_day",
            Self::DayPartlyCloudy => "partly_cloudy_day",
            Self::DayPartlyRainy => "partly_rainy_day",
            Self::NightPartlyCloudy => "partly_cloudy_night",
            Self::NightClear => "clear_night",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rain",
            Self::Snowfall => "snow",
            Self::Thunderstorm => "storm",
        }
    }
}
