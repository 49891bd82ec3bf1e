//! Renderable face state.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use image::RgbaImage;

/// A decoded weather icon, shared between the engine and rendered frames
pub type Icon = Arc<RgbaImage>;

/// Generation of a weather update.
///
/// Every temperature update issues a new ticket. Icon results are tagged
/// with the ticket of the update that requested them, so a late icon can
/// be told apart from one that belongs to the temperatures on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeatherTicket(pub(crate) u64);

impl WeatherTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Quality hints passed through to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderHints {
    pub anti_alias: bool,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self { anti_alias: true }
    }
}

/// Immutable copy of everything needed to draw one frame.
///
/// `temperature_high` and `temperature_low` are always both set or both
/// unset. `icon` may lag behind them, or never arrive at all.
#[derive(Debug, Clone)]
pub struct FaceState {
    pub current_time: DateTime<FixedOffset>,
    pub current_date: NaiveDate,
    pub temperature_high: Option<String>,
    pub temperature_low: Option<String>,
    pub icon: Option<Icon>,
    pub ambient: bool,
    pub low_bit_ambient: bool,
    pub is_round: bool,
}

impl FaceState {
    /// Fresh state with no weather
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            current_time: now,
            current_date: now.date_naive(),
            temperature_high: None,
            temperature_low: None,
            icon: None,
            ambient: false,
            low_bit_ambient: false,
            is_round: false,
        }
    }

    /// High and low temperature, if weather has been received
    pub fn temperatures(&self) -> Option<(&str, &str)> {
        match (&self.temperature_high, &self.temperature_low) {
            (Some(high), Some(low)) => Some((high, low)),
            _ => None,
        }
    }

    /// Text of the temperature line, `"<high> | <low>"`
    pub fn temperature_line(&self) -> Option<String> {
        self.temperatures()
            .map(|(high, low)| format!("{high} | {low}"))
    }
}
