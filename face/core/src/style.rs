//! Immutable style configuration owned by the engine

use std::fmt::Display;
use std::str::FromStr;

/// Opaque rgb color, parsed from `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0; 3]);
    pub const WHITE: Rgb = Rgb([255; 3]);

    /// Expand into rgba with the given alpha
    pub fn with_alpha(self, a: u8) -> [u8; 4] {
        let [r, g, b] = self.0;
        [r, g, b, a]
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for Rgb {
    type Err = String;
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let mut hex = code.trim_start_matches('#').to_string();
        match hex.len() {
            3 => {
                // Extend 3 character hex colors
                hex = hex.chars().flat_map(|a| [a, a]).collect();
            },
            6 => {},
            l => return Err(format!("Invalid hex length for {code}: {l}")),
        }
        if let Ok(channel_bytes) = u32::from_str_radix(&hex, 16) {
            let r = ((channel_bytes >> 16) & 0xFF) as u8;
            let g = ((channel_bytes >> 8) & 0xFF) as u8;
            let b = (channel_bytes & 0xFF) as u8;
            Ok(Self([r, g, b]))
        } else {
            Err(format!("Invalid hex color: {code}"))
        }
    }
}

/// Colors, text sizes and fixed offsets for drawing the face.
///
/// Sizes come in a round and a square flavour; the engine picks one set
/// whenever the surface shape is (re)applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceStyle {
    /// Interactive mode background
    pub background: Rgb,
    /// Color of all text
    pub text: Rgb,
    /// Date text size on round screens
    pub text_size_round: f32,
    /// Date text size on square screens
    pub text_size_square: f32,
    /// Time and temperature text size on round screens
    pub temperature_size_round: f32,
    /// Time and temperature text size on square screens
    pub temperature_size_square: f32,
    /// Baseline of the time line
    pub y_offset: f32,
    /// Baseline of the date line
    pub y_offset_date: f32,
    /// Extra vertical inset applied on round screens
    pub x_offset_round: f32,
    /// Edge length icons are resized to
    pub icon_size: u32,
}

impl Default for FaceStyle {
    fn default() -> Self {
        Self {
            background: Rgb([0x03, 0xa9, 0xf4]),
            text: Rgb::WHITE,
            text_size_round: 22.,
            text_size_square: 20.,
            temperature_size_round: 44.,
            temperature_size_square: 40.,
            y_offset: 96.,
            y_offset_date: 132.,
            x_offset_round: 16.,
            icon_size: 48,
        }
    }
}

impl FaceStyle {
    /// Date text size for the given shape
    pub fn text_size(&self, is_round: bool) -> f32 {
        if is_round {
            self.text_size_round
        } else {
            self.text_size_square
        }
    }

    /// Time and temperature text size for the given shape
    pub fn temperature_size(&self, is_round: bool) -> f32 {
        if is_round {
            self.temperature_size_round
        } else {
            self.temperature_size_square
        }
    }
}
