//! Collaborator traits for the face engine.
//!
//! The engine never talks to a clock, a screen or a companion transport
//! directly. Hosts implement these traits and hand them to the engine.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use crate::layout::Frame;

/// Errors raised on the asynchronous weather/icon path
#[derive(Debug, thiserror::Error)]
pub enum FaceError {
    /// Companion connection failed
    #[error("companion transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Asset fetch did not complete within the bound
    #[error("asset fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Weather update carried no icon asset
    #[error("weather update has no icon asset")]
    AssetMissing,

    /// Asset bytes are not a decodable image
    #[error("failed to decode icon: {0}")]
    DecodeFailure(String),
}

impl From<std::io::Error> for FaceError {
    fn from(e: std::io::Error) -> Self {
        FaceError::TransportUnavailable(e.to_string())
    }
}

impl From<image::ImageError> for FaceError {
    fn from(e: image::ImageError) -> Self {
        FaceError::DecodeFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FaceError>;

/// Wall clock and time zone
pub trait ClockSource: Send {
    /// Current local time, carrying the active zone offset
    fn now(&self) -> DateTime<FixedOffset>;
    /// Identifier of the active time zone
    fn time_zone(&self) -> String;
}

/// Font measurement used to cache text offsets
pub trait TextMetrics {
    /// Width and height of the bounding box of `text` at `size`
    fn text_bounds(&self, text: &str, size: f32, bold: bool) -> (f32, f32);
}

/// Static properties reported by a display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
    pub is_round: bool,
    pub low_bit_ambient: bool,
}

/// Something frames can be drawn onto
pub trait DisplaySurface: Send {
    fn info(&self) -> SurfaceInfo;
    fn metrics(&self) -> &dyn TextMetrics;
    fn draw(&mut self, frame: &Frame) -> std::io::Result<()>;
}
