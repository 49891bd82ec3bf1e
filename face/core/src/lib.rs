//! Core state engine for the sunshine watch face.
//!
//! This crate provides:
//! - The `FaceEngine`, the single source of truth for what is on screen
//! - The `RedrawScheduler`, deciding when the next interactive redraw fires
//! - Layout caching and frame composition (`Layout`, `Frame`, `DrawCommand`)
//! - Collaborator traits (`ClockSource`, `TextMetrics`, `DisplaySurface`)
//! - The weather data model delivered by companion feeds

mod engine;
mod features;
mod layout;
pub mod mock;
mod scheduler;
mod state;
mod style;
mod weather;

pub use engine::FaceEngine;
pub use features::{
    ClockSource, DisplaySurface, FaceError, Result, SurfaceInfo, TextMetrics,
};
pub use layout::{
    compose, format_date, format_time, DrawCommand, Frame, Layout, MonospaceMetrics,
    DATE_PLACEHOLDER, TIME_PLACEHOLDER,
};
pub use scheduler::{
    next_boundary, RedrawScheduler, ScheduleState, TimerState, AMBIENT_UPDATE_RATE_MS,
    INTERACTIVE_UPDATE_RATE_MS,
};
pub use state::{FaceState, Icon, RenderHints, WeatherTicket};
pub use style::{FaceStyle, Rgb};
pub use weather::{
    format_temperature, AssetRef, DataItem, WeatherIcon, WeatherUpdate, WEATHER_PATH,
};
