//! Text offset caching and frame composition.
//!
//! Offsets are measured once per shape change from placeholder strings,
//! never per frame. Composition turns a `FaceState` snapshot into a flat
//! list of draw commands that any `DisplaySurface` can replay.

use chrono::{DateTime, FixedOffset};

use crate::features::TextMetrics;
use crate::state::{FaceState, Icon, RenderHints};
use crate::style::{FaceStyle, Rgb};

/// Widest possible time string
pub const TIME_PLACEHOLDER: &str = "88:88";
/// Representative date string
pub const DATE_PLACEHOLDER: &str = "Wed, Oct 30 2016";

const DATE_FORMAT: &str = "%a, %b %d %Y";

/// Zero padded 24 hour `HH:MM`
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.format("%H:%M").to_string()
}

/// Abbreviated weekday and month, day and year, e.g. `Wed, Oct 30 2016`
pub fn format_date(time: &DateTime<FixedOffset>) -> String {
    time.format(DATE_FORMAT).to_string()
}

/// Fixed-advance metrics for surfaces without a real font
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    /// Glyph advance as a fraction of text size
    pub advance: f32,
    /// Cap height as a fraction of text size
    pub cap_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 0.6,
            cap_height: 0.7,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_bounds(&self, text: &str, size: f32, bold: bool) -> (f32, f32) {
        let advance = if bold { self.advance * 1.1 } else { self.advance };
        let width = text.chars().count() as f32 * size * advance;
        (width, size * self.cap_height)
    }
}

/// Cached text offsets for one surface shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub is_round: bool,
    /// Date text size
    pub text_size: f32,
    /// Time and temperature text size
    pub temperature_size: f32,
    /// Half the width of the time placeholder
    pub x_offset_time: f32,
    /// Half the width of the date placeholder
    pub x_offset_date: f32,
    /// Half the height of the time placeholder
    pub y_offset_temperature: f32,
    /// Vertical inset for round screens
    pub round_offset: f32,
}

impl Layout {
    /// Measure placeholders for the given shape
    pub fn measure(style: &FaceStyle, is_round: bool, metrics: &dyn TextMetrics) -> Self {
        let text_size = style.text_size(is_round);
        let temperature_size = style.temperature_size(is_round);
        let (time_w, time_h) = metrics.text_bounds(TIME_PLACEHOLDER, temperature_size, true);
        let (date_w, _) = metrics.text_bounds(DATE_PLACEHOLDER, text_size, false);
        Self {
            is_round,
            text_size,
            temperature_size,
            x_offset_time: time_w / 2.,
            x_offset_date: date_w / 2.,
            y_offset_temperature: time_h / 2.,
            round_offset: if is_round { style.x_offset_round } else { 0. },
        }
    }
}

/// One drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface
    Fill { color: [u8; 4] },
    /// Draw text with its baseline starting at (x, y)
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: [u8; 4],
        anti_alias: bool,
    },
    /// Draw an icon with its top left corner at (x, y)
    Icon { icon: Icon, x: f32, y: f32 },
}

/// Everything drawn for one redraw
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// All text drawn in this frame, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_icon(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Icon { .. }))
    }
}

/// Build the draw commands for a snapshot
pub fn compose(
    state: &FaceState,
    layout: &Layout,
    style: &FaceStyle,
    hints: RenderHints,
    (width, height): (u32, u32),
) -> Frame {
    let (w, h) = (width as f32, height as f32);
    let text_color = style.text.with_alpha(0xff);
    let background = if state.ambient {
        Rgb::BLACK
    } else {
        style.background
    };

    let mut commands = vec![DrawCommand::Fill {
        color: background.with_alpha(0xff),
    }];

    commands.push(DrawCommand::Text {
        text: format_time(&state.current_time),
        x: w / 2. - layout.x_offset_time,
        y: style.y_offset + layout.round_offset,
        size: layout.temperature_size,
        bold: true,
        color: text_color,
        anti_alias: hints.anti_alias,
    });
    commands.push(DrawCommand::Text {
        text: format_date(&state.current_time),
        x: w / 2. - layout.x_offset_date,
        y: style.y_offset_date + layout.round_offset,
        size: layout.text_size,
        bold: false,
        color: text_color,
        anti_alias: hints.anti_alias,
    });

    if let Some(line) = state.temperature_line() {
        let mut x_off = layout.x_offset_time;
        let mut y_off = layout.y_offset_temperature;
        if let Some(icon) = &state.icon {
            commands.push(DrawCommand::Icon {
                icon: icon.clone(),
                x: layout.x_offset_time,
                y: (h + layout.y_offset_temperature) / 2.,
            });
            x_off += icon.width() as f32;
            y_off += icon.height() as f32;
        }
        commands.push(DrawCommand::Text {
            text: line,
            x: x_off,
            y: (h + y_off) / 2.,
            size: layout.temperature_size,
            bold: true,
            color: text_color,
            anti_alias: hints.anti_alias,
        });
    }

    Frame {
        width,
        height,
        commands,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::DateTime;
    use image::RgbaImage;

    use super::*;

    fn state() -> FaceState {
        FaceState::new(DateTime::parse_from_rfc3339("2016-10-30T07:05:09+02:00").unwrap())
    }

    fn layout() -> Layout {
        Layout::measure(&FaceStyle::default(), false, &MonospaceMetrics::default())
    }

    #[test]
    fn formats_time_and_date() {
        let s = state();
        assert_eq!(format_time(&s.current_time), "07:05");
        assert_eq!(format_date(&s.current_time), "Sun, Oct 30 2016");
    }

    #[test]
    fn measures_placeholders_per_shape() {
        let style = FaceStyle::default();
        let metrics = MonospaceMetrics::default();
        let square = Layout::measure(&style, false, &metrics);
        let round = Layout::measure(&style, true, &metrics);

        let (time_w, time_h) = metrics.text_bounds(TIME_PLACEHOLDER, 40., true);
        assert_eq!(square.x_offset_time, time_w / 2.);
        assert_eq!(square.y_offset_temperature, time_h / 2.);
        assert_eq!(square.round_offset, 0.);
        assert_eq!(round.round_offset, style.x_offset_round);
        assert!(round.x_offset_date > square.x_offset_date);
    }

    #[test]
    fn no_temperature_line_without_weather() {
        let frame = compose(
            &state(),
            &layout(),
            &FaceStyle::default(),
            RenderHints::default(),
            (320, 320),
        );
        let texts: Vec<_> = frame.texts().collect();
        assert_eq!(texts, ["07:05", "Sun, Oct 30 2016"]);
        assert!(!frame.has_icon());
    }

    #[test]
    fn temperature_line_shifts_right_of_icon() {
        let layout = layout();
        let style = FaceStyle::default();
        let mut s = state();
        s.temperature_high = Some("75°".into());
        s.temperature_low = Some("60°".into());

        let frame = compose(&s, &layout, &style, RenderHints::default(), (320, 320));
        let Some(DrawCommand::Text { text, x, .. }) = frame.commands.last() else {
            panic!("expected temperature text");
        };
        assert_eq!(text, "75° | 60°");
        assert_eq!(*x, layout.x_offset_time);

        s.icon = Some(Arc::new(RgbaImage::new(48, 48)));
        let frame = compose(&s, &layout, &style, RenderHints::default(), (320, 320));
        assert!(frame.has_icon());
        let Some(DrawCommand::Text { x, y, .. }) = frame.commands.last() else {
            panic!("expected temperature text");
        };
        assert_eq!(*x, layout.x_offset_time + 48.);
        assert_eq!(*y, (320. + layout.y_offset_temperature + 48.) / 2.);
    }

    #[test]
    fn ambient_background_is_black() {
        let mut s = state();
        s.ambient = true;
        let frame = compose(
            &s,
            &layout(),
            &FaceStyle::default(),
            RenderHints::default(),
            (320, 320),
        );
        assert!(matches!(
            frame.commands[0],
            DrawCommand::Fill {
                color: [0, 0, 0, 0xff]
            }
        ));
    }
}
