//! Event types for host-to-engine communication

use std::str::FromStr;

use face_core::{Icon, WeatherTicket, WeatherUpdate};

/// Lifecycle and display events raised by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Face shown or hidden
    Visibility(bool),
    /// Entered (true) or left (false) ambient mode
    Ambient(bool),
    /// Surface shape applied
    Shape { round: bool },
    /// Drawing area resized
    Resize { width: u32, height: u32 },
    /// Display reports low-bit ambient support
    LowBitAmbient(bool),
    /// User tapped the face
    Tap,
    /// System time zone changed
    TimeZoneChanged,
}

/// Everything the face event loop reacts to
#[derive(Debug, Clone)]
pub enum FaceEvent {
    Host(HostEvent),
    /// Fresh temperatures from a weather feed
    Weather(WeatherUpdate),
    /// Icon decoded for the update holding `ticket`
    IconDecoded { ticket: WeatherTicket, icon: Icon },
    /// Tear the face down
    Quit,
}

impl FromStr for FaceEvent {
    type Err = String;

    /// Parse a host command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let event = match words.as_slice() {
            ["show"] => HostEvent::Visibility(true),
            ["hide"] => HostEvent::Visibility(false),
            ["ambient"] => HostEvent::Ambient(true),
            ["interactive"] => HostEvent::Ambient(false),
            ["round"] => HostEvent::Shape { round: true },
            ["square"] => HostEvent::Shape { round: false },
            ["size", width, height] => match (width.parse(), height.parse()) {
                (Ok(width), Ok(height)) => HostEvent::Resize { width, height },
                _ => return Err(format!("invalid size '{width} {height}'")),
            },
            ["lowbit", "on"] => HostEvent::LowBitAmbient(true),
            ["lowbit", "off"] => HostEvent::LowBitAmbient(false),
            ["tap"] => HostEvent::Tap,
            ["tz"] => HostEvent::TimeZoneChanged,
            ["quit" | "exit"] => return Ok(FaceEvent::Quit),
            _ => {
                return Err(format!(
                    "unknown command '{}'. Valid: show, hide, ambient, interactive, round, \
square, size W H, lowbit on|off, tap, tz, quit",
                    s.trim()
                ))
            },
        };
        Ok(FaceEvent::Host(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_commands() {
        assert!(matches!(
            "show".parse::<FaceEvent>(),
            Ok(FaceEvent::Host(HostEvent::Visibility(true)))
        ));
        assert!(matches!(
            "  lowbit   on ".parse::<FaceEvent>(),
            Ok(FaceEvent::Host(HostEvent::LowBitAmbient(true)))
        ));
        assert!(matches!(
            "round".parse::<FaceEvent>(),
            Ok(FaceEvent::Host(HostEvent::Shape { round: true }))
        ));
        assert!(matches!(
            "size 400 300".parse::<FaceEvent>(),
            Ok(FaceEvent::Host(HostEvent::Resize {
                width: 400,
                height: 300
            }))
        ));
        assert!("size 400 tall".parse::<FaceEvent>().is_err());
        assert!(matches!("quit".parse::<FaceEvent>(), Ok(FaceEvent::Quit)));
        assert!("lowbit".parse::<FaceEvent>().is_err());
        assert!("show now".parse::<FaceEvent>().is_err());
        assert!("".parse::<FaceEvent>().is_err());
    }
}
