//! System clock source

use chrono::{DateTime, FixedOffset, Local};
use face_core::ClockSource;

/// Local wall clock.
///
/// The zone id is `$TZ` when set, combined with the current utc offset,
/// so a daylight saving switch also counts as a zone change.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn time_zone(&self) -> String {
        let offset = Local::now().offset().to_string();
        match std::env::var("TZ") {
            Ok(tz) if !tz.is_empty() => format!("{tz} ({offset})"),
            _ => offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_carries_local_offset() {
        let now = SystemClock.now();
        let local = Local::now();
        assert_eq!(now.offset().local_minus_utc(), local.offset().local_minus_utc());
        assert!((local.timestamp_millis() - now.timestamp_millis()).abs() < 1000);
    }
}
