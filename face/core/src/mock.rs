//! Test doubles for the engine's collaborators.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::features::{ClockSource, DisplaySurface, SurfaceInfo, TextMetrics};
use crate::layout::{Frame, MonospaceMetrics};

#[derive(Debug)]
struct ClockInner {
    now_ms: i64,
    zone: String,
    offset: FixedOffset,
}

/// A manually driven clock.
///
/// Clones share the same time, so a test can keep one handle while the
/// engine owns another.
///
/// ```
/// use face_core::mock::MockClock;
/// use face_core::ClockSource;
///
/// let clock = MockClock::at("2016-10-30T12:00:00Z");
/// clock.advance_ms(1500);
/// assert_eq!(clock.now().to_rfc3339(), "2016-10-30T12:00:01.500+00:00");
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    inner: Arc<Mutex<ClockInner>>,
}

impl MockClock {
    /// Start at an RFC 3339 timestamp, taking its offset as the zone
    pub fn at(rfc3339: &str) -> Self {
        let time = DateTime::parse_from_rfc3339(rfc3339).expect("invalid rfc3339 timestamp");
        Self {
            inner: Arc::new(Mutex::new(ClockInner {
                now_ms: time.timestamp_millis(),
                zone: time.offset().to_string(),
                offset: *time.offset(),
            })),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.lock().unwrap().now_ms as u64
    }

    pub fn set_ms(&self, ms: u64) {
        self.inner.lock().unwrap().now_ms = ms as i64;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.inner.lock().unwrap().now_ms += ms as i64;
    }

    /// Switch to another zone with the given utc offset
    pub fn set_zone(&self, zone: &str, offset_secs: i32) {
        let mut inner = self.inner.lock().unwrap();
        inner.zone = zone.into();
        inner.offset = FixedOffset::east_opt(offset_secs).expect("offset out of range");
    }
}

impl ClockSource for MockClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let inner = self.inner.lock().unwrap();
        Utc.timestamp_millis_opt(inner.now_ms)
            .unwrap()
            .with_timezone(&inner.offset)
    }

    fn time_zone(&self) -> String {
        self.inner.lock().unwrap().zone.clone()
    }
}

/// A surface that keeps every frame drawn on it
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub info: SurfaceInfo,
    pub metrics: MonospaceMetrics,
    pub frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingSurface {
    pub fn new(info: SurfaceInfo) -> Self {
        Self {
            info,
            metrics: MonospaceMetrics::default(),
            frames: Default::default(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }
}

impl DisplaySurface for RecordingSurface {
    fn info(&self) -> SurfaceInfo {
        self.info
    }

    fn metrics(&self) -> &dyn TextMetrics {
        &self.metrics
    }

    fn draw(&mut self, frame: &Frame) -> std::io::Result<()> {
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }
}
