//! The face state engine.

use log::{debug, info};

use crate::features::{ClockSource, SurfaceInfo, TextMetrics};
use crate::layout::{compose, Frame, Layout};
use crate::scheduler::{RedrawScheduler, ScheduleState};
use crate::state::{FaceState, Icon, RenderHints, WeatherTicket};
use crate::style::FaceStyle;

/// Single source of truth for what should be on screen.
///
/// The engine is owned by one event loop. Every host callback maps onto
/// one `on_*` method; a redraw is requested by marking the engine dirty,
/// and the owner collects the frame with [`FaceEngine::take_redraw`].
pub struct FaceEngine {
    clock: Box<dyn ClockSource>,
    style: FaceStyle,
    state: FaceState,
    scheduler: RedrawScheduler,
    layout: Layout,
    size: (u32, u32),
    hints: RenderHints,
    ticket: WeatherTicket,
    zone: String,
    dirty: bool,
    invalidations: u64,
    destroyed: bool,
}

impl FaceEngine {
    /// Create the engine for a surface. Weather starts out empty and the
    /// face starts invisible.
    pub fn new(
        clock: Box<dyn ClockSource>,
        style: FaceStyle,
        surface: SurfaceInfo,
        metrics: &dyn TextMetrics,
    ) -> Self {
        let mut state = FaceState::new(clock.now());
        state.is_round = surface.is_round;
        state.low_bit_ambient = surface.low_bit_ambient;
        let layout = Layout::measure(&style, surface.is_round, metrics);
        let zone = clock.time_zone();
        info!(
            "face engine created for {}x{} {} surface in {zone}",
            surface.width,
            surface.height,
            if surface.is_round { "round" } else { "square" },
        );
        Self {
            clock,
            style,
            state,
            scheduler: RedrawScheduler::default(),
            layout,
            size: (surface.width, surface.height),
            hints: RenderHints::default(),
            ticket: WeatherTicket::default(),
            zone,
            dirty: false,
            invalidations: 0,
            destroyed: false,
        }
    }

    fn invalidate(&mut self) {
        self.dirty = true;
        self.invalidations += 1;
    }

    /// Current clock time in milliseconds, the unit wakes are scheduled in
    pub fn now_ms(&self) -> u64 {
        self.clock.now().timestamp_millis().max(0) as u64
    }

    fn refresh_time(&mut self) {
        let now = self.clock.now();
        self.state.current_time = now;
        self.state.current_date = now.date_naive();
    }

    fn update_timer(&mut self) {
        if self.destroyed {
            return;
        }
        let now = self.now_ms();
        let visible = self.scheduler.state().visible;
        self.scheduler.recompute(visible, self.state.ambient, now);
    }

    /// Refresh time and date from the clock
    pub fn on_tick(&mut self) {
        self.refresh_time();
        self.invalidate();
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        debug!("visibility changed: {visible}");
        if visible {
            self.on_time_zone_changed();
        }
        if !self.destroyed {
            let now = self.now_ms();
            self.scheduler.recompute(visible, self.state.ambient, now);
        }
    }

    /// Switch between ambient and interactive mode. Repeating the current
    /// mode has no effect.
    pub fn on_ambient_mode_changed(&mut self, ambient: bool) {
        if self.state.ambient != ambient {
            debug!("ambient mode changed: {ambient}");
            self.state.ambient = ambient;
            if self.state.low_bit_ambient {
                self.hints.anti_alias = !ambient;
            }
            self.invalidate();
        }
        self.update_timer();
    }

    /// Record display capabilities reported by the host
    pub fn on_properties_changed(&mut self, low_bit_ambient: bool) {
        self.state.low_bit_ambient = low_bit_ambient;
        if !low_bit_ambient {
            self.hints.anti_alias = true;
        }
    }

    /// Apply a (possibly new) surface shape and re-measure text offsets
    pub fn on_apply_insets(&mut self, is_round: bool, metrics: &dyn TextMetrics) {
        self.state.is_round = is_round;
        self.layout = Layout::measure(&self.style, is_round, metrics);
        debug!("layout measured: {:?}", self.layout);
        self.invalidate();
    }

    /// Resize the drawing area without changing shape
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.invalidate();
    }

    /// Re-read the clock after the zone changed
    pub fn on_time_zone_changed(&mut self) {
        self.zone = self.clock.time_zone();
        self.refresh_time();
        self.invalidate();
    }

    /// Detect a zone change on the clock, applying it if found
    pub fn check_time_zone(&mut self) -> bool {
        let zone = self.clock.time_zone();
        if zone == self.zone {
            return false;
        }
        info!("time zone changed from {} to {zone}", self.zone);
        self.on_time_zone_changed();
        true
    }

    pub fn on_tap(&mut self) {
        self.invalidate();
    }

    /// Replace both temperatures at once. The previous update's icon is
    /// dropped; the returned ticket must accompany its replacement.
    pub fn on_weather_update(
        &mut self,
        high: impl Into<String>,
        low: impl Into<String>,
    ) -> WeatherTicket {
        let (high, low) = (high.into(), low.into());
        debug!("weather updated: {high} | {low}");
        self.state.temperature_high = Some(high);
        self.state.temperature_low = Some(low);
        self.state.icon = None;
        self.ticket = WeatherTicket(self.ticket.0 + 1);
        self.invalidate();
        self.ticket
    }

    /// Apply a decoded icon if it belongs to the latest weather update.
    ///
    /// Returns whether the icon was applied.
    pub fn on_icon_decoded(&mut self, ticket: WeatherTicket, icon: Icon) -> bool {
        if self.destroyed {
            return false;
        }
        if ticket != self.ticket {
            debug!(
                "discarding stale icon for update {} (current {})",
                ticket.0, self.ticket.0
            );
            return false;
        }
        self.state.icon = Some(icon);
        self.invalidate();
        true
    }

    /// Handle a scheduler wake: tick, then re-arm if still interactive.
    ///
    /// Returns false for a wake that was no longer armed.
    pub fn on_wake_fired(&mut self) -> bool {
        if self.scheduler.pending_wake_at().is_none() {
            return false;
        }
        self.on_tick();
        let now = self.now_ms();
        if let Some(next) = self.scheduler.fire(now) {
            debug!("next redraw at {next}");
        }
        true
    }

    /// Tear down; cancels any pending wake
    pub fn shutdown(&mut self) {
        info!("face engine shutting down");
        self.scheduler.cancel();
        self.destroyed = true;
    }

    /// Immutable copy of the current state
    pub fn snapshot(&self) -> FaceState {
        self.state.clone()
    }

    pub fn schedule(&self) -> ScheduleState {
        self.scheduler.state()
    }

    /// Next scheduled wake, in clock milliseconds
    pub fn pending_wake_at(&self) -> Option<u64> {
        self.scheduler.pending_wake_at()
    }

    pub fn is_visible(&self) -> bool {
        self.scheduler.state().visible
    }

    pub fn is_ambient(&self) -> bool {
        self.state.ambient
    }

    /// Total number of redraw requests so far
    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    pub fn hints(&self) -> RenderHints {
        self.hints
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Compose a frame from the current state
    pub fn render(&self) -> Frame {
        compose(
            &self.state,
            &self.layout,
            &self.style,
            self.hints,
            self.size,
        )
    }

    /// Collect the pending redraw, if dirty and visible
    pub fn take_redraw(&mut self) -> Option<Frame> {
        if !self.dirty || !self.is_visible() || self.destroyed {
            return None;
        }
        self.dirty = false;
        Some(self.render())
    }
}
