//! Async event loop owning the face engine

use std::time::Duration;

use face_core::{
    next_boundary, DisplaySurface, FaceEngine, FaceError, AMBIENT_UPDATE_RATE_MS,
};
use futures::future::OptionFuture;
use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::commands::{FaceEvent, HostEvent};
use crate::assets::IconJob;

enum EventResult {
    Continue,
    Quit,
}

/// Main loop: applies events to the engine, fires scheduled redraw wakes,
/// and draws whenever the engine is dirty and visible.
///
/// Returns after a quit event or once every event source and timer is gone.
pub async fn daemon_loop<S: DisplaySurface>(
    mut engine: FaceEngine,
    mut surface: S,
    mut events: UnboundedReceiver<FaceEvent>,
    icon_jobs: UnboundedSender<IconJob>,
) {
    loop {
        let now = engine.now_ms();

        // Interactive redraw wake, aligned to whole seconds
        let wake = engine
            .pending_wake_at()
            .map(|at| tokio::time::sleep(Duration::from_millis(at.saturating_sub(now))));

        // Host time tick while ambient, once a minute
        let ambient_tick = (engine.is_visible() && engine.is_ambient()).then(|| {
            tokio::time::sleep(Duration::from_millis(next_boundary(
                now,
                AMBIENT_UPDATE_RATE_MS,
            )))
        });

        tokio::select! {
            // host and feed events win over timers
            biased;
            Some(event) = events.recv() => {
                if let EventResult::Quit = handle_event(event, &mut engine, &surface, &icon_jobs) {
                    break;
                }
            },
            Some(_) = OptionFuture::from(wake) => {
                engine.check_time_zone();
                engine.on_wake_fired();
            },
            Some(_) = OptionFuture::from(ambient_tick) => {
                engine.check_time_zone();
                engine.on_tick();
            },
            else => break,
        }

        if let Some(frame) = engine.take_redraw() {
            if let Err(e) = surface.draw(&frame) {
                warn!("failed to draw frame: {e}");
            }
        }
    }

    engine.shutdown();
}

fn handle_event<S: DisplaySurface>(
    event: FaceEvent,
    engine: &mut FaceEngine,
    surface: &S,
    icon_jobs: &UnboundedSender<IconJob>,
) -> EventResult {
    match event {
        FaceEvent::Quit => return EventResult::Quit,
        FaceEvent::Host(event) => match event {
            HostEvent::Visibility(visible) => engine.on_visibility_changed(visible),
            HostEvent::Ambient(ambient) => engine.on_ambient_mode_changed(ambient),
            HostEvent::Shape { round } => engine.on_apply_insets(round, surface.metrics()),
            HostEvent::Resize { width, height } => engine.on_surface_changed(width, height),
            HostEvent::LowBitAmbient(low_bit) => engine.on_properties_changed(low_bit),
            HostEvent::Tap => engine.on_tap(),
            HostEvent::TimeZoneChanged => engine.on_time_zone_changed(),
        },
        FaceEvent::Weather(update) => {
            let ticket = engine.on_weather_update(update.high, update.low);
            match update.icon {
                Some(asset) => {
                    if icon_jobs.send(IconJob { ticket, asset }).is_err() {
                        warn!("icon worker is gone, showing weather without icon");
                    }
                },
                None => info!("{}, showing weather without icon", FaceError::AssetMissing),
            }
        },
        FaceEvent::IconDecoded { ticket, icon } => {
            if !engine.on_icon_decoded(ticket, icon) {
                debug!("icon for update {} arrived too late", ticket.generation());
            }
        },
    }
    EventResult::Continue
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use face_core::mock::{MockClock, RecordingSurface};
    use face_core::{FaceStyle, MonospaceMetrics, SurfaceInfo, WeatherUpdate};
    use image::RgbaImage;
    use tokio::sync::mpsc;

    use super::*;
    use crate::face::FaceHandle;

    const SURFACE: SurfaceInfo = SurfaceInfo {
        width: 320,
        height: 320,
        is_round: true,
        low_bit_ambient: false,
    };

    fn engine(clock: &MockClock) -> FaceEngine {
        FaceEngine::new(
            Box::new(clock.clone()),
            FaceStyle::default(),
            SURFACE,
            &MonospaceMetrics::default(),
        )
    }

    #[tokio::test]
    async fn applies_events_in_order_and_draws() {
        let clock = MockClock::at("2016-10-30T12:00:00Z");
        let surface = RecordingSurface::new(SURFACE);
        let (face, events) = FaceHandle::channel();
        let (job_tx, mut jobs) = mpsc::unbounded_channel();

        face.send(FaceEvent::Host(HostEvent::Visibility(true)));
        face.send(FaceEvent::Host(HostEvent::Ambient(true)));
        face.send(FaceEvent::Weather(WeatherUpdate {
            high: "75°".into(),
            low: "60°".into(),
            icon: Some(face_core::AssetRef::File("/icons/rain.png".into())),
        }));
        face.send(FaceEvent::Quit);

        daemon_loop(engine(&clock), surface.clone(), events, job_tx).await;

        let job = jobs.try_recv().unwrap();
        assert_eq!(job.ticket.generation(), 1);
        let frame = surface.last_frame().unwrap();
        let texts: Vec<_> = frame.texts().collect();
        assert_eq!(texts, ["12:00", "Sun, Oct 30 2016", "75° | 60°"]);
        // one frame per applied event, the quit draws nothing
        assert_eq!(surface.frame_count(), 3);
    }

    #[tokio::test]
    async fn resize_redraws_at_new_size() {
        let clock = MockClock::at("2016-10-30T12:00:00Z");
        let surface = RecordingSurface::new(SURFACE);
        let (face, events) = FaceHandle::channel();
        let (job_tx, _jobs) = mpsc::unbounded_channel();

        face.send(FaceEvent::Host(HostEvent::Visibility(true)));
        face.send(FaceEvent::Host(HostEvent::Ambient(true)));
        face.send("size 400 300".parse().unwrap());
        face.send(FaceEvent::Quit);
        daemon_loop(engine(&clock), surface.clone(), events, job_tx).await;

        let frame = surface.last_frame().unwrap();
        assert_eq!((frame.width, frame.height), (400, 300));
    }

    #[tokio::test]
    async fn late_icons_are_not_drawn() {
        let clock = MockClock::at("2016-10-30T12:00:00Z");
        let surface = RecordingSurface::new(SURFACE);
        let (face, events) = FaceHandle::channel();
        let (job_tx, mut jobs) = mpsc::unbounded_channel();

        let update = |high: &str| {
            FaceEvent::Weather(WeatherUpdate {
                high: high.into(),
                low: "60°".into(),
                icon: Some(face_core::AssetRef::Inline(Arc::from(&b"icon"[..]))),
            })
        };
        face.send(FaceEvent::Host(HostEvent::Visibility(true)));
        face.send(FaceEvent::Host(HostEvent::Ambient(true)));
        face.send(update("75°"));
        face.send(update("80°"));
        let runner = tokio::spawn(daemon_loop(engine(&clock), surface.clone(), events, job_tx));

        let first = jobs.recv().await.unwrap();
        let second = jobs.recv().await.unwrap();
        face.send(FaceEvent::IconDecoded {
            ticket: first.ticket,
            icon: Arc::new(RgbaImage::new(4, 4)),
        });
        face.send(FaceEvent::Host(HostEvent::Tap));
        face.send(FaceEvent::Quit);
        runner.await.unwrap();
        assert!(!surface.last_frame().unwrap().has_icon());
        assert_eq!(second.ticket.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_while_visible_and_interactive() {
        let clock = MockClock::at("2016-10-30T12:00:00.500Z");
        let surface = RecordingSurface::new(SURFACE);
        let (face, events) = FaceHandle::channel();
        let (job_tx, _jobs) = mpsc::unbounded_channel();

        face.send(FaceEvent::Host(HostEvent::Visibility(true)));
        let runner = tokio::spawn(daemon_loop(engine(&clock), surface.clone(), events, job_tx));

        // let the immediate wake fire
        tokio::time::sleep(Duration::from_millis(10)).await;
        let drawn = surface.frame_count();
        assert!(drawn >= 1);

        // the mock clock stands still, so every rearm waits a full second
        clock.advance_ms(500);
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert!(surface.frame_count() > drawn);

        face.send(FaceEvent::Host(HostEvent::Visibility(false)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        let hidden = surface.frame_count();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(surface.frame_count(), hidden);

        face.send(FaceEvent::Quit);
        runner.await.unwrap();
    }
}
