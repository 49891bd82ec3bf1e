//! Watch face runtime: host adapter, feeds and the owning event loop

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use face_core::{DataItem, DisplaySurface, FaceEngine, WeatherUpdate};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

use crate::assets::{icon_worker, FsFetcher};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::surface::ConsoleSurface;
use crate::weather::{weather_feed, WeatherArgs};

mod commands;
mod daemon;

pub use commands::{FaceEvent, HostEvent};
pub use daemon::daemon_loop;

/// Cloneable sending side into the face event loop.
///
/// Safe to use from any task or thread; events are applied by the loop
/// that owns the engine, in the order they were sent.
#[derive(Debug, Clone)]
pub struct FaceHandle {
    tx: UnboundedSender<FaceEvent>,
}

impl FaceHandle {
    pub fn channel() -> (Self, UnboundedReceiver<FaceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Send an event. Returns false once the face has shut down.
    pub fn send(&self, event: FaceEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Forward a changed data item, ignoring anything that is not a
    /// complete weather update. Returns false once the face has shut down.
    pub fn data_changed(&self, item: DataItem) -> bool {
        let path = item.path.clone();
        match WeatherUpdate::from_item(item) {
            Some(update) => self.send(FaceEvent::Weather(update)),
            None => {
                debug!("ignoring data item on {path}");
                !self.tx.is_closed()
            },
        }
    }
}

/// Run the face until quit, reading host commands from stdin
pub fn run_face_app(config: Config, weather: WeatherArgs) -> Result<(), Box<dyn Error>> {
    run_with_host(config, weather, tokio::io::stdin())
}

fn run_with_host<R>(config: Config, weather: WeatherArgs, host: R) -> Result<(), Box<dyn Error>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    let res = rt.block_on(local.run_until(async_face_app(config, weather, host)));
    drop(local);
    // a pending stdin read holds a blocking thread until the next line
    rt.shutdown_timeout(Duration::from_millis(100));
    res
}

async fn async_face_app<R>(
    config: Config,
    weather: WeatherArgs,
    host: R,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let style = config.style.face_style()?;
    let surface = ConsoleSurface::new(&config.display);
    let engine = FaceEngine::new(
        Box::new(SystemClock),
        style.clone(),
        surface.info(),
        surface.metrics(),
    );

    let (face, events) = FaceHandle::channel();
    let (job_tx, job_rx) = mpsc::unbounded_channel();

    // Icon fetches run off the event loop
    tokio::spawn(icon_worker(
        Arc::new(FsFetcher),
        job_rx,
        face.clone(),
        config.refresh.icon_timeout,
        style.icon_size,
    ));

    tokio::task::spawn_local(weather_feed(
        weather,
        config.general.fahrenheit,
        config.weather.icon_dir.clone(),
        config.refresh.weather,
        face.clone(),
    ));

    tokio::spawn(host_commands(host, face.clone()));

    {
        let face = face.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                face.send(FaceEvent::Quit);
            }
        });
    }

    if config.display.start_visible {
        face.send(FaceEvent::Host(HostEvent::Visibility(true)));
    }
    drop(face);

    info!("face running, type 'quit' to exit");
    daemon_loop(engine, surface, events, job_tx).await;
    println!();
    Ok(())
}

/// Translate host command lines into face events
pub async fn host_commands<R: AsyncRead + Unpin>(input: R, face: FaceHandle) {
    let mut lines = LinesStream::new(BufReader::new(input).lines());
    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read host command: {e}");
                return;
            },
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<FaceEvent>() {
            Ok(event) => {
                if !face.send(event) {
                    return;
                }
            },
            Err(e) => warn!("{e}"),
        }
    }
    debug!("host input closed");
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Instant;

    use face_core::{AssetRef, WEATHER_PATH};
    use tokio::io::{AsyncWriteExt, ReadBuf};

    use super::*;

    /// Reads like tokio's stdin: the first read also parks a blocking
    /// thread that never hears back
    struct ParkedStdin<R> {
        inner: R,
        parked: bool,
    }

    impl<R: AsyncRead + Unpin> AsyncRead for ParkedStdin<R> {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if !self.parked {
                self.parked = true;
                tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(60)));
            }
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    #[test]
    fn quit_returns_while_host_input_is_open() {
        let (host, mut writer) = tokio::io::duplex(64);
        // buffered before the face starts; the writer stays open throughout
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(writer.write_all(b"tap\nquit\n")).unwrap();

        let mut config = Config::default();
        config.display.start_visible = false;
        let start = Instant::now();
        run_with_host(
            config,
            WeatherArgs::Disabled,
            ParkedStdin {
                inner: host,
                parked: false,
            },
        )
        .unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        drop(writer);
    }

    #[tokio::test]
    async fn host_lines_become_events() {
        let (face, mut events) = FaceHandle::channel();
        host_commands(&b"show\n\nbogus\nsize 200 100\n"[..], face).await;
        assert!(matches!(
            events.try_recv(),
            Ok(FaceEvent::Host(HostEvent::Visibility(true)))
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(FaceEvent::Host(HostEvent::Resize {
                width: 200,
                height: 100
            }))
        ));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn only_weather_items_reach_the_face() {
        let (face, mut events) = FaceHandle::channel();
        assert!(face.data_changed(DataItem {
            path: "/settings".into(),
            high: Some("1".into()),
            low: Some("2".into()),
            icon: None,
        }));
        assert!(events.try_recv().is_err());

        assert!(face.data_changed(DataItem {
            path: WEATHER_PATH.into(),
            high: Some("75°".into()),
            low: Some("60°".into()),
            icon: Some(AssetRef::File("/icons/rain.png".into())),
        }));
        assert!(matches!(events.try_recv(), Ok(FaceEvent::Weather(_))));

        drop(events);
        assert!(!face.send(FaceEvent::Quit));
    }
}
