use std::error::Error;
use std::path::PathBuf;

use bpaf::{Bpaf, Parser};
use face_core::{DisplaySurface, FaceEngine, WeatherUpdate};
use log::{info, warn};

use crate::assets::{load_icon, FsFetcher};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::media::rasterize;
use crate::surface::{frame_line, ConsoleSurface};
use crate::weather::{fetch_item, weather_args, WeatherArgs};

mod assets;
mod clock;
mod config;
mod face;
mod media;
mod surface;
mod weather;

fn fahrenheit() -> impl Parser<bool> {
    bpaf::short('f')
        .long("fahrenheit")
        .help(
            "Use fahrenheit for all fetched temperatures. \
No effect on any manually provided data.",
        )
        .switch()
}

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version, descr(env!("CARGO_PKG_DESCRIPTION")))]
struct Cli {
    /// Use this config file instead of the platform default
    #[bpaf(long, argument("PATH"))]
    config: Option<PathBuf>,
    #[bpaf(external)]
    fahrenheit: bool,
    #[bpaf(external(command))]
    command: Command,
}

#[derive(Clone, Debug)]
enum Command {
    /// Run the face, reading host commands from stdin (default).
    Run { weather: WeatherArgs },
    /// Render a single frame to a png and exit.
    Preview { weather: WeatherArgs, output: PathBuf },
}

fn command() -> impl Parser<Command> {
    let run = weather_args()
        .map(|weather| Command::Run { weather })
        .to_options()
        .descr("Run the face, reading host commands from stdin")
        .command("run")
        .help("Run the face, reading host commands from stdin (default)");

    let output = bpaf::positional::<PathBuf>("OUTPUT").help("Where to write the png");
    let preview = bpaf::construct!(weather_args(), output)
        .map(|(weather, output)| Command::Preview { weather, output })
        .to_options()
        .descr("Render a single frame to a png and exit")
        .command("preview")
        .help("Render a single frame to a png and exit");

    bpaf::construct!([run, preview]).fallback(Command::Run {
        weather: WeatherArgs::Auto { coords: None },
    })
}

/// Fetch weather once and render one frame with it
async fn preview(
    config: &Config,
    mut weather: WeatherArgs,
    output: PathBuf,
) -> Result<(), Box<dyn Error>> {
    let style = config.style.face_style()?;
    let surface = ConsoleSurface::new(&config.display);
    let mut engine = FaceEngine::new(
        Box::new(SystemClock),
        style.clone(),
        surface.info(),
        surface.metrics(),
    );
    engine.on_visibility_changed(true);

    let item = fetch_item(
        &mut weather,
        config.general.fahrenheit,
        config.weather.icon_dir.as_deref(),
    )
    .await;
    match item.map(|item| item.and_then(WeatherUpdate::from_item)) {
        Ok(Some(update)) => {
            let ticket = engine.on_weather_update(update.high, update.low);
            if let Some(asset) = update.icon {
                match load_icon(
                    &FsFetcher,
                    &asset,
                    config.refresh.icon_timeout,
                    style.icon_size,
                )
                .await
                {
                    Ok(icon) => {
                        engine.on_icon_decoded(ticket, icon);
                    },
                    Err(e) => warn!("rendering without icon: {e}"),
                }
            }
        },
        Ok(None) => info!("skipping weather"),
        Err(e) => warn!("failed to fetch weather, skipping: {e}"),
    }

    let frame = engine.render();
    rasterize(&frame).save(&output)?;
    println!("{}", frame_line(&frame));
    info!("wrote preview to {}", output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli().run();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_create()?,
    };
    config.general.fahrenheit |= cli.fahrenheit;

    match cli.command {
        Command::Run { weather } => {
            let weather = weather.resolve(&config.weather);
            face::run_face_app(config, weather)
        },
        Command::Preview { weather, output } => {
            let weather = weather.resolve(&config.weather);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(preview(&config, weather, output))
        },
    }
}
