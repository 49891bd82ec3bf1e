//! Weather feeds for the face

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bpaf::Bpaf;
use face_core::{format_temperature, AssetRef, DataItem, WeatherIcon, WEATHER_PATH};
use ipinfo::IpInfo;
use log::{info, warn};
use open_meteo_api::query::OpenMeteo;

use crate::config::WeatherConfig;
use crate::face::FaceHandle;

#[derive(Clone, Debug, PartialEq, Bpaf)]
#[bpaf(adjacent)]
pub struct Coords {
    /// Optional coordinates to use for fetching weather data, skipping ipinfo geolocation api.
    #[bpaf(long)]
    #[allow(dead_code)]
    pub coords: (),
    /// Latitude
    #[bpaf(positional("LAT"))]
    pub lat: f32,
    /// Longitude
    #[bpaf(positional("LON"))]
    pub long: f32,
}

/// Weather forecast options:
#[derive(Clone, Debug, PartialEq, Bpaf)]
pub enum WeatherArgs {
    /// Disable updating weather info completely
    #[bpaf(long("no-weather"))]
    Disabled,
    // default
    Auto {
        #[bpaf(external, optional)]
        coords: Option<Coords>,
    },
    #[bpaf(adjacent)]
    Manual {
        /// Manually provide weather data, skipping open-meteo weather api.
        #[bpaf(short, long)]
        #[allow(dead_code)]
        weather: (),
        /// High temperature, shown as given
        #[bpaf(positional("HIGH"))]
        high: String,
        /// Low temperature, shown as given
        #[bpaf(positional("LOW"))]
        low: String,
        /// Icon image to show next to the temperatures
        #[bpaf(positional("ICON"))]
        icon: Option<PathBuf>,
    },
}

impl WeatherArgs {
    /// Fill in what the command line left open from the config file
    pub fn resolve(self, config: &WeatherConfig) -> Self {
        match self {
            WeatherArgs::Auto { .. } if !config.enabled => WeatherArgs::Disabled,
            WeatherArgs::Auto { coords: None } => match (config.latitude, config.longitude) {
                (Some(lat), Some(lon)) => WeatherArgs::Auto {
                    coords: Some(Coords {
                        coords: (),
                        lat: lat as f32,
                        long: lon as f32,
                    }),
                },
                _ => WeatherArgs::Auto { coords: None },
            },
            other => other,
        }
    }
}

pub async fn get_coords() -> Result<(f32, f32), Box<dyn Error>> {
    info!("fetching geolocation from ipinfo ...");
    let mut ipinfo = IpInfo::new(ipinfo::IpInfoConfig {
        token: None,
        ..Default::default()
    })?;
    let info = ipinfo.lookup_self_v4().await?;
    let (lat, long) = info
        .loc
        .split_once(',')
        .ok_or_else(|| format!("malformed location '{}'", info.loc))?;
    Ok((lat.parse()?, long.parse()?))
}

/// Weather data from API
pub struct WeatherData {
    pub wmo: u8,
    pub is_day: bool,
    pub min: f32,
    pub max: f32,
}

/// Get today's forecast from open-meteo
pub async fn get_weather(
    lat: f32,
    long: f32,
    fahrenheit: bool,
) -> Result<WeatherData, Box<dyn Error>> {
    info!("fetching current weather from open-meteo for [{lat}, {long}] ...");
    let res = OpenMeteo::new()
        .coordinates(lat, long)?
        .current_weather()?
        .time_zone(open_meteo_api::models::TimeZone::Auto)?
        .daily()?
        .query()
        .await?;

    let current = res.current_weather.ok_or("response has no current weather")?;
    let wmo = current.weathercode as u8;
    let is_day = current.is_day == 1.0;

    let daily = res.daily.ok_or("response has no daily forecast")?;
    let mut min = daily
        .temperature_2m_min
        .first()
        .copied()
        .flatten()
        .ok_or("response has no minimum temperature")?;
    let mut max = daily
        .temperature_2m_max
        .first()
        .copied()
        .flatten()
        .ok_or("response has no maximum temperature")?;

    if fahrenheit {
        min = min * 9. / 5. + 32.;
        max = max * 9. / 5. + 32.;
    }

    Ok(WeatherData {
        wmo,
        is_day,
        min,
        max,
    })
}

/// Icon file for a condition inside `icon_dir`
pub fn icon_asset(icon_dir: &Path, wmo: u8, is_day: bool) -> Option<AssetRef> {
    let icon = WeatherIcon::from_wmo(wmo, is_day)?;
    Some(AssetRef::File(
        icon_dir.join(format!("{}.png", icon.file_stem())),
    ))
}

/// Produce one weather item for the given options.
///
/// `Ok(None)` means weather is disabled.
pub async fn fetch_item(
    args: &mut WeatherArgs,
    fahrenheit: bool,
    icon_dir: Option<&Path>,
) -> Result<Option<DataItem>, Box<dyn Error>> {
    match args {
        WeatherArgs::Disabled => Ok(None),
        WeatherArgs::Auto { coords } => {
            // attempt to backfill coordinates if not provided
            if coords.is_none() {
                match get_coords().await {
                    Ok((lat, long)) => {
                        *coords = Some(Coords {
                            coords: (),
                            lat,
                            long,
                        })
                    },
                    Err(e) => warn!("failed to fetch geolocation from ipinfo: {e}"),
                }
            }

            let Some(Coords { lat, long, .. }) = *coords else {
                return Err("no coordinates available for weather".into());
            };
            let data = get_weather(lat, long, fahrenheit).await?;
            info!(
                "fetched weather {{ wmo: {}, is_day: {}, min: {}, max: {} }}",
                data.wmo, data.is_day, data.min, data.max
            );
            Ok(Some(DataItem {
                path: WEATHER_PATH.into(),
                high: Some(format_temperature(data.max)),
                low: Some(format_temperature(data.min)),
                icon: icon_dir.and_then(|dir| icon_asset(dir, data.wmo, data.is_day)),
            }))
        },
        WeatherArgs::Manual {
            high, low, icon, ..
        } => {
            info!("using manual weather {high} | {low}");
            Ok(Some(DataItem {
                path: WEATHER_PATH.into(),
                high: Some(high.clone()),
                low: Some(low.clone()),
                icon: icon.clone().map(AssetRef::File),
            }))
        },
    }
}

/// Publish weather to the face every `interval` until the face goes away.
///
/// Manual weather is published once. Failed fetches are skipped; the face
/// keeps showing the last temperatures until the next successful one.
pub async fn weather_feed(
    mut args: WeatherArgs,
    fahrenheit: bool,
    icon_dir: Option<PathBuf>,
    interval: Duration,
    face: FaceHandle,
) {
    let mut interval = tokio::time::interval(interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match fetch_item(&mut args, fahrenheit, icon_dir.as_deref()).await {
            Ok(Some(item)) => {
                if !face.data_changed(item) {
                    return;
                }
            },
            Ok(None) => {
                info!("skipping weather");
                return;
            },
            Err(e) => warn!("failed to fetch weather, skipping: {e}"),
        }
        if matches!(args, WeatherArgs::Manual { .. }) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_fills_coordinates() {
        let config = WeatherConfig {
            latitude: Some(52.5),
            longitude: Some(13.4),
            ..Default::default()
        };
        let args = WeatherArgs::Auto { coords: None }.resolve(&config);
        assert_eq!(
            args,
            WeatherArgs::Auto {
                coords: Some(Coords {
                    coords: (),
                    lat: 52.5,
                    long: 13.4
                })
            }
        );
    }

    #[test]
    fn config_can_disable_weather() {
        let config = WeatherConfig {
            enabled: false,
            ..Default::default()
        };
        let args = WeatherArgs::Auto { coords: None }.resolve(&config);
        assert_eq!(args, WeatherArgs::Disabled);

        let manual = WeatherArgs::Manual {
            weather: (),
            high: "75°".into(),
            low: "60°".into(),
            icon: None,
        };
        assert_eq!(manual.clone().resolve(&config), manual);
    }

    #[test]
    fn icon_assets_by_condition() {
        let dir = Path::new("/icons");
        assert_eq!(
            icon_asset(dir, 61, true),
            Some(AssetRef::File("/icons/rain.png".into()))
        );
        assert_eq!(
            icon_asset(dir, 0, false),
            Some(AssetRef::File("/icons/clear_night.png".into()))
        );
        assert_eq!(icon_asset(dir, 42, true), None);
    }

    #[tokio::test]
    async fn manual_weather_is_published_once() {
        let (face, mut events) = FaceHandle::channel();
        let args = WeatherArgs::Manual {
            weather: (),
            high: "75°".into(),
            low: "60°".into(),
            icon: Some("/icons/rain.png".into()),
        };
        weather_feed(args, false, None, Duration::from_secs(60), face).await;

        let Some(crate::face::FaceEvent::Weather(update)) = events.recv().await else {
            panic!("expected a weather update");
        };
        assert_eq!(update.high, "75°");
        assert_eq!(update.low, "60°");
        assert_eq!(update.icon, Some(AssetRef::File("/icons/rain.png".into())));
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn disabled_weather_publishes_nothing() {
        let (face, mut events) = FaceHandle::channel();
        weather_feed(WeatherArgs::Disabled, false, None, Duration::from_secs(60), face).await;
        assert!(events.recv().await.is_none());
    }
}
