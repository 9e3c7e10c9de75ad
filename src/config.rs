mod error;

pub use error::{Error, ErrorKind};

use ini::{Ini, Properties};
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/scrapercfg.ini";

const SECTION: &str = "scraper";

const URL_WEATHER_CURRENT_KEY: &str = "urlWeatherCurrent";
const LAT_KEY: &str = "lat";
const LON_KEY: &str = "lon";
const API_KEY_CURRENT_KEY: &str = "api_key_current";
const URI_KEY: &str = "uri";
const POLL_INTERVAL_MINUTES_KEY: &str = "poll_interval_minutes";
const REQUEST_TIMEOUT_SECS_KEY: &str = "request_timeout_secs";

const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 20;

/// Settings read once at start-up and never reloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url_weather_current: String,
    pub lat: String,
    pub lon: String,
    pub api_key_current: String,
    pub uri: String,
    pub poll_interval: Duration,
    /// `None` leaves the HTTP agent without an explicit timeout.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        info!("reading configurations");
        debug!("config path: {}", path.as_ref().display());

        let ini = Ini::load_from_file(path)?;
        Config::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> Result<Config, Error> {
        let section = ini
            .section(Some(SECTION))
            .ok_or_else(|| Error::new(ErrorKind::MissingSection(SECTION)))?;

        let poll_interval = match optional_u64(section, POLL_INTERVAL_MINUTES_KEY)? {
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_MINUTES * 60),
            Some(minutes) => poll_interval(minutes)?,
        };

        Ok(Config {
            url_weather_current: required(section, URL_WEATHER_CURRENT_KEY)?,
            lat: required(section, LAT_KEY)?,
            lon: required(section, LON_KEY)?,
            api_key_current: required(section, API_KEY_CURRENT_KEY)?,
            uri: required(section, URI_KEY)?,
            poll_interval,
            request_timeout: optional_u64(section, REQUEST_TIMEOUT_SECS_KEY)?
                .map(Duration::from_secs),
        })
    }
}

// INI keys are matched case-insensitively, so `urlweathercurrent` and
// `urlWeatherCurrent` name the same setting.
fn lookup<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).or_else(|| {
        section
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn required(section: &Properties, key: &'static str) -> Result<String, Error> {
    lookup(section, key)
        .map(|v| v.trim().to_owned())
        .ok_or_else(|| Error::new(ErrorKind::MissingKey(key)))
}

// Zero would poll the API back to back.
fn poll_interval(minutes: u64) -> Result<Duration, Error> {
    match minutes.checked_mul(60) {
        Some(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::new(ErrorKind::InvalidValue {
            key: POLL_INTERVAL_MINUTES_KEY,
            value: minutes.to_string(),
        })),
    }
}

fn optional_u64(section: &Properties, key: &'static str) -> Result<Option<u64>, Error> {
    match lookup(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|_| {
            Error::new(ErrorKind::InvalidValue {
                key,
                value: raw.to_owned(),
            })
        }),
    }
}
