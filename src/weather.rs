mod error;
mod reading;

pub use error::{Error, ErrorKind};
pub use reading::Reading;

use crate::config::Config;
use log::{debug, info};

const UNITS: &str = "metric";

/// Status and body of one API response, whatever the status was.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

pub trait WeatherSource {
    fn fetch(&mut self) -> Result<RawResponse, Error>;
}

pub fn request_url(config: &Config) -> String {
    format!(
        "{}?lat={}&lon={}&appid={}&units={}",
        config.url_weather_current, config.lat, config.lon, config.api_key_current, UNITS
    )
}

pub struct OpenWeatherClient {
    agent: ureq::Agent,
    uri: String,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> OpenWeatherClient {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        info!(
            "Polling {} for lat={} lon={}",
            config.url_weather_current, config.lat, config.lon
        );

        OpenWeatherClient {
            agent: builder.build(),
            uri: request_url(config),
        }
    }
}

impl WeatherSource for OpenWeatherClient {
    fn fetch(&mut self) -> Result<RawResponse, Error> {
        debug!("requesting current weather");

        // ureq reports 4xx/5xx as errors but still hands over the response.
        let resp = match self.agent.get(&self.uri).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(e) => return Err(e.into()),
        };

        let status = resp.status();
        let body = resp.into_string()?;
        debug!("received {} bytes with status {}", body.len(), status);

        Ok(RawResponse { status, body })
    }
}
