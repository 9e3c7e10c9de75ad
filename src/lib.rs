pub mod config;
mod poller;
mod schedule;
pub mod store;
pub mod weather;

pub use config::{Config, DEFAULT_CONFIG_PATH};
pub use poller::{Event, LogReporter, Outcome, Poller, Reporter, COLLECTION, DATABASE};
pub use store::{DocumentStore, MemoryStore, MongoStore, StoreType};
pub use weather::{OpenWeatherClient, RawResponse, Reading, WeatherSource};

use log::info;
use std::fmt;
use std::sync::mpsc::Receiver;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl std::error::Error for Error {}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

/// The kind of an error that can occur.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    Config(config::Error),
    Weather(weather::Error),
    Store(store::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::Config(ref err) => err.fmt(f),
            ErrorKind::Weather(ref err) => err.fmt(f),
            ErrorKind::Store(ref err) => err.fmt(f),
        }
    }
}

impl From<config::Error> for Error {
    fn from(e: config::Error) -> Self {
        Error {
            kind: ErrorKind::Config(e),
        }
    }
}

impl From<weather::Error> for Error {
    fn from(e: weather::Error) -> Self {
        Error {
            kind: ErrorKind::Weather(e),
        }
    }
}

impl From<store::Error> for Error {
    fn from(e: store::Error) -> Self {
        Error {
            kind: ErrorKind::Store(e),
        }
    }
}

/// Poll the configured API into the configured store every
/// `config.poll_interval` until `shutdown` fires or a cycle fails fatally.
pub fn run(config: &Config, shutdown: &Receiver<()>) -> Result<(), Error> {
    let store = StoreType::from_uri(&config.uri)?;
    let source = OpenWeatherClient::new(config);
    let mut poller = Poller::new(source, store, LogReporter);

    info!(
        "Polling every {}s into {}.{}",
        config.poll_interval.as_secs(),
        DATABASE,
        COLLECTION
    );

    schedule::run(&mut poller, config.poll_interval, shutdown)
}
