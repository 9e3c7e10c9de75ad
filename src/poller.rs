use crate::store::{self, Collection, DocumentStore};
use crate::weather::{Reading, WeatherSource};
use crate::Error;
use log::{error, info, warn};
use std::fmt;

pub const DATABASE: &str = "Weather";
pub const COLLECTION: &str = "CurrentWeather";
pub const UNIQUE_FIELD: &str = "dt";

/// Progress of a cycle, handed to a [`Reporter`] as it happens.
#[derive(Debug)]
pub enum Event<'a> {
    BadStatus(u16),
    Parsing,
    Pushing,
    Inserted(&'a Reading),
    /// The reading's `dt` is already stored.
    Duplicate(&'a store::Error),
    StoreFailed(&'a store::Error),
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BadStatus(status) => write!(f, "Failed to get data: {}", status),
            Self::Parsing => write!(f, "Parsing response text"),
            Self::Pushing => write!(f, "Pushing data to MongoDB"),
            Self::Inserted(reading) => {
                write!(f, "Data inserted successfully")?;
                match (reading.dt(), reading.observed_at()) {
                    (Some(dt), Some(at)) => write!(f, " (dt={}, {})", dt, at),
                    _ => Ok(()),
                }
            }
            Self::Duplicate(err) => write!(f, "Reading already stored: {}", err),
            Self::StoreFailed(err) => write!(f, "Failed to insert data: {}", err),
        }
    }
}

pub trait Reporter {
    fn report(&mut self, event: Event<'_>);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, event: Event<'_>) {
        match &event {
            Event::BadStatus(_) | Event::Duplicate(_) => warn!("{}", event),
            Event::StoreFailed(_) => error!("{}", event),
            _ => info!("{}", event),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Inserted,
    StoreFailed,
}

pub struct Poller<W, S, R> {
    source: W,
    store: S,
    reporter: R,
}

impl<W: WeatherSource, S: DocumentStore, R: Reporter> Poller<W, S, R> {
    pub fn new(source: W, store: S, reporter: R) -> Self {
        Poller {
            source,
            store,
            reporter,
        }
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Fetch, parse and store one reading.
    ///
    /// A non-200 status is reported and the body is parsed anyway. Failures
    /// to index or insert are reported and yield `Outcome::StoreFailed`.
    /// Anything returned as `Err` is fatal: transport errors, a body that is
    /// not JSON, or a store that cannot be connected to.
    pub fn run_cycle(&mut self) -> Result<Outcome, Error> {
        let resp = self.source.fetch()?;
        if !resp.is_ok() {
            self.reporter.report(Event::BadStatus(resp.status));
        }

        self.reporter.report(Event::Parsing);
        let reading = Reading::parse(&resp.body)?;

        self.reporter.report(Event::Pushing);
        let mut conn = self.store.connect(DATABASE, COLLECTION)?;

        let outcome = match store_reading(&mut conn, &reading) {
            Ok(()) => {
                self.reporter.report(Event::Inserted(&reading));
                Outcome::Inserted
            }
            Err(e) => {
                if e.is_duplicate_key() {
                    self.reporter.report(Event::Duplicate(&e));
                } else {
                    self.reporter.report(Event::StoreFailed(&e));
                }
                Outcome::StoreFailed
            }
        };

        drop(conn);
        Ok(outcome)
    }
}

fn store_reading<C: Collection>(conn: &mut C, reading: &Reading) -> Result<(), store::Error> {
    conn.ensure_unique_descending_index(UNIQUE_FIELD)?;
    conn.insert_one(reading.as_value())
}
