use crate::poller::{Poller, Reporter};
use crate::store::DocumentStore;
use crate::weather::WeatherSource;
use crate::Error;
use log::{debug, info};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Run a cycle, then wait `interval`, until told to stop.
///
/// A message on `shutdown`, or every sender being dropped, ends the loop
/// after the current cycle. A fatal cycle error ends it immediately.
pub fn run<W, S, R>(
    poller: &mut Poller<W, S, R>,
    interval: Duration,
    shutdown: &Receiver<()>,
) -> Result<(), Error>
where
    W: WeatherSource,
    S: DocumentStore,
    R: Reporter,
{
    loop {
        poller.run_cycle()?;

        debug!("next cycle in {}s", interval.as_secs());
        match shutdown.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}
