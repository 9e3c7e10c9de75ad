use log::{debug, info};
use simplelog::{ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::mpsc;
use structopt::StructOpt;
use weather_scraper::DEFAULT_CONFIG_PATH;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::from_args();

    let log_config = ConfigBuilder::new().set_time_to_local(true).build();
    TermLogger::init(args.log_level, log_config, TerminalMode::Mixed)?;
    debug!("logger initialized");

    let config = weather_scraper::Config::load(&args.config)?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down after the current cycle");
        shutdown_tx.send(()).ok();
    })?;

    info!("Initialization complete");

    weather_scraper::run(&config, &shutdown_rx)?;

    Ok(())
}

#[derive(StructOpt)]
struct Cli {
    #[structopt(long, parse(from_os_str), default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}
