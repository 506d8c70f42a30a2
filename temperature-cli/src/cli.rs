use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{CustomType, Text};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use temperature_core::{Config, Coordinates, RecordSet, StoredRecord, TemperatureService};

use crate::serve;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "temperature", version, about = "Temperature alert service")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the config file interactively.
    Configure,

    /// Look up, classify and record the temperature for one coordinate pair.
    Show {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Serve the HTTP query interface, forwarding lookups to the scraper.
    Api,

    /// Serve ListTemperature: fetch, classify, and forward to the store.
    Scraper,

    /// Serve SaveTemperature on top of the local database.
    Store,

    /// Run the query interface, scraper and store in one process.
    Standalone,

    /// Print the records of one record set (success, alert or error).
    Records {
        set: RecordSet,

        /// Print one JSON document per line.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Configure => configure(&config_path),
            Command::Show { latitude, longitude } => {
                let config = load_config(&config_path)?;
                show(&config, Coordinates::new(latitude, longitude)).await
            }
            Command::Api => serve::run_api(&load_config(&config_path)?).await,
            Command::Scraper => serve::run_scraper(&load_config(&config_path)?).await,
            Command::Store => serve::run_store(&load_config(&config_path)?).await,
            Command::Standalone => serve::run_standalone(&load_config(&config_path)?).await,
            Command::Records { set, json } => {
                let config = load_config(&config_path)?;
                print_records(&config, set, json)
            }
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_from(path)?;
    config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
    Ok(config)
}

fn configure(path: &Path) -> Result<()> {
    let mut cfg = Config::load_from(path)?;

    cfg.api.listen = prompt_addr("Query API listen address:", cfg.api.listen)?;
    cfg.api.scraper_url = Text::new("Scraper URL:").with_default(&cfg.api.scraper_url).prompt()?;

    cfg.scraper.listen = prompt_addr("Scraper listen address:", cfg.scraper.listen)?;
    cfg.scraper.store_url = Text::new("Store URL:").with_default(&cfg.scraper.store_url).prompt()?;

    cfg.store.listen = prompt_addr("Store listen address:", cfg.store.listen)?;
    let db_default = cfg.store.database_path()?.display().to_string();
    cfg.store.path = Some(PathBuf::from(
        Text::new("Database file:").with_default(&db_default).prompt()?,
    ));

    cfg.forecast.url = Text::new("Forecast endpoint:").with_default(&cfg.forecast.url).prompt()?;
    cfg.forecast.timeout_secs = CustomType::<u64>::new("Forecast timeout (seconds):")
        .with_default(cfg.forecast.timeout_secs)
        .prompt()?;

    cfg.alert.low =
        CustomType::<f64>::new("Alert below (°C):").with_default(cfg.alert.low).prompt()?;
    cfg.alert.high =
        CustomType::<f64>::new("Alert above (°C):").with_default(cfg.alert.high).prompt()?;

    cfg.validate()?;
    cfg.save_to(path)?;

    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn prompt_addr(message: &str, current: SocketAddr) -> Result<SocketAddr> {
    Ok(CustomType::<SocketAddr>::new(message)
        .with_default(current)
        .with_error_message("Expected an address like 0.0.0.0:8080")
        .prompt()?)
}

async fn show(config: &Config, coords: Coordinates) -> Result<()> {
    let sink = serve::open_store(config)?;
    let scraper = serve::build_scraper(config, Arc::new(sink))?;

    let reading = scraper.list_temperature(coords).await.with_context(|| {
        format!("Failed to get temperature for {}, {}", coords.latitude, coords.longitude)
    })?;

    println!(
        "{:.2}, {:.2} at {}",
        reading.latitude,
        reading.longitude,
        Local::now().format("%Y-%m-%d %H:%M")
    );
    println!("  Temperature: {:.1} °C", reading.temperature);
    println!("  Alert:       {}", yes_no(reading.alert));
    println!("  Upstream OK: {}", yes_no(!reading.error));

    Ok(())
}

fn print_records(config: &Config, set: RecordSet, json: bool) -> Result<()> {
    let sink = serve::open_store(config)?;
    let records = sink.records(set)?;

    if json {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
        return Ok(());
    }

    if records.is_empty() {
        println!("No records in '{set}'.");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_record(record));
    }
    println!("{} record(s) in '{set}'.", records.len());
    Ok(())
}

fn format_record(record: &StoredRecord) -> String {
    let r = &record.request;
    format!(
        "{}  {:>8.2} {:>8.2}  {:>6.1} °C  alert={:<5} error={:<5} status={}",
        record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        r.latitude,
        r.longitude,
        r.temperature,
        r.alert,
        r.error,
        r.source_status_code,
    )
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
