use std::path::PathBuf;

use clap::Parser;
use clap::ValueHint;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Prometheus endpoint to scrape
    ///
    /// The URL serving the text exposition format, usually ending in /metrics.
    #[arg(short, long, env="PROM_ENDPOINT", value_hint=ValueHint::Url, default_value="http://localhost:9100/metrics")]
    pub endpoint: String,

    /// Metric to print
    ///
    /// Print only the flattened values of this metric family. Without it every family is printed.
    #[arg(short, long, env="PROM_METRIC", value_hint=ValueHint::Other)]
    pub metric: Option<String>,

    /// Request timeout in seconds
    ///
    /// Give up on the scrape when the endpoint hasn't answered in time.
    #[arg(short, long, env="PROM_TIMEOUT", value_hint=ValueHint::Other)]
    pub timeout: Option<u64>,

    /// Print the metric families as JSON
    #[arg(long)]
    pub json: bool,

    /// Set the logging level
    #[arg(short, long, env="LOG_LEVEL", value_hint=ValueHint::Other, default_value="WARN")]
    pub loglevel: log::LevelFilter,

    /// Write logs to this file instead of stderr
    #[arg(long, env="LOG_FILE", value_hint=ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
}
