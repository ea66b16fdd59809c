use std::{collections::BTreeMap, time::Duration};

use anyhow::{bail, Context};
use clap::Parser;
use cli::Cli;
use promflat::{FetchConfig, Scraper};

use crate::logging::app_config;

mod cli;
mod logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    log4rs::init_config(app_config(cli.log_file.as_deref(), cli.loglevel)?)?;
    log::info!("Scraping {}", cli.endpoint);

    let scraper = Scraper::with_config(FetchConfig {
        timeout: cli.timeout.map(Duration::from_secs),
        ..FetchConfig::default()
    })?;

    if cli.json {
        let families = scraper
            .families(&cli.endpoint)
            .with_context(|| format!("scraping {}", cli.endpoint))?;
        println!("{}", serde_json::to_string_pretty(&families)?);
        return Ok(());
    }

    let flattened = scraper
        .parse(&cli.endpoint)
        .with_context(|| format!("scraping {}", cli.endpoint))?;
    log::info!("{} metric families flattened", flattened.len());

    match cli.metric {
        Some(name) => match flattened.get(&name) {
            Some(values) => println!("{:?}", values),
            None => bail!("{} has no metric called {}", cli.endpoint, name),
        },
        None => {
            let sorted: BTreeMap<_, _> = flattened.iter().collect();
            for (name, values) in sorted {
                println!("{} {:?}", name, values);
            }
        }
    }

    Ok(())
}
