use std::path::Path;

use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}";

/// Logs go to stderr so that stdout only carries the scrape output.
pub fn app_config(log_file: Option<&Path>, level: LevelFilter) -> anyhow::Result<Config> {
    let appender = match log_file {
        Some(path) => {
            let file = FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(PATTERN)))
                .build(path)?;
            Appender::builder().build("app", Box::new(file))
        }
        None => {
            let console = ConsoleAppender::builder()
                .target(Target::Stderr)
                .encoder(Box::new(PatternEncoder::new(PATTERN)))
                .build();
            Appender::builder().build("app", Box::new(console))
        }
    };

    let config = Config::builder()
        .appender(appender)
        .build(Root::builder().appender("app").build(level))?;

    Ok(config)
}
