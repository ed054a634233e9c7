use std::{fs::OpenOptions, path::Path};

use anyhow::Context;
use env_logger::Target;
use log::LevelFilter;

pub const LOG_FILE: &str = "slotwatch.log";

/// Sends every record to `path`, appending. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(Target::Pipe(Box::new(file)))
        .write_style(env_logger::WriteStyle::Never)
        .try_init()
        .context("logger already initialized")?;
    Ok(())
}
