use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use synth_model::timing::TOTAL;
use synth_model::{EncodingTable, NameStyle, Settings, TimeLog};

mod listing;

#[derive(Parser, Debug)]
#[command(version, about = "Inspect a component catalog")]
struct Args {
    /// Path to the component catalog
    catalog: PathBuf,

    /// Path to .toml settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print names without their packages
    #[arg(long)]
    simple: bool,
    /// More output; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn settings(cli: &Args) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path).with_context(|| format!("Unable to read settings {}", path.display()))?,
        None => Settings::default(),
    };
    if cli.simple {
        settings.name_style = NameStyle::Simple;
    }
    settings.verbose = settings.verbose.max(cli.verbose);
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Args::parse();
    let settings = settings(&cli)?;
    init_logging(settings.verbose);

    let mut timing = TimeLog::new(settings.log_timing);
    timing.start(TOTAL);

    timing.start("catalog");
    let mut table = EncodingTable::new();
    let entries = listing::load_entries(&cli.catalog, &mut table, settings.name_style)?;
    timing.stop("catalog");
    info!(components = entries.len(), tokens = table.len(), "loaded catalog");

    timing.start("print");
    listing::print(&entries);
    timing.stop("print");

    timing.stop(TOTAL);
    if timing.is_enabled() {
        println!();
        print!("{}", timing.report());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn flags_override_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"verbose = 1\nlog_timing = true\n").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cli = Args::parse_from(["synth-harness", "catalog.toml", "--config", &path, "--simple", "-vvv"]);
        let settings = settings(&cli).unwrap();
        assert_eq!(settings.verbose, 3);
        assert_eq!(settings.name_style, NameStyle::Simple);
        assert!(settings.log_timing);
    }

    #[test]
    fn defaults_without_config() {
        let cli = Args::parse_from(["synth-harness", "catalog.toml"]);
        assert_eq!(settings(&cli).unwrap(), Settings::default());
    }

    #[test]
    fn unreadable_settings_are_an_error() {
        let cli = Args::parse_from(["synth-harness", "catalog.toml", "-c", "/nonexistent/settings.toml"]);
        assert!(settings(&cli).is_err());
    }
}
