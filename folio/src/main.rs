use std::path::Path;
use std::process::ExitCode;

use quire::error::Result;
use quire::{Config, Pipeline};
use tracing_subscriber::EnvFilter;

mod flags;

fn main() -> ExitCode {
    let flags = flags::Folio::from_env_or_exit();

    // `--verbose` forces `info`; otherwise `RUST_LOG`, falling back to `warn`.
    let filter = match flags.verbose {
        true => EnvFilter::new("info"),
        false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let pipeline = match configure(&flags).and_then(Pipeline::new) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    let start = std::time::Instant::now();
    match pipeline.run() {
        Ok(report) => {
            println!("{report}");
            println!("built in {}ms", start.elapsed().as_millis());
            match report.is_success() {
                true => ExitCode::SUCCESS,
                false => ExitCode::from(1),
            }
        }
        Err(e) => {
            eprintln!("error: {}", quire::error::Error::from(e));
            ExitCode::from(2)
        }
    }
}

/// Loads the configuration file, then applies the command-line overrides.
fn configure(flags: &flags::Folio) -> Result<Config> {
    let mut config = match &flags.config {
        Some(path) => Config::from_file(path)?,
        None => {
            let source = flags.source.as_deref().unwrap_or(Path::new("."));
            Config::discover([source, Path::new(".")])?
        }
    };

    if let Some(source) = &flags.source {
        config.source_root = source.clone();
    }

    if let Some(output) = &flags.output {
        config.destination_root = output.clone();
    }

    config.excluded_names.extend(flags.exclude.iter().cloned());
    for name in &flags.extension {
        config.markdown_extensions.insert(name.parse()?);
    }

    if let Some(name) = &flags.template {
        config.template = name.parse()?;
    }

    config.build_timestamp |= flags.timestamp;
    tracing::debug!(?config, "configured");
    Ok(config)
}
