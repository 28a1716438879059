use std::{path::PathBuf, process::ExitCode, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let _guard = match setup_logging(&args.log_level, &args.log_file).await {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to set up logging: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    match commands::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Install the global subscriber: human readable logs on stderr, plus JSON logs in a
/// file unless `log_file` is "none".
async fn setup_logging(log_level: &str, log_file: &str) -> Result<Option<WorkerGuard>> {
    let level = tracing::Level::from_str(log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", log_level))?;

    let log_file_path = match log_file {
        "none" => None,
        "auto" => {
            let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
            let filename = format!("pathmeter-{time}.log");
            let path = dirs::data_local_dir()
                .map(|p| p.join("pathmeter").join(&filename))
                .unwrap_or_else(|| PathBuf::from(&filename));
            Some(path)
        }
        path => {
            let path = PathBuf::from(path);
            if path.exists() {
                anyhow::bail!("Log file already exists: {}", path.display());
            }
            Some(path)
        }
    };

    let (logfile_layer, guard) = match &log_file_path {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path.file_name().context("Log file path has no file name")?;
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(&dir, file_name);
            let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::Layer::default()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking_appender);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = fmt::Layer::default()
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(stderr_layer)
        .with(logfile_layer)
        .try_init()
        .context("Unable to set global tracing subscriber")?;

    if let Some(path) = log_file_path {
        tracing::debug!("Saving logs to {}", path.display());
    }

    Ok(guard)
}
