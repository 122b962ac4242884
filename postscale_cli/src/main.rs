mod cli;
mod error_fmt;
mod poll;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};
use postscale_config::{Config, Logging};
use postscale_core::ScaleSession;
use postscale_traits::{MonotonicClock, Transport};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::poll::PollParams;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(error = %e, "fatal");
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    color_eyre::install()?;

    let mut cfg = match &cli.config {
        Some(path) => postscale_config::load_file(path)?,
        None => Config::default(),
    };
    // Command-line overrides are held to the same rules as the file.
    if let Commands::Read {
        mode,
        interval_ms,
        count,
    } = &cli.cmd
    {
        if let Some(mode) = mode {
            cfg.poll.mode = (*mode).into();
        }
        if let Some(ms) = interval_ms {
            cfg.poll.interval_ms = *ms;
        }
        if count.is_some() {
            cfg.poll.count = *count;
        }
        cfg.validate()?;
    }
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    let transport = make_transport(&cfg)?;
    let session = ScaleSession::open_vendor(transport, cfg.device.vendor_id)?;

    match cli.cmd {
        Commands::Read { .. } => {
            let params = PollParams {
                mode: cfg.poll.mode,
                interval: Duration::from_millis(cfg.poll.interval_ms),
                count: cfg.poll.count,
                json: cli.json,
            };
            read(session, params)
        }
        Commands::SelfCheck => {
            let packet_size = session.packet_size();
            session.close()?;
            println!("self-check ok (endpoint packet size {packet_size})");
            Ok(())
        }
    }
}

/// Poll until done or interrupted, then release the session exactly once.
fn read<T: Transport>(mut session: ScaleSession<T>, params: PollParams) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .wrap_err("install Ctrl-C handler")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let polled = poll::run(
        &mut session,
        &MonotonicClock::new(),
        params,
        &shutdown,
        &mut out,
    );
    let closed = session.close();

    polled.wrap_err("write output")?;
    closed?;
    Ok(())
}

#[cfg(feature = "hardware")]
fn make_transport(cfg: &Config) -> Result<postscale_hardware::UsbTransport> {
    Ok(postscale_hardware::UsbTransport::new(Duration::from_millis(
        cfg.device.read_timeout_ms,
    )))
}

#[cfg(not(feature = "hardware"))]
fn make_transport(_cfg: &Config) -> Result<postscale_hardware::SimulatedTransport> {
    postscale_hardware::SimulatedTransport::from_env().wrap_err("configure simulated scale")
}

fn init_tracing(json: bool, cli_level: Option<&str>, logging: &Logging) -> Result<()> {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    // Logs go to stderr; stdout carries one line per reading.
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("init logging: {e}"))?;
    Ok(())
}
