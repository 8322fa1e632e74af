pub mod commands;
pub mod error;
pub mod models;
pub mod services;

use clap::Parser;
use commands::{Cli, Command, LogFormat};
use error::AppError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool, format: LogFormat) {
    // --debug wins over RUST_LOG
    let filter = if debug {
        EnvFilter::new("warn,craft_monitor_lib=debug,craft_monitor=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,craft_monitor_lib=info,craft_monitor=info"))
    };

    // stdout is reserved for command output and the alert bell
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn dispatch(cli: Cli) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            runtime.block_on(commands::monitor::run_monitor(cli.config))?;
        }
        Command::Check => runtime.block_on(commands::config::check_config(cli.config))?,
        Command::Windows => commands::windows::print_windows()?,
        Command::Init { force } => {
            let path = commands::config::init_config(cli.config, force)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// CLI entry point
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.log_format);
    if cli.debug {
        tracing::debug!("Debug mode enabled - OCR text will be logged each poll");
    }

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
