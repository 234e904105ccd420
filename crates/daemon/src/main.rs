// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! telewatchd: watches one or more log sources for a long-running process,
//! classifies anomalies, and posts rate-limited notifications to Telegram.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use telewatch_adapters::transport::TelegramTransport;
use telewatch_daemon::{advisor, config, lifecycle, logging, sources, LifecycleError};
use tracing::{error, info};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if let Some(arg) = args.get(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("telewatchd {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            "--help" | "-h" | "help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            path if !path.starts_with('-') => {}
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: telewatchd <config.yaml>");
                return ExitCode::from(2);
            }
        }
    } else {
        eprintln!("Usage: telewatchd <config.yaml>");
        return ExitCode::from(2);
    }

    let config_path = PathBuf::from(&args[1]);

    logging::init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start the async runtime: {e}");
            return ExitCode::from(3);
        }
    };

    match runtime.block_on(run(config_path)) {
        Ok(()) => {
            info!("normal shutdown");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn print_help() {
    println!("telewatchd {}", env!("CARGO_PKG_VERSION"));
    println!("Watches log sources for a long-running process and reports anomalies to Telegram");
    println!();
    println!("USAGE:");
    println!("    telewatchd <config.yaml>");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

async fn run(config_path: PathBuf) -> Result<(), LifecycleError> {
    let cfg = config::load(&config_path)?;

    let source_adapters = sources::build(&cfg.monitors)?;
    let advisor = advisor::build(cfg.llm.as_ref());
    let transport = TelegramTransport::new(cfg.telegram.bot_token.clone(), cfg.telegram.chat_id.clone());
    let shutdown = lifecycle::install_shutdown_signals()?;

    info!(monitors = cfg.monitors.len(), turbo = cfg.turbo, "starting telewatchd");

    telewatch_engine::run(source_adapters, Some(advisor), transport, &cfg, shutdown)
        .await
        .map_err(LifecycleError::Pipeline)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
