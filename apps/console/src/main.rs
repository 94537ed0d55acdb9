//! Gatehouse console composition root.

#![forbid(unsafe_code)]

mod console_commands;
mod console_config;
mod console_records;
mod console_services;
mod console_shell;
mod console_views;

use gatehouse_core::AppError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::console_commands::Command;
use crate::console_config::{ConsoleConfig, init_tracing};
use crate::console_services::build_console_services;
use crate::console_shell::ConsoleShell;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let services = build_console_services(&config);

    let _listener = services.session.start();
    services
        .provider
        .restore_session(config.credentials.is_some())
        .await;
    services.session.wait_until_resolved().await;
    info!(backend = ?config.backend, "gatehouse console ready");

    let mut shell = ConsoleShell::new(services);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("type help for commands");

    loop {
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|error| AppError::Internal(format!("failed to read input: {error}")))?
        else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("! {error}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match shell.execute(command).await {
            Ok(output) => output.iter().for_each(|line| println!("{line}")),
            Err(error) => println!("! {error}"),
        }
    }

    info!(view = %shell.route(), "gatehouse console closed");
    Ok(())
}
