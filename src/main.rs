// Walk-up lineup shell
// Usage: walkup [APP_DIR]
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use walkup_lib::commands::{self, ShellCommand};
use walkup_lib::logging;
use walkup_lib::render::{Notice, RenderSink, RosterSnapshot};
use walkup_lib::settings::AppSettings;
use walkup_lib::state::AppState;

/// Redraws the lineup on stdout whenever it changes.
struct TerminalRender;

impl RenderSink for TerminalRender {
    fn render(&mut self, snapshot: &RosterSnapshot) {
        println!("{}\n", commands::format_lineup(snapshot));
    }

    fn notify(&mut self, notice: &Notice) {
        println!("! {}", notice.message());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let app_dir = match std::env::args_os().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("Failed to resolve the working directory")?,
    };
    let settings = AppSettings::load(&app_dir)?;
    logging::init(&settings.logging.filter);

    let state = AppState::new(settings, app_dir, Box::new(TerminalRender));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match line.parse::<ShellCommand>() {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match commands::execute(&state, command).await {
            Ok(Some(message)) => println!("{}", message),
            Ok(None) => {}
            Err(e) => {
                tracing::error!("{}", e);
                break;
            }
        }
    }

    state.shutdown().await;
    Ok(())
}
