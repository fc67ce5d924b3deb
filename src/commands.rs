// Shell command handlers
use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;

use crate::error::SessionClosed;
use crate::render::{Activity, RosterSnapshot};
use crate::roster::{AtBatAdjustment, PlayerId};
use crate::state::AppState;

pub const HELP: &str = "\
commands:
  list                 show the lineup
  play <id>            play (or stop) a player's walk-up song
  stop                 stop whatever is playing
  announce <id>        speak a player's name
  say <text>           speak any text
  inc <id> / dec <id>  adjust times at bat
  move <from> <to>     move a player to another slot (1-based)
  reset                reset counts and order
  reset-counts         reset counts only
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Play(PlayerId),
    Stop,
    Announce(PlayerId),
    Say(String),
    Adjust(PlayerId, AtBatAdjustment),
    /// Zero-based slots.
    Move { from: usize, to: usize },
    Reset,
    ResetCounts,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

fn player_id(arg: Option<&str>, usage: &'static str) -> Result<PlayerId, ParseError> {
    arg.and_then(|a| a.parse().ok())
        .ok_or(ParseError::Usage(usage))
}

fn slot(arg: Option<&str>) -> Result<usize, ParseError> {
    const USAGE: &str = "move <from> <to>";
    match arg.and_then(|a| a.parse::<usize>().ok()) {
        Some(n) if n > 0 => Ok(n - 1),
        _ => Err(ParseError::Usage(USAGE)),
    }
}

impl FromStr for ShellCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" | "" => Self::List,
            "play" => Self::Play(player_id(args.next(), "play <id>")?),
            "stop" => Self::Stop,
            "announce" => Self::Announce(player_id(args.next(), "announce <id>")?),
            "say" if !rest.is_empty() => Self::Say(rest.to_string()),
            "say" => return Err(ParseError::Usage("say <text>")),
            "inc" => Self::Adjust(
                player_id(args.next(), "inc <id>")?,
                AtBatAdjustment::Increase,
            ),
            "dec" => Self::Adjust(
                player_id(args.next(), "dec <id>")?,
                AtBatAdjustment::Decrease,
            ),
            "move" => Self::Move {
                from: slot(args.next())?,
                to: slot(args.next())?,
            },
            "reset" => Self::Reset,
            "reset-counts" => Self::ResetCounts,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Run one command. Returns text for the user, if there is any.
pub async fn execute(
    state: &AppState,
    command: ShellCommand,
) -> Result<Option<String>, SessionClosed> {
    let controller = &state.controller;
    let message = match command {
        ShellCommand::List => Some(format_lineup(&controller.snapshot().await?)),
        ShellCommand::Play(id) => {
            controller.play(id).await?;
            None
        }
        ShellCommand::Stop => {
            controller.stop().await?;
            None
        }
        ShellCommand::Announce(id) => {
            controller.announce_player(id).await?;
            None
        }
        ShellCommand::Say(text) => {
            controller.announce(text).await?;
            None
        }
        ShellCommand::Adjust(id, direction) => {
            if controller.adjust_at_bats(id, direction).await? {
                None
            } else {
                Some(format!("No change for player {}", id))
            }
        }
        ShellCommand::Move { from, to } => {
            if controller.reorder(from, to).await? {
                None
            } else {
                Some("Nothing moved".to_string())
            }
        }
        ShellCommand::Reset => {
            controller.reset().await?;
            None
        }
        ShellCommand::ResetCounts => {
            controller.reset_at_bats().await?;
            None
        }
        ShellCommand::Help => Some(HELP.to_string()),
        ShellCommand::Quit => None,
    };
    Ok(message)
}

/// One line per player, in lineup order, with a marker on whoever is active.
pub fn format_lineup(snapshot: &RosterSnapshot) -> String {
    if snapshot.players.is_empty() {
        return "(no players)".to_string();
    }

    let mut out = String::new();
    for (slot, player) in snapshot.players.iter().enumerate() {
        let marker = match snapshot.activity {
            Activity::Playing(id) if id == player.id => "♪",
            Activity::Unlocking(id) | Activity::Starting(id) if id == player.id => "…",
            _ => " ",
        };
        let song = player.playable_song().unwrap_or("-");
        let _ = writeln!(
            out,
            "{marker} {:>2}. #{:<3} {:<24} AB {:<3} [id {}] {}",
            slot + 1,
            player.number,
            player.name,
            player.times_batted,
            player.id,
            song
        );
    }
    if snapshot.activity == Activity::Announcing {
        out.push_str("  (announcing)\n");
    }
    out.truncate(out.trim_end().len());
    out
}
