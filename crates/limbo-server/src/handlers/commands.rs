//! The few slash commands a limbo player can run.

use crate::config::CommandsConfig;
use thiserror::Error;

pub const DEFAULT_TRANSFER_PORT: u16 = 25565;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Spawn,
    /// Toggle whether the player may fly.
    Fly,
    FlySpeed(f32),
    Transfer { host: String, port: u16 },
    Reconfigure,
}

/// Shown to the player as is.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command")]
    Unknown,
    #[error("Usage: /{0}")]
    Usage(String),
    #[error("{0:?} is not a speed between 0 and 1")]
    InvalidSpeed(String),
    #[error("{0:?} is not a port number")]
    InvalidPort(String),
}

impl Command {
    /// Parse a command line without its slash, matching against the
    /// configured names.
    pub fn parse(input: &str, names: &CommandsConfig) -> Result<Command, CommandError> {
        let mut args = input.split_whitespace();
        let name = args.next().ok_or(CommandError::Unknown)?;
        let is = |configured: &str| !configured.is_empty() && configured == name;

        if is(&names.spawn) {
            Ok(Command::Spawn)
        } else if is(&names.fly) {
            Ok(Command::Fly)
        } else if is(&names.fly_speed) {
            let arg = args
                .next()
                .ok_or_else(|| CommandError::Usage(format!("{} <0..1>", name)))?;
            let speed = arg
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite())
                .ok_or_else(|| CommandError::InvalidSpeed(arg.to_string()))?;
            Ok(Command::FlySpeed(speed.clamp(0.0, 1.0)))
        } else if is(&names.transfer) {
            let host = args
                .next()
                .ok_or_else(|| CommandError::Usage(format!("{} <host> [port]", name)))?;
            let port = match args.next() {
                Some(arg) => arg
                    .parse::<u16>()
                    .ok()
                    .filter(|&p| p != 0)
                    .ok_or_else(|| CommandError::InvalidPort(arg.to_string()))?,
                None => DEFAULT_TRANSFER_PORT,
            };
            Ok(Command::Transfer {
                host: host.to_string(),
                port,
            })
        } else if is(&names.reconfigure) {
            Ok(Command::Reconfigure)
        } else {
            Err(CommandError::Unknown)
        }
    }
}
