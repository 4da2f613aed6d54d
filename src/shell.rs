//! # Command Shell
//!
//! Default line-oriented [`SessionHandler`]: the first word of a line selects
//! a command when it is a substring of exactly one command name, so `he`,
//! `elp` and `help` all run `help`.

use tracing::debug;

use crate::link::handler::{SessionHandler, SessionReply};

/// Command names and their help lines, in the order `help` lists them
const COMMANDS: &[(&str, &str)] = &[
    ("exit", "Disconnect from this session"),
    ("help", "Shows this help message"),
    ("quit", "Disconnect from this session"),
    ("set", "Shows all running parameters"),
];

const NOT_FOUND: &str = "Command not found, try help for more information.";
const AMBIGUOUS: &str = "Ambiguous command, try help for more information.";

/// Column width of command names in `help`
const HELP_NAME_WIDTH: usize = 15;

/// Column width of parameter names in `set`
const SET_NAME_WIDTH: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Exit,
    Help,
    Quit,
    Set,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "exit" => Some(Command::Exit),
            "help" => Some(Command::Help),
            "quit" => Some(Command::Quit),
            "set" => Some(Command::Set),
            _ => None,
        }
    }
}

/// Outcome of matching a typed word against the command table
#[derive(Debug, PartialEq, Eq)]
enum Lookup {
    Found(Command),
    NotFound,
    Ambiguous,
}

fn lookup(word: &str) -> Lookup {
    let mut matches = COMMANDS.iter().filter(|(name, _)| name.contains(word));

    match (matches.next(), matches.next()) {
        (None, _) => Lookup::NotFound,
        (Some((name, _)), None) => Command::from_name(name).map_or(Lookup::NotFound, Lookup::Found),
        (Some(_), Some(_)) => Lookup::Ambiguous,
    }
}

/// Line interpreter for one local station, shared by all peers
#[derive(Debug, Clone)]
pub struct CommandShell {
    host_call: String,
}

impl CommandShell {
    /// # Arguments
    ///
    /// * `host_call` - Local station as shown by `set`, e.g. `DB0AAA-3`
    pub fn new(host_call: impl Into<String>) -> Self {
        Self {
            host_call: host_call.into(),
        }
    }

    fn help(&self, out: &mut String) {
        line(out, "- HELP -");
        for (name, description) in COMMANDS {
            line(out, &format!("{:<width$} - {}", name, description, width = HELP_NAME_WIDTH));
        }
    }

    fn set(&self, user_call: &str, out: &mut String) {
        line(out, "- SET -");
        line(out, &format!("{:<width$}{}", "Host Call", self.host_call, width = SET_NAME_WIDTH));
        line(out, &format!("{:<width$}{}", "User Call", user_call, width = SET_NAME_WIDTH));
    }
}

/// Append one CR-terminated output line
fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\r');
}

impl SessionHandler for CommandShell {
    fn handle(&mut self, callsign: &str, text: &str) -> anyhow::Result<SessionReply> {
        let Some(word) = text.split_whitespace().next() else {
            return Ok(SessionReply::default());
        };

        let mut out = String::new();
        let command = match lookup(word) {
            Lookup::Found(command) => command,
            Lookup::NotFound => {
                line(&mut out, NOT_FOUND);
                return Ok(SessionReply::text(out));
            }
            Lookup::Ambiguous => {
                line(&mut out, AMBIGUOUS);
                return Ok(SessionReply::text(out));
            }
        };

        debug!("{} runs {:?}", callsign, command);

        match command {
            Command::Exit | Command::Quit => return Ok(SessionReply::disconnect()),
            Command::Help => self.help(&mut out),
            Command::Set => self.set(callsign, &mut out),
        }

        Ok(SessionReply::text(out))
    }
}
