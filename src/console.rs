//! Line-oriented front end: reads commands from stdin and feeds the session.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::config::Config;
use crate::input::{Button, TouchPoint};
use crate::session::{SessionError, SessionHandle};

const HELP: &str = "\
commands:
  press <button>      press and release a button (a b x y l r start select up down left right)
  touch <x> <y>       touch at protocol coordinates (0-4095)
  touch <binding>     touch a named point from the config file
  release             release the touch screen
  bindings            list configured bindings
  help                show this text
  quit                exit";

/// Where to touch: raw protocol coordinates or a binding name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TouchTarget {
    Point(TouchPoint),
    Binding(String),
}

impl TouchTarget {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, String> {
        match args {
            [name] => Ok(TouchTarget::Binding(name.as_ref().to_string())),
            [x, y] => Ok(TouchTarget::Point(TouchPoint {
                x: parse_coordinate(x.as_ref())?,
                y: parse_coordinate(y.as_ref())?,
            })),
            _ => Err("touch expects <x> <y> or a binding name".into()),
        }
    }

    pub fn resolve(&self, config: &Config) -> Result<TouchPoint, String> {
        match self {
            TouchTarget::Point(point) => Ok(*point),
            TouchTarget::Binding(name) => config
                .binding(name)
                .ok_or_else(|| format!("Unknown binding '{}'", name)),
        }
    }
}

fn parse_coordinate(s: &str) -> Result<u16, String> {
    s.parse()
        .map_err(|_| format!("Invalid coordinate '{}'", s))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Press(Button),
    Touch(TouchTarget),
    Release,
    Bindings,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["press", button] => Ok(ConsoleCommand::Press(button.parse()?)),
            ["touch", rest @ ..] => Ok(ConsoleCommand::Touch(TouchTarget::parse(rest)?)),
            ["release"] => Ok(ConsoleCommand::Release),
            ["bindings"] => Ok(ConsoleCommand::Bindings),
            ["help"] | ["?"] => Ok(ConsoleCommand::Help),
            ["quit"] | ["exit"] => Ok(ConsoleCommand::Quit),
            _ => Err(format!("Unknown command '{}' (try 'help')", s.trim())),
        }
    }
}

impl fmt::Display for ConsoleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleCommand::Press(button) => write!(f, "press {}", button),
            ConsoleCommand::Touch(TouchTarget::Point(p)) => write!(f, "touch {} {}", p.x, p.y),
            ConsoleCommand::Touch(TouchTarget::Binding(name)) => write!(f, "touch {}", name),
            ConsoleCommand::Release => write!(f, "release"),
            ConsoleCommand::Bindings => write!(f, "bindings"),
            ConsoleCommand::Help => write!(f, "help"),
            ConsoleCommand::Quit => write!(f, "quit"),
        }
    }
}

/// Read commands until `quit` or end of input. Stops early if the worker has died.
pub fn run<R: BufRead, W: Write>(
    handle: &SessionHandle,
    config: &Config,
    input: R,
    mut out: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };
        log::debug!("console: {}", command);

        let result = match &command {
            ConsoleCommand::Press(button) => handle.press_button_oneshot(*button),
            ConsoleCommand::Touch(target) => match target.resolve(config) {
                Ok(point) => handle.begin_touch(point.x, point.y),
                Err(e) => {
                    writeln!(out, "{}", e)?;
                    continue;
                }
            },
            ConsoleCommand::Release => handle.end_touch(),
            ConsoleCommand::Bindings => {
                if config.bindings.is_empty() {
                    writeln!(out, "no bindings configured")?;
                }
                for (name, p) in &config.bindings {
                    writeln!(out, "{:16} ({}, {})", name, p.x, p.y)?;
                }
                Ok(())
            }
            ConsoleCommand::Help => {
                writeln!(out, "{}", HELP)?;
                Ok(())
            }
            ConsoleCommand::Quit => break,
        };

        match result {
            Ok(()) => {}
            Err(e @ SessionError::CoordinateOutOfRange { .. }) => writeln!(out, "{}", e)?,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
