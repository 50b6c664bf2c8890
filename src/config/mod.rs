mod cli;
mod file;

pub use cli::{Cli, Command};
pub use file::{FileConfig, DEFAULT_PORT};

use std::collections::BTreeMap;
use std::time::Duration;

use crate::input::{ScreenPoint, TouchPoint};
use crate::session::{ReleaseTarget, SessionSettings};

/// Merged configuration from CLI args and TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: Option<String>,
    pub port: u16,
    pub debounce_ms: u64,
    pub release_target: ReleaseTarget,
    pub screen_width: u32,
    pub screen_height: u32,
    pub bindings: BTreeMap<String, ScreenPoint>,
}

impl Config {
    /// Load configuration by merging TOML file with CLI overrides.
    pub fn load(cli: &Cli) -> Self {
        let file_config = cli
            .config
            .as_ref()
            .and_then(|p| file::load_from_path(p))
            .or_else(file::load_from_default_paths)
            .unwrap_or_default();

        Self::merge(cli, file_config)
    }

    fn merge(cli: &Cli, file_config: FileConfig) -> Self {
        Self {
            host: cli.host.clone().or(file_config.host),
            port: cli.port.unwrap_or(file_config.port),
            debounce_ms: cli.debounce_ms.unwrap_or(file_config.debounce_ms),
            release_target: cli.release_target.unwrap_or(file_config.release_target),
            screen_width: file_config.screen_width,
            screen_height: file_config.screen_height,
            bindings: file_config.bindings,
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            release_target: self.release_target,
        }
    }

    /// Touch position of a named binding, scaled from screen pixels.
    pub fn binding(&self, name: &str) -> Option<TouchPoint> {
        self.bindings.get(name).map(|p| {
            TouchPoint::from_screen(p.x, p.y, self.screen_width, self.screen_height)
        })
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        match self.host.as_deref() {
            None | Some("") => {
                return Err("No console host configured (use --host or set host in the config file)")
            }
            Some(_) => {}
        }
        if self.port == 0 {
            return Err("Port must not be 0");
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err("Screen dimensions must not be 0");
        }
        Ok(())
    }
}
