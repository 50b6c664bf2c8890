use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::input::ScreenPoint;
use crate::session::ReleaseTarget;

pub const DEFAULT_PORT: u16 = 4950;
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

// Bottom screen of the console, in pixels.
pub const DEFAULT_SCREEN_WIDTH: u32 = 320;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 240;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub release_target: ReleaseTarget,
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
    #[serde(default)]
    pub bindings: BTreeMap<String, ScreenPoint>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            release_target: ReleaseTarget::default(),
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            bindings: BTreeMap::new(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_screen_width() -> u32 {
    DEFAULT_SCREEN_WIDTH
}

fn default_screen_height() -> u32 {
    DEFAULT_SCREEN_HEIGHT
}

pub fn parse(content: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(content)
}

pub fn load_from_path(path: &Path) -> Option<FileConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match parse(&content) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

pub fn load_from_default_paths() -> Option<FileConfig> {
    for path in default_config_paths() {
        if path.exists() {
            if let Some(config) = load_from_path(&path) {
                return Some(config);
            }
        }
    }
    None
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("n3ds-pad.toml"));

    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config").join("n3ds-pad.toml"));
    }

    paths
}
