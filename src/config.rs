use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use termion::event::Key;

use crate::actions::Action;
use crate::error::{Error, ErrorKind, Result};
use crate::locale::{Locale, WeekStart};

pub type KeyMap = HashMap<Key, Action>;

const CONFIG_PATH_ENV_VAR: &str = "PATRO_CONFIG_FILE";
const APP_DIR: &str = "patro";

pub fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env = env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from);

    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "Unable to find home directory")
    })?;

    let home_config = home.join(".patro.toml");

    let config_xdg = dirs::config_dir()
        .unwrap_or_else(|| home.join(".config"))
        .join(APP_DIR)
        .join("config.toml");

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

/// Loads `path` if given, otherwise the first existing default location.
/// Falls back to the defaults when no file exists at all.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => Some(path.to_owned()),
        None => find_configfile_locations()?
            .into_iter()
            .find(|candidate| candidate.is_file()),
    };

    match path {
        Some(path) => Config::from_file(&path),
        None => {
            log::info!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn default_key_map() -> KeyMap {
    let mut key_map = KeyMap::new();

    key_map.insert(Key::Char('h'), Action::PreviousMonth);
    key_map.insert(Key::Left, Action::PreviousMonth);
    key_map.insert(Key::Char('l'), Action::NextMonth);
    key_map.insert(Key::Right, Action::NextMonth);
    key_map.insert(Key::Char('k'), Action::PreviousYear);
    key_map.insert(Key::Up, Action::PreviousYear);
    key_map.insert(Key::Char('j'), Action::NextYear);
    key_map.insert(Key::Down, Action::NextYear);
    key_map.insert(Key::Char('t'), Action::GoToToday);
    key_map.insert(Key::Char('y'), Action::CopyToClipboard);
    key_map.insert(Key::Char('p'), Action::OpenPreferences);
    key_map.insert(Key::Char('q'), Action::Quit);

    key_map
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub week_start: WeekStart,
    pub language: Locale,
    pub calendar_data: Option<PathBuf>,
    pub export_file: Option<PathBuf>,
    pub tick_rate_ms: u64,
    #[serde(skip, default = "default_key_map")]
    pub key_map: KeyMap,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            week_start: WeekStart::default(),
            language: Locale::default(),
            calendar_data: None,
            export_file: None,
            tick_rate_ms: 60_000,
            key_map: default_key_map(),
            source: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Config> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|err| {
            Error::from(err).with_msg(&format!("could not read '{}'", path.display()))
        })?;

        let mut config = Self::from_toml_str(&content).map_err(|err| {
            Error::new(
                ErrorKind::ConfigParse,
                &format!(
                    "'{}': {}",
                    path.display(),
                    err.message.unwrap_or_default()
                ),
            )
        })?;
        config.source = Some(path.to_owned());

        log::debug!("Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn export_path(&self) -> Option<PathBuf> {
        self.export_file
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("month.md")))
    }

    /// The file in use, or the first place one would be looked for.
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.source.clone().or_else(|| {
            find_configfile_locations()
                .ok()
                .and_then(|locations| locations.into_iter().next())
        })
    }
}
