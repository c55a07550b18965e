use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::tape::DEFAULT_CAPACITY;

/// Source file used when none is given.
pub const DEFAULT_SOURCE_FILE: &str = "A.BF";

/// Settings for one run, after layering flags, environment, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: PathBuf,
    /// Requested tape size. Signed so that negative values reach the tape
    /// constructor and are rejected there rather than dropped here.
    pub memory: i64,
    pub max_steps: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_SOURCE_FILE),
            memory: DEFAULT_CAPACITY as i64,
            max_steps: None,
        }
    }
}

/// Values that may be supplied by one configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub file: Option<PathBuf>,
    pub memory: Option<i64>,
    pub max_steps: Option<u64>,
}

impl Overrides {
    /// Read `BF_FILE`, `BF_MEMORY` and `BF_MAX_STEPS` through `lookup`.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            file: lookup("BF_FILE").filter(|s| !s.is_empty()).map(PathBuf::from),
            memory: lookup("BF_MEMORY").and_then(|s| parse_value("BF_MEMORY", &s)),
            max_steps: lookup("BF_MAX_STEPS").and_then(|s| parse_value("BF_MAX_STEPS", &s)),
        }
    }

    /// Parse the `[interpreter]` section of a `bf.toml` file.
    ///
    /// Only flat `key = value` pairs are understood; values may be quoted.
    pub fn from_toml(content: &str) -> Self {
        let mut in_section = false;
        let mut map: HashMap<String, String> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                in_section = line[1..line.len() - 1].trim() == "interpreter";
                continue;
            }
            if !in_section {
                continue;
            }
            if let Some((key, raw)) = line.split_once('=') {
                let raw = raw.trim();
                let value = raw
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(raw);
                map.insert(key.trim().to_string(), value.to_string());
            }
        }

        Self {
            file: map.get("file").filter(|s| !s.is_empty()).map(PathBuf::from),
            memory: map.get("memory").and_then(|s| parse_value("memory", s)),
            max_steps: map.get("max_steps").and_then(|s| parse_value("max_steps", s)),
        }
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: Overrides) -> Self {
        Self {
            file: self.file.or(fallback.file),
            memory: self.memory.or(fallback.memory),
            max_steps: self.max_steps.or(fallback.max_steps),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().replace('_', "").parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw, "ignoring unparseable setting");
            None
        }
    }
}

impl Config {
    /// Resolve settings: `flags`, then the process environment, then the
    /// config file, then defaults.
    pub fn resolve(flags: Overrides) -> Self {
        let env = Overrides::from_env(|key| std::env::var(key).ok());
        let file = load_config_file().unwrap_or_default();
        Self::layered(flags, env, file)
    }

    /// Combine explicit layers, highest priority first.
    pub fn layered(flags: Overrides, env: Overrides, file: Overrides) -> Self {
        let merged = flags.or(env).or(file);
        let defaults = Config::default();
        Self {
            file: merged.file.unwrap_or(defaults.file),
            memory: merged.memory.unwrap_or(defaults.memory),
            max_steps: merged.max_steps.or(defaults.max_steps),
        }
    }
}

/// `BF_CONFIG` if set, otherwise `bf.toml` in the XDG config home.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("BF_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: /home/<user>/.config
    // On Windows: C:\Users\<user>\.config
    // On macOS: /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

fn load_config_file() -> Option<Overrides> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded config file");
    Some(Overrides::from_toml(&content))
}
