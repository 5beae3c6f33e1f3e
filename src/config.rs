//! Configuration loading and management
//!
//! Settings are a JSON document keyed by mod name and then option name.
//! Everything is read once at startup; bad values fall back to defaults
//! with a warning instead of failing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::hotkey::{Callbacks, HotkeyBinding, HotkeyListener, InverseModifier};
use crate::logging::LoggingLevel;

/// Mod name used when none is configured
pub const DEFAULT_MOD_NAME: &str = "easy-containers";

/// Option holding the hotkey table
const HOTKEYS_OPTION: &str = "hotkeys";
/// Entry in the hotkey table naming the inverse modifier
const INVERSE_ENTRY: &str = "inverse";
/// Hotkeys that act on everything and have no inverse variant
const NO_INVERSE: &[&str] = &[
    "sell",
    "transferAll",
    "allWeapons",
    "allArmors",
    "allAmmo",
    "allBooks",
];
/// Option holding the logging level
const LOGGING_OPTION: &str = "loggingLevel";

/// Errors reading the settings document
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings root must be an object")]
    NotAnObject,
}

/// Raw nested settings, `settings[mod][option]`
#[derive(Debug, Clone, Default)]
pub struct Settings {
    root: Map<String, Value>,
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str(json)? {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// Read settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Look up one option of one mod
    pub fn option(&self, mod_name: &str, option: &str) -> Option<&Value> {
        self.root.get(mod_name)?.get(option)
    }

    /// Logging level configured for `mod_name`
    ///
    /// Read on its own so the subscriber can be installed before the
    /// rest of the configuration is resolved and logged.
    pub fn logging_level(&self, mod_name: &str) -> LoggingLevel {
        LoggingLevel::from_setting(self.option(mod_name, LOGGING_OPTION))
    }
}

/// Resolved mod configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the mod section the values came from
    pub mod_name: String,

    /// Operation hotkeys by name; invalid entries are left out
    pub hotkeys: BTreeMap<String, HotkeyBinding>,

    /// Modifier that turns an operation into its inverse
    pub inverse: InverseModifier,

    /// Set when the configured inverse modifier was invalid and the
    /// default had to be used
    pub inverse_invalid: bool,

    pub logging_level: LoggingLevel,

    /// Per-category on/off flags, keyed by `(section, flag)`
    pub flags: BTreeMap<(String, String), bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mod_name: DEFAULT_MOD_NAME.to_string(),
            hotkeys: BTreeMap::new(),
            inverse: InverseModifier::default(),
            inverse_invalid: false,
            logging_level: LoggingLevel::default(),
            flags: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Resolve the configuration for `mod_name` out of `settings`
    pub fn from_settings(settings: &Settings, mod_name: &str) -> Self {
        let logging_level = settings.logging_level(mod_name);

        let mut hotkeys = BTreeMap::new();
        let mut inverse = InverseModifier::default();
        let mut inverse_invalid = false;

        match settings.option(mod_name, HOTKEYS_OPTION) {
            Some(Value::Object(table)) => {
                for (name, value) in table {
                    if name == INVERSE_ENTRY {
                        match value.as_str().map(str::parse::<InverseModifier>) {
                            Some(Ok(m)) => inverse = m,
                            _ => {
                                warn!(%value, "invalid inverse hotkey, reverting to Shift");
                                inverse_invalid = true;
                            }
                        }
                        continue;
                    }

                    match serde_json::from_value::<HotkeyBinding>(value.clone()) {
                        Ok(binding) => {
                            info!(hotkey = %name, %binding, "hotkey configured");
                            hotkeys.insert(name.clone(), binding);
                        }
                        Err(e) => {
                            warn!(hotkey = %name, %value, error = %e, "invalid hotkey, disabled");
                        }
                    }
                }
            }
            Some(other) => warn!(%other, "hotkeys option is not an object, no hotkeys configured"),
            None => warn!(mod_name, "no hotkeys configured"),
        }

        let mut flags = BTreeMap::new();
        if let Some(Value::Object(section)) = settings.root.get(mod_name) {
            for (section_name, value) in section {
                let Value::Object(entries) = value else {
                    continue;
                };
                if section_name == HOTKEYS_OPTION {
                    continue;
                }
                for (flag, v) in entries {
                    if let Some(on) = v.as_bool() {
                        flags.insert((section_name.clone(), flag.clone()), on);
                    }
                }
            }
        }

        Self {
            mod_name: mod_name.to_string(),
            hotkeys,
            inverse,
            inverse_invalid,
            logging_level,
            flags,
        }
    }

    /// Look up a configured hotkey
    pub fn hotkey(&self, name: &str) -> Option<&HotkeyBinding> {
        self.hotkeys.get(name)
    }

    /// Build a logging listener for every hotkey plus its inverse variant
    ///
    /// A hotkey with an inverse variant forbids the inverse modifier on
    /// its plain listener, unless its binding already says otherwise, so
    /// only one of the pair fires.
    pub fn listeners(&self) -> Vec<HotkeyListener> {
        let mut listeners = Vec::new();
        for (name, binding) in &self.hotkeys {
            let has_inverse = !NO_INVERSE.contains(&name.as_str());
            let plain = if has_inverse {
                binding.excluding(self.inverse)
            } else {
                *binding
            };
            listeners.push(
                HotkeyListener::new(name.clone(), plain).with_callbacks(Callbacks::logging(name.clone())),
            );

            if !has_inverse {
                continue;
            }
            let inverse_name = format!("{name}Inv");
            listeners.push(
                HotkeyListener::new(inverse_name.clone(), binding.inverse(self.inverse))
                    .with_callbacks(Callbacks::logging(inverse_name)),
            );
        }
        listeners
    }

    /// Whether a per-category flag is on; unknown flags are off
    pub fn is_enabled(&self, section: &str, flag: &str) -> bool {
        self.flags
            .get(&(section.to_string(), flag.to_string()))
            .copied()
            .unwrap_or(false)
    }
}

/// Runtime options for the binary, taken from the environment
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Settings document
    pub settings_path: PathBuf,

    /// Recorded input to replay
    pub replay_path: Option<PathBuf>,

    /// Mod section to read
    pub mod_name: String,

    /// Time between ticks
    pub tick: Duration,
}

impl RuntimeOptions {
    /// Default tick length, roughly one frame at 60 FPS
    pub const DEFAULT_TICK_MS: u64 = 16;

    /// Load options from environment and defaults
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load options through `var`, which looks up one variable by name
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = var("HOTKEY_EDGE_SETTINGS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("settings.json"));
        let replay_path = var("HOTKEY_EDGE_REPLAY").map(PathBuf::from);
        let mod_name = var("HOTKEY_EDGE_MOD").unwrap_or_else(|| DEFAULT_MOD_NAME.to_string());

        let tick_ms = match var("HOTKEY_EDGE_TICK_MS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("HOTKEY_EDGE_TICK_MS is not a number: {v:?}"))?,
            None => Self::DEFAULT_TICK_MS,
        };

        Ok(Self {
            settings_path,
            replay_path,
            mod_name,
            tick: Duration::from_millis(tick_ms.max(1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::events::KeyEdge;
    use crate::hotkey::{codes, ModifierRequirement};
    use crate::input::{InputSource, ScriptedInput};
    use crate::logging::capture_logs;
    use crate::scheduler::TickQueue;

    const SAMPLE: &str = r#"{
        "easy-containers": {
            "loggingLevel": "Info",
            "hotkeys": {
                "inverse": "Alt",
                "mark": "F5",
                "transfer": { "hk": "F6", "modifiers": { "ctrl": false } },
                "sell": "Ctrl+F7",
                "broken": "Hyper+Q",
                "disabled": null
            },
            "autocraft": { "alchemy": true, "smithing": false, "note": "x" }
        },
        "other-mod": { "loggingLevel": "Error" }
    }"#;

    #[test]
    fn test_settings_lookup() {
        let settings = Settings::from_json(SAMPLE).unwrap();
        assert_eq!(
            settings.option("other-mod", "loggingLevel"),
            Some(&Value::String("Error".to_string()))
        );
        assert!(settings.option("other-mod", "hotkeys").is_none());
        assert!(settings.option("missing", "hotkeys").is_none());
    }

    #[test]
    fn test_settings_must_be_object() {
        assert!(matches!(Settings::from_json("[]"), Err(ConfigError::NotAnObject)));
        assert!(matches!(Settings::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::from_json(SAMPLE).unwrap();
        let config = Config::from_settings(&settings, DEFAULT_MOD_NAME);

        assert_eq!(config.logging_level, LoggingLevel::Info);
        assert_eq!(config.inverse, InverseModifier::Alt);
        assert!(!config.inverse_invalid);

        assert_eq!(config.hotkeys.len(), 3);
        assert_eq!(config.hotkey("mark").unwrap().key(), codes::F5);
        let transfer = config.hotkey("transfer").unwrap();
        assert_eq!(transfer.modifiers().ctrl, ModifierRequirement::Forbidden);
        assert_eq!(config.hotkey("sell").unwrap().to_string(), "Ctrl+F7");

        // Invalid entries are disabled rather than fatal
        assert!(config.hotkey("broken").is_none());
        assert!(config.hotkey("disabled").is_none());
        assert!(config.hotkey("inverse").is_none());
    }

    #[test]
    fn test_flags() {
        let settings = Settings::from_json(SAMPLE).unwrap();
        let config = Config::from_settings(&settings, DEFAULT_MOD_NAME);
        assert!(config.is_enabled("autocraft", "alchemy"));
        assert!(!config.is_enabled("autocraft", "smithing"));
        assert!(!config.is_enabled("autocraft", "note"));
        assert!(!config.is_enabled("autocraft", "enchanting"));
        assert!(!config.is_enabled("hotkeys", "mark"));
    }

    #[test]
    fn test_invalid_inverse_falls_back_to_shift() {
        let settings =
            Settings::from_json(r#"{"m": {"hotkeys": {"inverse": "Meta", "mark": 63}}}"#).unwrap();
        let config = Config::from_settings(&settings, "m");
        assert_eq!(config.inverse, InverseModifier::Shift);
        assert!(config.inverse_invalid);
        assert_eq!(config.hotkey("mark"), Some(&HotkeyBinding::new(codes::F5)));
    }

    #[test]
    fn test_missing_mod_uses_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        let config = Config::from_settings(&settings, "nothing");
        assert!(config.hotkeys.is_empty());
        assert_eq!(config.logging_level, LoggingLevel::None);
        assert_eq!(config.inverse, InverseModifier::Shift);
        assert!(!config.inverse_invalid);
    }

    #[test]
    fn test_listeners_include_inverse_variants() {
        let settings = Settings::from_json(SAMPLE).unwrap();
        let config = Config::from_settings(&settings, DEFAULT_MOD_NAME);
        let listeners = config.listeners();
        let names: Vec<&str> = listeners.iter().map(|l| l.name()).collect();

        // Hotkeys come out sorted by name; `sell` has no inverse
        assert_eq!(names, vec!["mark", "markInv", "sell", "transfer", "transferInv"]);

        let mark_inv = &listeners[1];
        assert_eq!(mark_inv.binding().key(), codes::F5);
        assert_eq!(mark_inv.binding().modifiers().alt, ModifierRequirement::Required);

        // The plain listener gives way to its inverse; `sell` keeps Alt open
        assert_eq!(listeners[0].binding().modifiers().alt, ModifierRequirement::Forbidden);
        assert_eq!(listeners[2].binding().modifiers().alt, ModifierRequirement::Any);
    }

    #[test]
    fn test_inverse_chord_fires_only_inverse_listener() {
        let settings = Settings::from_json(SAMPLE).unwrap();
        let config = Config::from_settings(&settings, DEFAULT_MOD_NAME);
        let mut listeners = config.listeners();
        let queue = TickQueue::new();

        let mut input = ScriptedInput::from_json(r#"[["F5", "LeftAlt"], ["F5"]]"#).unwrap();
        input.begin_frame();
        let fired: Vec<String> = listeners
            .iter_mut()
            .filter_map(|l| l.poll(&input, &queue).map(|_| l.name().to_string()))
            .collect();
        assert_eq!(fired, vec!["markInv"]);

        input.begin_frame();
        let fired: Vec<(String, KeyEdge)> = listeners
            .iter_mut()
            .filter_map(|l| l.poll(&input, &queue).map(|edge| (l.name().to_string(), edge)))
            .collect();
        assert_eq!(
            fired,
            vec![
                ("mark".to_string(), KeyEdge::Press),
                ("markInv".to_string(), KeyEdge::Release)
            ]
        );
    }

    #[test]
    fn test_resolving_config_logs_under_configured_level() {
        let settings = Settings::from_json(SAMPLE).unwrap();
        let level = settings.logging_level(DEFAULT_MOD_NAME);
        assert_eq!(level, LoggingLevel::Info);

        let (config, logged) = capture_logs(level, || Config::from_settings(&settings, DEFAULT_MOD_NAME));
        assert_eq!(config.logging_level, level);
        assert!(logged.contains("hotkey configured"));
        assert!(logged.contains("invalid hotkey, disabled"));
        assert!(logged.contains("hotkey=broken"));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_runtime_options_defaults() {
        let options = RuntimeOptions::from_vars(vars(&[])).unwrap();
        assert_eq!(options.settings_path, PathBuf::from("settings.json"));
        assert!(options.replay_path.is_none());
        assert_eq!(options.mod_name, DEFAULT_MOD_NAME);
        assert_eq!(options.tick, Duration::from_millis(RuntimeOptions::DEFAULT_TICK_MS));
    }

    #[test]
    fn test_runtime_options_from_vars() {
        let options = RuntimeOptions::from_vars(vars(&[
            ("HOTKEY_EDGE_SETTINGS", "/etc/mods.json"),
            ("HOTKEY_EDGE_REPLAY", "demos/replay.json"),
            ("HOTKEY_EDGE_MOD", "other-mod"),
            ("HOTKEY_EDGE_TICK_MS", "33"),
        ]))
        .unwrap();
        assert_eq!(options.settings_path, PathBuf::from("/etc/mods.json"));
        assert_eq!(options.replay_path, Some(PathBuf::from("demos/replay.json")));
        assert_eq!(options.mod_name, "other-mod");
        assert_eq!(options.tick, Duration::from_millis(33));
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let options = RuntimeOptions::from_vars(vars(&[("HOTKEY_EDGE_TICK_MS", "0")])).unwrap();
        assert_eq!(options.tick, Duration::from_millis(1));
    }

    #[test]
    fn test_bad_tick_is_an_error() {
        let err = RuntimeOptions::from_vars(vars(&[("HOTKEY_EDGE_TICK_MS", "fast")])).unwrap_err();
        assert!(err.to_string().contains("HOTKEY_EDGE_TICK_MS is not a number"));
        assert!(err.to_string().contains("\"fast\""));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
