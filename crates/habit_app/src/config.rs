use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use habit_domain::habit::HabitDefinition;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0} (copy config.example.toml and fill in your credentials)")]
    NotFound(PathBuf),
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required notion settings (api_token, database_id)")]
    MissingCredentials,
    #[error("no habits configured: define [[habits]] or set notion.habits_database_id")]
    NoHabits,
    #[error("unsupported display rotation {0}, expected 0, 90, 180 or 270")]
    InvalidRotation(u16),
    #[error("{0}")]
    InvalidHabitWindow(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    pub api_token: String,
    pub database_id: String,
    #[serde(default)]
    pub habits_database_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Clockwise rotation applied before handoff, in degrees.
    pub rotation: u16,
    /// Path the packed panel frame is written to. When unset or missing,
    /// output falls back to a PNG preview.
    pub device_path: Option<PathBuf>,
    pub assets_dir: PathBuf,
    pub output: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rotation: 0,
            device_path: None,
            assets_dir: PathBuf::from("assets"),
            output: PathBuf::from("preview.png"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreakConfig {
    pub enabled: bool,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub enabled: bool,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub notion: NotionConfig,
    #[serde(default)]
    pub habits: Vec<HabitDefinition>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let contents =
            fs::read_to_string(path).map_err(|_| ConfigError::NotFound(path.to_path_buf()))?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Placeholder settings for demo rendering, which never contacts the
    /// API. Lets `--demo` run on a machine with no config file at all.
    pub fn demo_defaults() -> Self {
        Self {
            notion: NotionConfig {
                api_token: String::new(),
                database_id: String::new(),
                habits_database_id: None,
            },
            habits: Vec::new(),
            display: DisplayConfig::default(),
            streak: StreakConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }

    /// Whether habit definitions come from the remote definition database
    /// instead of this file.
    pub fn has_dynamic_habits(&self) -> bool {
        self.notion.habits_database_id.is_some()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.notion.api_token.is_empty() || self.notion.database_id.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if self.habits.is_empty() && !self.has_dynamic_habits() {
            return Err(ConfigError::NoHabits);
        }
        if !matches!(self.display.rotation, 0 | 90 | 180 | 270) {
            return Err(ConfigError::InvalidRotation(self.display.rotation));
        }
        for habit in &self.habits {
            habit
                .validate()
                .map_err(ConfigError::InvalidHabitWindow)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(contents: &str) -> Result<Config, ConfigError> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        Config::load(Some(file.path()))
    }

    const MINIMAL: &str = r#"
[notion]
api_token = "secret"
database_id = "abc123"

[[habits]]
name = "READ"
field_key = "Read"
icon = "book"
"#;

    #[test]
    fn minimal_config_loads_with_defaults() {
        let config = load_str(MINIMAL).unwrap();
        assert_eq!(config.habits.len(), 1);
        assert_eq!(config.display.rotation, 0);
        assert!(config.streak.enabled);
        assert!(config.calendar.enabled);
        assert!(!config.has_dynamic_habits());
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let result = load_str(
            r#"
[notion]
api_token = ""
database_id = "abc"

[[habits]]
name = "READ"
field_key = "Read"
icon = "book"
"#,
        );
        assert!(matches!(result, Err(ConfigError::MissingCredentials)));
    }

    #[test]
    fn habits_may_be_omitted_with_a_dynamic_source() {
        let result = load_str(
            r#"
[notion]
api_token = "secret"
database_id = "abc"
habits_database_id = "def"
"#,
        );
        assert!(result.unwrap().has_dynamic_habits());
    }

    #[test]
    fn no_habits_and_no_dynamic_source_is_an_error() {
        let result = load_str(
            r#"
[notion]
api_token = "secret"
database_id = "abc"
"#,
        );
        assert!(matches!(result, Err(ConfigError::NoHabits)));
    }

    #[test]
    fn rotation_must_be_a_quarter_turn() {
        let result = load_str(&format!("{MINIMAL}\n[display]\nrotation = 45\n"));
        assert!(matches!(result, Err(ConfigError::InvalidRotation(45))));
    }

    #[test]
    fn inverted_habit_window_is_rejected() {
        let result = load_str(
            r#"
[notion]
api_token = "secret"
database_id = "abc"

[[habits]]
name = "READ"
field_key = "Read"
icon = "book"
start_date = "2026-06-01"
deactivated_date = "2026-01-01"
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidHabitWindow(_))));
    }
}
