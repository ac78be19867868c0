use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use crate::error::ConfigError;
use crate::parameters::{ConnectionParameters, SolutionTarget};

const FILE_NAME: &str = "plugin-activator.toml";

/// One layer of configuration. Keys in the file use the environment variable names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub dynamics_url: Option<String>,
    pub authority: Option<String>,
    pub solution_unique_name: Option<String>,
    pub enable_plugin_steps: Option<bool>,
}

impl Settings {
    /// Reads `path`, or the default file if it exists. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::read(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::read(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "plugin-activator", "plugin-activator").map(|d| d.config_dir().join(FILE_NAME))
    }

    /// Values set in `over` win; blank strings count as unset.
    pub fn merge(self, over: Settings) -> Settings {
        fn pick(low: Option<String>, high: Option<String>) -> Option<String> {
            non_blank(high).or_else(|| non_blank(low))
        }

        Settings {
            client_id: pick(self.client_id, over.client_id),
            client_secret: pick(self.client_secret, over.client_secret),
            dynamics_url: pick(self.dynamics_url, over.dynamics_url),
            authority: pick(self.authority, over.authority),
            solution_unique_name: pick(self.solution_unique_name, over.solution_unique_name),
            enable_plugin_steps: over.enable_plugin_steps.or(self.enable_plugin_steps),
        }
    }

    /// Validates the merged values. Nothing is contacted here.
    pub fn resolve(self) -> Result<(ConnectionParameters, SolutionTarget), ConfigError> {
        let solution_unique_name =
            non_blank(self.solution_unique_name).ok_or(ConfigError::Missing("SOLUTION_UNIQUE_NAME"))?;
        let client_id = non_blank(self.client_id).ok_or(ConfigError::Missing("CLIENT_ID"))?;
        let client_secret = non_blank(self.client_secret).ok_or(ConfigError::Missing("CLIENT_SECRET"))?;
        let dynamics_url = non_blank(self.dynamics_url).ok_or(ConfigError::Missing("DYNAMICS_URL"))?;

        let mut connection = ConnectionParameters::new(client_id, client_secret, dynamics_url);
        if let Some(authority) = non_blank(self.authority) {
            connection = connection.with_authority(authority);
        }

        let solution = SolutionTarget::new(solution_unique_name, self.enable_plugin_steps.unwrap_or(false));
        Ok((connection, solution))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Lenient boolean: true/false, yes/no, on/off, 1/0. Blank means unset.
pub fn parse_bool(name: &'static str, value: &str) -> Result<Option<bool>, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "yes" | "on" | "1" => Ok(Some(true)),
        "false" | "no" | "off" | "0" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}
