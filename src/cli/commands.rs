use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use crate::cli::config::{parse_bool, Settings};
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(author, version, about = "Enable or disable every plugin step in a Dataverse solution", long_about = None)]
pub struct Args {
    /// Application (client) id used to authenticate
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret for the application
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Organization URL (e.g., https://contoso.crm.dynamics.com)
    #[arg(long, env = "DYNAMICS_URL")]
    pub dynamics_url: Option<String>,

    /// Token authority; discovered from the organization when omitted
    #[arg(long, env = "AUTHORITY")]
    pub authority: Option<String>,

    /// Unique name of the solution whose plugin steps are toggled
    #[arg(long, env = "SOLUTION_UNIQUE_NAME")]
    pub solution: Option<String>,

    /// true to enable the plugin steps, false to disable them (default false)
    #[arg(long, env = "ENABLE_PLUGIN_STEPS")]
    pub enable_plugin_steps: Option<String>,

    /// Config file (default: plugin-activator.toml in the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    #[arg(long, default_value = "info")]
    pub log_level: Level,
}

impl Args {
    /// Values given on the command line or through the environment.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let enable_plugin_steps = match &self.enable_plugin_steps {
            Some(value) => parse_bool("ENABLE_PLUGIN_STEPS", value)?,
            None => None,
        };

        Ok(Settings {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            dynamics_url: self.dynamics_url.clone(),
            authority: self.authority.clone(),
            solution_unique_name: self.solution.clone(),
            enable_plugin_steps,
        })
    }
}
