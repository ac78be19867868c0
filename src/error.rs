use thiserror::Error;

/// Problems with the values the activator is started with.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("A parameter with the name {0} must be provided as an environment variable or in the config file.")]
    Missing(&'static str),

    #[error("{name} is not a valid boolean: '{value}'")]
    InvalidBool { name: &'static str, value: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures talking to the Dataverse Web API.
#[derive(Debug, Error)]
pub enum DataverseError {
    #[error("invalid connection string: {0}")]
    ConnectionString(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} returned {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("session is closed")]
    SessionClosed,
}

/// Anything that ends an activation run early.
#[derive(Debug, Error)]
pub enum ActivatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataverse(#[from] DataverseError),
}
