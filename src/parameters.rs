use std::fmt;

/// Client-secret credentials for one Dataverse organization.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    client_id: String,
    client_secret: String,
    dynamics_url: String,
    authority: Option<String>,
}

impl ConnectionParameters {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, dynamics_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            dynamics_url: dynamics_url.into(),
            authority: None,
        }
    }

    /// Pins the token authority instead of discovering it from the organization.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn dynamics_url(&self) -> &str {
        &self.dynamics_url
    }

    /// The connection string to Dynamics 365 using client secret authentication.
    pub fn client_secret_connection_string(&self) -> String {
        let mut s = format!(
            "AuthType=ClientSecret;ClientId={};ClientSecret={};url={}",
            self.client_id, self.client_secret, self.dynamics_url
        );
        if let Some(authority) = &self.authority {
            s.push_str(";Authority=");
            s.push_str(authority);
        }
        s
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("dynamics_url", &self.dynamics_url)
            .field("authority", &self.authority)
            .finish()
    }
}

/// The solution whose plugin steps are toggled, and which way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionTarget {
    pub unique_name: String,
    pub enable_plugin_steps: bool,
}

impl SolutionTarget {
    pub fn new(unique_name: impl Into<String>, enable_plugin_steps: bool) -> Self {
        Self {
            unique_name: unique_name.into(),
            enable_plugin_steps,
        }
    }

    pub fn desired_state(&self) -> StepState {
        StepState::from_enable(self.enable_plugin_steps)
    }
}

/// Target state of an `sdkmessageprocessingstep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Enabled,
    Disabled,
}

impl StepState {
    pub fn from_enable(enable: bool) -> Self {
        if enable {
            StepState::Enabled
        } else {
            StepState::Disabled
        }
    }

    /// `statecode`: 0 = Enabled, 1 = Disabled.
    pub fn state_code(self) -> i32 {
        match self {
            StepState::Enabled => 0,
            StepState::Disabled => 1,
        }
    }

    /// `statuscode`: 1 = Enabled, 2 = Disabled.
    pub fn status_code(self) -> i32 {
        match self {
            StepState::Enabled => 1,
            StepState::Disabled => 2,
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepState::Enabled => f.write_str("enabled"),
            StepState::Disabled => f.write_str("disabled"),
        }
    }
}
