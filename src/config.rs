use crate::schema::SchemaVariant;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AGENT_NAME: &str = "witsml-melt";

/// TLS certificate verification for the store connection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verify {
    #[default]
    Enabled,
    Disabled,
    /// Trust the PEM certificates in this file in addition to the system roots
    CaBundle(PathBuf),
}

/// Connection settings for a WITSML store
#[derive(Clone)]
pub struct ClientConfig {
    pub service_url: String,
    pub username: String,
    pub password: String,
    /// Sent as the HTTP `User-Agent`
    pub agent_name: String,
    pub verify: Verify,
    pub timeout: Option<Duration>,
    /// Binding used to type replies and wrap requests
    pub variant: SchemaVariant,
}

impl ClientConfig {
    pub fn new(
        service_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        ClientConfig {
            service_url: service_url.into(),
            username: username.into(),
            password: password.into(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            verify: Verify::Enabled,
            timeout: None,
            variant: SchemaVariant::V1411Read,
        }
    }

    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = agent_name.into();
        self
    }

    pub fn with_verify(mut self, verify: Verify) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_variant(mut self, variant: SchemaVariant) -> Self {
        self.variant = variant;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("service_url", &self.service_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("agent_name", &self.agent_name)
            .field("verify", &self.verify)
            .field("timeout", &self.timeout)
            .field("variant", &self.variant)
            .finish()
    }
}
