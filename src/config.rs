use std::env;
use std::time::Duration;

/// Environment variable holding the store address (`host:port`).
pub const ENDPOINT_ENV: &str = "SCALARIS_JSON_URL";

/// Address used when nothing else is configured.
pub const DEFAULT_ADDRESS: &str = "localhost:8000";

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Store address as `host:port`.
    pub address: String,
    /// Bound on connecting, sending and receiving. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ClientConfig {
    /// Reads the address from `SCALARIS_JSON_URL`, falling back to the default.
    pub fn from_env() -> Self {
        Self::from_endpoint(env::var(ENDPOINT_ENV).ok())
    }

    /// Builds a configuration from an optional endpoint value. Empty values
    /// are ignored.
    pub fn from_endpoint(endpoint: Option<String>) -> Self {
        match endpoint {
            Some(address) if !address.trim().is_empty() => {
                Self::default().with_address(address.trim())
            }
            _ => Self::default(),
        }
    }

    /// Overrides the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Overrides the timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
