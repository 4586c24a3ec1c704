//! memsave configuration management

use crate::error::{Error, Result};
use crate::payload::MemoryPayload;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Ports a local memory server may listen on, in trial order
pub const DEFAULT_PORTS: [u16; 2] = [8050, 8051];

/// Path prefixes the save route may be mounted under, in trial order
pub const DEFAULT_PREFIXES: [&str; 3] = ["api", "sse", "mem0"];

/// Default per-attempt timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Candidate `save_memory` URLs on localhost.
///
/// Each prefix is tried on every port before moving to the next prefix.
pub fn default_endpoints() -> Vec<String> {
    DEFAULT_PREFIXES
        .iter()
        .flat_map(|prefix| {
            DEFAULT_PORTS
                .iter()
                .map(move |port| format!("http://localhost:{}/{}/save_memory", port, prefix))
        })
        .collect()
}

/// Main memsave configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemsaveConfig {
    /// Endpoints to try, in order
    pub endpoints: Vec<String>,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Exit non-zero when no endpoint accepted the memory
    pub fail_on_exhaustion: bool,

    /// Payload to send instead of the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryPayload>,
}

impl Default for MemsaveConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fail_on_exhaustion: false,
            memory: None,
        }
    }
}

impl MemsaveConfig {
    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Payload to deliver: the configured one or the built-in default
    pub fn payload(&self) -> MemoryPayload {
        self.memory.clone().unwrap_or_default()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
