use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::operation::ElbOperation;

/// Step configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub nats_uri: String,
    pub operation: ElbOperation,
    pub provider: String,
    pub resource: String,
    pub action_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            nats_uri: lookup("NATS_URI").context("NATS_URI must be set")?,
            operation: lookup("ELB_OPERATION")
                .unwrap_or_else(|| "delete".to_string())
                .parse()
                .context("ELB_OPERATION must be 'create' or 'delete'")?,
            provider: lookup("ELB_PROVIDER").unwrap_or_else(|| "aws".to_string()),
            resource: lookup("ELB_RESOURCE").unwrap_or_else(|| "elb".to_string()),
            action_timeout: Duration::from_secs(
                lookup("ACTION_TIMEOUT_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse()
                    .context("ACTION_TIMEOUT_SECS must be a valid number")?,
            ),
            shutdown_grace: Duration::from_secs(
                lookup("SHUTDOWN_GRACE_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("SHUTDOWN_GRACE_SECS must be a valid number")?,
            ),
        })
    }
}
