//! Log subscriber setup

use crate::config::ProviderConfig;
use crate::error::{CloudError, Result};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered at the configured log level
///
/// `RUST_LOG` takes precedence when set. Calling this more than once is
/// harmless; only the first subscriber is kept.
pub fn init(config: &ProviderConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            CloudError::InvalidConfig(format!("invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("Log subscriber already installed");
    }

    Ok(())
}
