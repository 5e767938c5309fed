//! Tracing subscriber bootstrap for binaries embedding the pipeline.

use crate::config::LoggingConfig;
use crate::error::{RiskError, RiskResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `config.level`.
///
/// Fails if the level directive is malformed or a global subscriber is
/// already set.
pub fn init_tracing(config: &LoggingConfig) -> RiskResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| RiskError::Telemetry(format!("invalid level {:?}: {}", config.level, e)))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(config.json.then(|| fmt::layer().json()))
        .with((!config.json).then(fmt::layer))
        .try_init()
        .map_err(|e| RiskError::Telemetry(e.to_string()))
}
