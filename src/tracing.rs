use serde::{Deserialize, Serialize};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "bool_true")]
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json: true,
        }
    }
}

fn default_service_name() -> String {
    "chainwallet-dev".to_string()
}

fn bool_true() -> bool {
    true
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracer(config: TracingConfig) -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let registry = tracing_subscriber::registry().with(filter_layer);
    if config.json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    tracing::info!(service_name = %config.service_name, "tracing initialised");
    Ok(())
}
