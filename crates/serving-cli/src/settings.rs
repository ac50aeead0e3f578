//! Client Settings
//!
//! Layered, lowest to highest precedence: built-in defaults, an optional
//! TOML file (`--config`), `SERVING_CLIENT_*` environment variables, then
//! explicit command-line flags.
//!
//! A model version of `0` from any layer leaves the version unpinned so the
//! server picks its latest.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File, Map};
use inference_invoker::{CallContext, ChannelConfig, ModelSelector, DEFAULT_INPUT_SLOT};
use serde::Deserialize;

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SERVING_CLIENT";

/// Resolved client settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Model server `host:port`
    pub serving_address: String,
    /// Servable name
    pub model_name: String,
    /// Signature to evaluate
    pub signature_name: String,
    /// Pinned version; `None` or `0` for the latest
    pub model_version: Option<i64>,
    /// Input slot the image is bound to
    pub input_slot: String,
    /// Outputs to request; empty for all
    #[serde(default)]
    pub output_filter: Vec<String>,
    /// Predict call deadline
    pub timeout_ms: Option<u64>,
    /// Connect deadline
    pub connect_timeout_ms: Option<u64>,
    /// Response rendering
    pub format: OutputFormat,
}

impl Settings {
    /// Resolve settings for this invocation
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        Self::load_layers(cli, None)
    }

    /// Resolve with `env` standing in for the process environment when given
    fn load_layers(cli: &Cli, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let defaults = ModelSelector::default();
        let mut builder = Config::builder()
            .set_default("serving_address", ChannelConfig::default().address)?
            .set_default("model_name", defaults.name)?
            .set_default("signature_name", defaults.signature)?
            .set_default("model_version", defaults.version)?
            .set_default("input_slot", DEFAULT_INPUT_SLOT)?
            .set_default("format", OutputFormat::Debug.as_str())?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("serving_address", cli.serving_address.clone())?
            .set_override_option("model_name", cli.model_name.clone())?
            .set_override_option("signature_name", cli.signature_name.clone())?
            .set_override_option("model_version", cli.model_version)?
            .set_override_option("input_slot", cli.input_slot.clone())?
            .set_override_option("timeout_ms", cli.timeout_ms)?
            .set_override_option("connect_timeout_ms", cli.connect_timeout_ms)?
            .set_override_option("format", cli.format.map(|f| f.as_str()))?;

        if !cli.output_filter.is_empty() {
            builder = builder.set_override("output_filter", cli.output_filter.clone())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Model selection from these settings
    pub fn selector(&self) -> ModelSelector {
        ModelSelector {
            name: self.model_name.clone(),
            signature: self.signature_name.clone(),
            version: self.model_version.filter(|&v| v != 0),
        }
    }

    /// Channel factory input
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            address: self.serving_address.clone(),
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Call controls, before a cancellation token is attached
    pub fn call_context(&self) -> CallContext {
        match self.timeout_ms {
            Some(ms) => CallContext::new().with_timeout(Duration::from_millis(ms)),
            None => CallContext::new(),
        }
    }
}
