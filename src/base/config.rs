//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::{Res, Void};

/// Default listen port.
fn default_port() -> u16 {
    3000
}

/// Default OpenAI model to use.
fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

/// Default sampling temperature for the correction model.
fn default_openai_temperature() -> f32 {
    0.2
}

/// Default grammar-correction directive.
fn default_correction_directive() -> String {
    prompts::CORRECTION_DIRECTIVE.to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration for the grammar-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The shared configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Configuration values, as loaded from the environment and config file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Listen port for the webhook server (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// OpenAI model to use (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Sampling temperature (`OPENAI_TEMPERATURE`).
    /// Value between 0 and 2. Lower values make corrections more conservative.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Optional OpenAI-compatible API base URL (`OPENAI_API_BASE`).
    #[serde(default)]
    pub openai_api_base: Option<String>,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// The bot's own Slack user ID (`BOT_USER_ID`), used as the mention token.
    /// Resolved through `auth.test` when unset.
    #[serde(default)]
    pub bot_user_id: Option<String>,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`). Requests are not verified when unset.
    #[serde(default)]
    pub slack_signing_secret: Option<String>,
    /// Render tone controls on corrected messages (`INTERACTIVE`).
    #[serde(default = "default_true")]
    pub interactive: bool,
    /// React to the triggering message while correcting (`TYPING_INDICATOR`).
    #[serde(default = "default_true")]
    pub typing_indicator: bool,
    /// Optional custom correction directive to override the default (`CORRECTION_DIRECTIVE`).
    #[serde(default = "default_correction_directive")]
    pub correction_directive: String,
}

impl ConfigInner {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Void {
        if self.openai_temperature < 0.0 || self.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if self.port == 0 {
            return Err(anyhow::anyhow!("Port must be non-zero."));
        }

        if self.openai_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("OPENAI_API_KEY must be set."));
        }

        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("SLACK_BOT_TOKEN must be set."));
        }

        if self.correction_directive.trim().is_empty() {
            return Err(anyhow::anyhow!("Correction directive must not be empty."));
        }

        Ok(())
    }
}

impl Config {
    /// Load `.env`, the environment, and an optional TOML file, then validate.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        // A missing `.env` is fine; real deployments set the environment directly.
        let _ = dotenvy::dotenv();

        let mut cfg = config::Config::builder().add_source(config::Environment::default());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }
}

// Tests.
