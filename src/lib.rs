//! Library root for `grammar-bot`.
//!
//! Grammar-bot is an OpenAI-powered Slack assistant that corrects text:
//! - `/grammarbot <text>` replies with a corrected version
//! - @-mentions and channel messages get a corrected reply in the channel
//! - Interactive replies let users switch between a casual and a professional tone
//!
//! The bot integrates with Slack over HTTP webhooks and with OpenAI for the
//! corrections. The architecture is built around extensible traits that allow
//! for different implementations of each service.

#[deny(missing_docs)]
pub mod base;
#[deny(missing_docs)]
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the grammar-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with LLM and chat clients
/// - Serves the webhook routes until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting grammar-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the rustls crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
