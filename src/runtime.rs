//! Runtime services and shared state for the grammar-bot.

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{chat::ChatClient, llm::LlmClient, webhook},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the LLM client, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// (and used as axum state) without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the slack client
        let chat = ChatClient::slack(&config).await?;

        Ok(Self { config, llm, chat })
    }

    /// Serve the webhook routes until Ctrl-C.
    pub async fn start(&self) -> Void {
        let addr = format!("0.0.0.0:{}", self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!("Listening for Slack webhooks on {} ...", addr);

        axum::serve(listener, webhook::router(self.clone()))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down ...");
            })
            .await?;

        Ok(())
    }
}
