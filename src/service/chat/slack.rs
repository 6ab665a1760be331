//! Slack Web API implementation of the chat client.
//!
//! Inbound traffic arrives over HTTP webhooks (see [`crate::service::webhook`]);
//! this module only covers the outbound calls.

use crate::{
    base::{config::Config, error::DeliveryError, types::Res},
    interaction::render::{ModalView, RenderedMessage},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::{errors::SlackClientError, prelude::*};
use tracing::{info, instrument};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Reaction used as the "working on it" signal.
const TYPING_REACTION: &str = "eyes";

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    bot_token: SlackApiToken,
    bot_user_id: String,
    client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID, unless it was configured.

        let configured = config.bot_user_id.as_deref().map(str::trim).filter(|id| !id.is_empty());

        let bot_user_id = match configured {
            Some(id) => id.to_string(),
            None => {
                let session = client.open_session(&bot_token);
                session.auth_test().await?.user_id.0
            }
        };

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self { bot_token, bot_user_id, client })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    #[instrument(skip(self, message))]
    async fn post_message(&self, channel_id: &str, message: &RenderedMessage) -> Result<(), DeliveryError> {
        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), to_content(message)?);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(to_delivery_error)?;

        Ok(())
    }

    #[instrument(skip(self, message))]
    async fn update_message(&self, channel_id: &str, ts: &str, message: &RenderedMessage) -> Result<(), DeliveryError> {
        let request = SlackApiChatUpdateRequest::new(SlackChannelId(channel_id.to_string()), to_content(message)?, SlackTs(ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_update(&request).await.map_err(to_delivery_error)?;

        Ok(())
    }

    #[instrument(skip(self, view))]
    async fn open_modal(&self, trigger_id: &str, view: &ModalView) -> Result<(), DeliveryError> {
        let view: SlackView = serde_json::from_value(view.0.clone()).map_err(|e| DeliveryError::Transport(format!("Invalid modal view: {e}")))?;

        let request = SlackApiViewsOpenRequest::new(SlackTriggerId(trigger_id.to_string()), view);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.views_open(&request).await.map_err(to_delivery_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn indicate_typing(&self, channel_id: &str, ts: &str) -> Result<(), DeliveryError> {
        let request = SlackApiReactionsAddRequest {
            channel: SlackChannelId(channel_id.to_string()),
            name: SlackReactionName(TYPING_REACTION.to_string()),
            timestamp: SlackTs(ts.to_string()),
        };

        let session = self.client.open_session(&self.bot_token);

        let _ = session.reactions_add(&request).await.map_err(to_delivery_error)?;

        Ok(())
    }
}

// Helpers.

/// Convert a rendered message into Slack's typed content.
fn to_content(message: &RenderedMessage) -> Result<SlackMessageContent, DeliveryError> {
    let blocks = message
        .blocks
        .iter()
        .map(|block| serde_json::from_value::<SlackBlock>(block.clone()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DeliveryError::Transport(format!("Invalid message blocks: {e}")))?;

    Ok(SlackMessageContent::new().with_text(message.text.clone()).with_blocks(blocks))
}

fn to_delivery_error(err: SlackClientError) -> DeliveryError {
    match err {
        SlackClientError::ApiError(ae) => DeliveryError::Api(ae.code),
        other => DeliveryError::Transport(other.to_string()),
    }
}

// Tests.
