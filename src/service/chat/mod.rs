pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{
    base::error::DeliveryError,
    interaction::render::{ModalView, RenderedMessage},
};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the outbound half of the chat platform: every method
/// is a single API call. Implementing this trait allows different chat
/// services to be used with the grammar-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Used to build the mention token stripped from app-mention text.
    fn bot_user_id(&self) -> &str;

    /// Post a new message into a channel.
    async fn post_message(&self, channel_id: &str, message: &RenderedMessage) -> Result<(), DeliveryError>;

    /// Replace an existing message, identified by channel and timestamp.
    async fn update_message(&self, channel_id: &str, ts: &str, message: &RenderedMessage) -> Result<(), DeliveryError>;

    /// Open a modal for the user who triggered an interaction.
    async fn open_modal(&self, trigger_id: &str, view: &ModalView) -> Result<(), DeliveryError>;

    /// Signal that a reply is being worked on.
    ///
    /// This is a UX hint only; callers ignore its failure.
    async fn indicate_typing(&self, channel_id: &str, ts: &str) -> Result<(), DeliveryError>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
