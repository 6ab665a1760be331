pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::error::TransformError;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// The relay only ever needs one operation: turn an instruction and a body of
/// text into rewritten text. Implementing this trait allows different
/// completion providers to be used with the grammar-bot.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Rewrite `body` according to `instruction`.
    ///
    /// Makes exactly one upstream call; there are no retries.
    async fn transform(&self, instruction: &str, body: &str) -> Result<String, TransformError>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
