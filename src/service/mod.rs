//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the grammar-bot:
//! - Chat services (e.g., Slack) for outbound messages
//! - LLM services (e.g., OpenAI) for text correction
//! - The inbound webhook surface
//!
//! Each client module defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod llm;
pub mod webhook;
