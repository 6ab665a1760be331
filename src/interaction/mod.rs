//! Event handling and user interactions for grammar-bot.
//!
//! This module provides functionality for handling inbound Slack calls:
//! - Classifying slash commands, event callbacks, and block actions
//! - Dispatching each to its branch (correct, post, update, open modal)
//! - Rendering corrected text and recovering it from earlier messages

pub mod dispatch;
pub mod inbound;
pub mod render;
