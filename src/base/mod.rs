//! Core components, types, and utilities for the grammar-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Instruction prompts and fixed reply strings.
//! - Common types, the error taxonomy, and result handling.

pub mod config;
pub mod error;
pub mod prompts;
pub mod types;
