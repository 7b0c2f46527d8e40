//! Chat service for knowledge-base conversations.
//!
//! This module provides:
//! - [`ChatService`] - Main entry point for chat functionality
//! - [`ChatEngine`] - Condense-plus-context engine shared by all sessions
//! - [`ChatStream`] - Streaming chat response
//! - [`ChatEvent`] - Events emitted during chat
//! - [`ChatResponse`] - Complete response after stream ends

mod engine;
mod event;
mod prompt;
mod response;
mod service;
mod stream;

pub use engine::{ChatEngine, TurnStream};
pub use event::ChatEvent;
pub use prompt::{DEFAULT_SYSTEM_PROMPT, PromptBuilder, condense_prompt};
pub use response::ChatResponse;
pub use service::ChatService;
pub use stream::ChatStream;

/// Tracing target for chat operations.
pub const TRACING_TARGET: &str = "kbchat_rig::chat";
