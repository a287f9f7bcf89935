//! Conversation Store: direct messages, read state, and summaries.

pub mod service;

pub use service::{ConversationService, PostMessage};
