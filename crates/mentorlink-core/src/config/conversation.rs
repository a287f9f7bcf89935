//! Conversation store limits.

use serde::{Deserialize, Serialize};

/// Limits applied when posting messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum message length in characters.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_content_length: default_max_content_length(),
        }
    }
}

fn default_max_content_length() -> usize {
    4000
}
