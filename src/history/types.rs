use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::prompts::PromptKind;

/// One successful AI exchange: what was asked and what came back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: Uuid,
    pub prompt: PromptKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseRecord {
    pub fn new(prompt: PromptKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
