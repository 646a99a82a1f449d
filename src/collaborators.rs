//! Seams between the conversation core and the outside world.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};

use crate::database::entities::User;
use crate::prompts::Prompt;
use crate::report::Report;
use crate::types::Sender;

/// Sends and removes the bot's own messages in a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat: ChatId, prompt: &Prompt) -> Result<MessageId>;

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<()>;
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn upsert_user(&self, sender: &Sender) -> Result<User>;

    /// Chats that receive reports for a location: its bound users and owners.
    async fn recipients_for_location(&self, location_id: i64) -> Result<Vec<ChatId>>;
}

/// Hands a finished report to everyone who should get it. Retry and rate
/// limiting live behind this trait.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Returns how many recipients got the report.
    async fn broadcast(&self, recipients: &[ChatId], report: &Report) -> Result<usize>;
}
