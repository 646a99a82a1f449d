use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;

use super::send_message::BetterSendMessage as _;
use crate::collaborators::Messenger;
use crate::prompts::Prompt;
use crate::types::BotType;

pub struct TelegramMessenger {
    bot: BotType,
}

impl TelegramMessenger {
    pub fn new(bot: BotType) -> Self {
        TelegramMessenger { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat: ChatId, prompt: &Prompt) -> Result<MessageId> {
        let message = self.bot.send_prompt(chat, prompt).await?;
        Ok(message.id)
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<()> {
        self.bot.delete_message(chat, message).await?;
        Ok(())
    }
}
