use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{Me, User};
use teloxide::utils::command::BotCommands as _;

use super::command::Command;
use crate::engine::Engine;
use crate::flow::Input;
use crate::prompts::Callback;
use crate::types::{BotType, Photo, Sender};

fn sender_of(user: &User) -> Sender {
    Sender {
        id: user.id,
        username: user.username.clone(),
        full_name: user.full_name(),
        language: user.language_code.clone(),
    }
}

/// Classifies a message as a command, a button press, text or a photo and
/// hands it to the engine.
pub async fn receive_message(engine: Arc<Engine>, me: Me, msg: Message) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let sender = sender_of(user);
    let chat = msg.chat.id;

    if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
        let photo = Photo {
            file_id: largest.file.id.clone(),
            message_id: msg.id,
        };
        let group = msg.media_group_id().map(str::to_owned);
        log::debug!("Photo {} from {} (album {:?})", msg.id, chat, group);

        engine.receive_photo(chat, sender, photo, group).await;
        return Ok(());
    }

    let input = match msg.text() {
        Some(text) if text.starts_with('/') => match Command::parse(text, me.username()) {
            Ok(command) => command.input(),
            Err(_) => Input::Text(text.to_owned()),
        },
        Some(text) => Input::from_text(text),
        // Stickers, documents and the like never fit a step
        None => Input::Text(String::new()),
    };

    engine.process(chat, &sender, input, Some(msg.id)).await;
    Ok(())
}

pub async fn receive_callback(engine: Arc<Engine>, bot: BotType, query: CallbackQuery) -> Result<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(chat) = query.message.as_ref().map(|m| m.chat().id) else {
        return Ok(());
    };
    let Some(callback) = query.data.as_deref().and_then(Callback::parse) else {
        log::warn!("Unknown callback data {:?}", query.data);
        return Ok(());
    };

    engine
        .process(chat, &sender_of(&query.from), Input::Callback(callback), None)
        .await;
    Ok(())
}
