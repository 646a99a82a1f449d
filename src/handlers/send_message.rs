use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
        KeyboardRemove, Recipient, ReplyMarkup,
    },
};

use crate::messages::*;
use crate::prompts::{Callback, Keyboard, Prompt};
use crate::types::{BotType, Daytime};

type SendRequest = <BotType as Requester>::SendMessage;

pub trait BetterSendMessage {
    fn send_prompt<C>(&self, chat_id: C, prompt: &Prompt) -> SendRequest
    where
        C: Into<Recipient>;

    fn send_message_easy<C, T>(&self, chat_id: C, text: T) -> SendRequest
    where
        C: Into<Recipient>,
        T: Into<String>,
    {
        self.send_prompt(chat_id, &Prompt::new(text, Keyboard::Remove))
    }
}

impl BetterSendMessage for BotType {
    fn send_prompt<C>(&self, chat_id: C, prompt: &Prompt) -> SendRequest
    where
        C: Into<Recipient>,
    {
        let mut message = self.send_message(chat_id, prompt.text.clone());

        if let Some(markup) = reply_markup(&prompt.keyboard) {
            message = message.reply_markup(markup);
        }

        message
    }
}

pub fn reply_markup(keyboard: &Keyboard) -> Option<ReplyMarkup> {
    let reply = |rows: Vec<Vec<&str>>| {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
        ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
    };

    let markup = match keyboard {
        Keyboard::Keep => return None,
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
        Keyboard::UserMenu => ReplyMarkup::Keyboard(
            KeyboardMarkup::new(vec![vec![KeyboardButton::new(BTN_SEND_REPORT)]])
                .resize_keyboard()
                .one_time_keyboard(),
        ),
        Keyboard::Nav => reply(vec![vec![BTN_BACK, BTN_CANCEL]]),
        Keyboard::Excel => reply(vec![vec![BTN_NEXT], vec![BTN_BACK, BTN_CANCEL]]),
        Keyboard::Send => reply(vec![vec![BTN_SEND], vec![BTN_BACK, BTN_CANCEL]]),
        Keyboard::Daytime => ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback(
                BTN_MORNING,
                Callback::Daytime(Daytime::Morning).encode(),
            ),
            InlineKeyboardButton::callback(
                BTN_EVENING,
                Callback::Daytime(Daytime::Evening).encode(),
            ),
        ]])),
        Keyboard::Locations(locations) => {
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(locations.iter().map(
                |(id, label)| {
                    vec![InlineKeyboardButton::callback(
                        label.clone(),
                        Callback::Location(*id).encode(),
                    )]
                },
            )))
        }
    };

    Some(markup)
}
