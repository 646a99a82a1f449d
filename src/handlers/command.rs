use anyhow::Result;
use teloxide::{macros::BotCommands, requests::Requester, utils::command::BotCommands as _};

use crate::flow::Input;
use crate::types::BotType;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Начать работу с ботом")]
    Start,

    #[command(description = "Как заполнять отчет")]
    Help,
}

impl Command {
    pub fn input(&self) -> Input {
        match self {
            Command::Start => Input::Start,
            Command::Help => Input::Help,
        }
    }
}

pub async fn register_commands(bot: &BotType) -> Result<()> {
    log::debug!("Registering bot commands");
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_and_without_mention() {
        assert_eq!(Command::parse("/start", "report_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/help@report_bot", "report_bot").unwrap(), Command::Help);
        assert!(Command::parse("/stats", "report_bot").is_err());
    }
}
