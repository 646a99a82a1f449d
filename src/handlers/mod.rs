pub mod broadcast;
pub mod command;
pub mod send_message;
pub mod telegram;
pub mod update;
