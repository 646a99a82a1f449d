use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use teloxide::{
    adaptors::DefaultParseMode,
    types::{MessageId, UserId},
    Bot,
};

pub type BotType = DefaultParseMode<Bot>;
pub type DbConn = Pool<Sqlite>;
pub type DbType = Arc<DbConn>;

/// A photo the user uploaded while filling in a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Photo {
    pub file_id: String,
    pub message_id: MessageId,
}

/// The Telegram account behind an inbound update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub full_name: String,
    pub language: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Daytime {
    Morning,
    Evening,
}

impl Daytime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Daytime::Morning => "morning",
            Daytime::Evening => "evening",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "morning" => Some(Daytime::Morning),
            "evening" => Some(Daytime::Evening),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub has_solarium: bool,
}
