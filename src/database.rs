pub mod entities;
pub mod queries;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use teloxide::types::ChatId;

use crate::collaborators::Directory;
use crate::types::{DbType, Sender};
use entities::User;

/// Opens (creating when missing) and migrates the SQLite database.
pub async fn open(location: &str) -> Result<DbType> {
    log::debug!("Opening/creating and migrating database");

    std::fs::OpenOptions::new()
        .read(true)
        .create(true)
        .truncate(false)
        .write(true)
        .open(location)?;

    let db = SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}", location))
        .await?;
    sqlx::migrate!().run(&db).await?;

    log::debug!("Successfully opened database");
    Ok(Arc::new(db))
}

pub struct SqliteDirectory {
    db: DbType,
}

impl SqliteDirectory {
    pub fn new(db: DbType) -> Self {
        SqliteDirectory { db }
    }
}

#[async_trait]
impl Directory for SqliteDirectory {
    async fn upsert_user(&self, sender: &Sender) -> Result<User> {
        queries::upsert_user(&self.db, sender).await
    }

    async fn recipients_for_location(&self, location_id: i64) -> Result<Vec<ChatId>> {
        let ids = queries::recipients_for_location(&self.db, location_id).await?;
        Ok(ids.into_iter().map(ChatId).collect())
    }
}
