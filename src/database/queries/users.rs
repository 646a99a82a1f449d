use anyhow::Result;

use crate::database::entities::User;
use crate::types::{DbConn, Sender};

pub async fn upsert_user(db: &DbConn, sender: &Sender) -> Result<User> {
  log::debug!("upsert_user for user_id: {:?}", sender.id);

  let user: User = sqlx::query_as(
    "INSERT INTO users (user_id, username, full_name, language) \
      VALUES ($1, $2, $3, $4) \
      ON CONFLICT (user_id) DO UPDATE SET \
        username = excluded.username, \
        full_name = excluded.full_name, \
        language = excluded.language \
      RETURNING user_id, username, full_name, language, is_owner, logged_as",
  )
  .bind(sender.id.0 as i64)
  .bind(sender.username.clone())
  .bind(sender.full_name.clone())
  .bind(sender.language.clone().unwrap_or_else(|| "ru".to_owned()))
  .fetch_one(db)
  .await?;

  log::debug!("upsert_user result: {:?}", user);

  Ok(user)
}

/// Users bound to the location plus every owner, each once.
pub async fn recipients_for_location(db: &DbConn, location_id: i64) -> Result<Vec<i64>> {
  log::debug!("recipients_for_location for location_id: {:?}", location_id);

  let result: Vec<i64> = sqlx::query_scalar(
    "SELECT user_id FROM user_locations WHERE location_id = $1 \
      UNION \
      SELECT user_id FROM users WHERE is_owner \
      ORDER BY user_id",
  )
  .bind(location_id)
  .fetch_all(db)
  .await?;

  log::debug!("recipients_for_location result: {:?}", result);

  Ok(result)
}
