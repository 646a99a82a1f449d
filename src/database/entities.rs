#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub language: String,
    pub is_owner: bool,
    pub logged_as: Option<String>,
}

impl User {
    /// `@username` when the account has one, the numeric id otherwise.
    pub fn author(&self) -> String {
        match &self.username {
            Some(username) => format!("@{}", username),
            None => self.user_id.to_string(),
        }
    }

    /// Name printed under reports.
    pub fn display_name(&self) -> String {
        self.logged_as
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.full_name.clone())
    }
}
