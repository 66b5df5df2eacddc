use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use super::{is_unique_violation, new_id, now};
use crate::entities::users;
use crate::models::user::NewUser;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a user. Returns `None` when the email or username is taken.
    pub async fn create(&self, user: &NewUser) -> Result<Option<users::Model>> {
        self.insert(new_id(), user).await
    }

    /// Inserts a user under a caller-chosen id, used for the placeholder user.
    pub async fn create_with_id(&self, id: &str, user: &NewUser) -> Result<Option<users::Model>> {
        if self.get_by_id(id).await?.is_some() {
            return Ok(None);
        }
        self.insert(id.to_string(), user).await
    }

    async fn insert(&self, id: String, user: &NewUser) -> Result<Option<users::Model>> {
        let email = user.email.trim();
        let username = user.username.trim();

        let taken = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(email))
                    .add(users::Column::Username.eq(username)),
            )
            .one(&self.conn)
            .await
            .context("Failed to check for existing user")?;
        if taken.is_some() {
            return Ok(None);
        }

        let timestamp = now();
        let model = users::ActiveModel {
            id: Set(id),
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            avatar: Set(user.avatar.clone()),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp),
        };

        match model.insert(&self.conn).await {
            Ok(created) => Ok(Some(created)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")
    }
}
