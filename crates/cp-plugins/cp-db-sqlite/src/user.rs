//! `UserRepo` implementation: identity-provider backed users plus newsletter
//! subscribers.

use async_trait::async_trait;
use chrono::Utc;
use cp_core::error::{AppError, Result};
use cp_core::models::{SubscribeOutcome, User};
use cp_core::traits::UserRepo;
use sqlx::Row;
use uuid::Uuid;

use crate::{map_db_err, uuid_to_blob, SqliteStore};

#[async_trait]
impl UserRepo for SqliteStore {
    /// Name fields start empty; the profile form fills them in later.
    async fn create_user(&self, id: &str, email: &str) -> Result<()> {
        sqlx::query("INSERT INTO users (id, email, first_name, last_name) VALUES (?, ?, '', '')")
            .bind(id)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(|row| User {
            id: row.get("id"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
        }))
    }

    async fn update_user(&self, id: &str, first_name: &str, last_name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET first_name = ?, last_name = ? WHERE id = ?")
            .bind(first_name)
            .bind(last_name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("user".into(), id.to_string()));
        }
        Ok(())
    }

    /// Double subscribes are reported back, not treated as failures.
    async fn create_subscriber(
        &self,
        email: &str,
        phone: Option<&str>,
    ) -> Result<SubscribeOutcome> {
        let existing = sqlx::query("SELECT 1 FROM subscribers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        sqlx::query("INSERT INTO subscribers (id, email, phone, created_at) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(Uuid::new_v4()))
            .bind(email)
            .bind(phone)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(SubscribeOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_store;

    #[tokio::test]
    async fn user_profile_round_trip() {
        let store = test_store().await;
        store.create_user("u1", "u1@example.com").await.unwrap();
        store.update_user("u1", "Ada", "Lovelace").await.unwrap();

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Lovelace");

        assert!(store.get_user("missing").await.unwrap().is_none());
        let err = store.update_user("missing", "a", "b").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn duplicate_user_id_is_a_validation_error() {
        let store = test_store().await;
        store.create_user("u1", "u1@example.com").await.unwrap();
        let err = store.create_user("u1", "again@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn subscribing_twice_reports_already_subscribed() {
        let store = test_store().await;
        assert_eq!(
            store.create_subscriber("s@example.com", None).await.unwrap(),
            SubscribeOutcome::Created
        );
        assert_eq!(
            store
                .create_subscriber("s@example.com", Some("555"))
                .await
                .unwrap(),
            SubscribeOutcome::AlreadySubscribed
        );
    }
}
