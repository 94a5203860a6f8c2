//! Guest account storage.

use crate::db::decode_error;
use chrono::{DateTime, Utc};
use concierge_booking::model::User;
use concierge_core::id::UserId;
use sqlx::PgPool;
use std::str::FromStr;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, sqlx::Error> {
        let id = UserId::from_str(&self.id).map_err(|e| decode_error("user id", &self.id, e))?;

        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

/// Queries against the `users` table.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a new guest account.
    ///
    /// Returns `None` when the email is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails for any other reason.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Result<UserRow, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(UserId::new().to_string())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match row {
            Ok(row) => row.try_into_user().map(Some),
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Looks up a guest by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::try_into_user).transpose()
    }

    /// Looks up a guest by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::try_into_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_maps_to_user() {
        let row = UserRow {
            id: "usr_01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            email: "guest@example.com".to_string(),
            password_hash: "abc123".to_string(),
            created_at: Utc::now(),
        };

        let user = row.try_into_user().unwrap();
        assert_eq!(user.email, "guest@example.com");
        assert_eq!(user.id.to_string(), "usr_01ARZ3NDEKTSV4RRFFQ69G5FAV");
    }

    #[test]
    fn bad_stored_id_fails_decode() {
        let row = UserRow {
            id: "not-a-ulid".to_string(),
            email: "guest@example.com".to_string(),
            password_hash: "abc123".to_string(),
            created_at: Utc::now(),
        };

        let err = row.try_into_user().unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }
}
