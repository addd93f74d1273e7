// Bookhub - Book Shelf & Reading Statistics
// Copyright (C) 2025 Bookhub contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! User store
//!
//! Accounts are keyed by the identifier issued by the external auth
//! provider (`external_id`). Books reference that identifier as their
//! owner, so deleting a user removes their shelf and charts through the
//! schema's cascades.
//!
//! Uniqueness of `external_id` and `email` is checked by a `NOT EXISTS`
//! guard on the insert or update itself, which turns a would-be constraint
//! error into `AlreadyExists`. Keeping the check inside the writing
//! statement means every transaction here starts with a write.

use std::sync::Arc;
use tracing::info;

use crate::clock::Clock;
use crate::error::{BookhubError, Result, StoreContext};
use crate::password::hash_password;
use crate::storage::handle::StoreHandle;
use crate::storage::models::{NewUser, User};

#[derive(Clone)]
pub struct UserStore {
    handle: Arc<dyn StoreHandle>,
    clock: Arc<dyn Clock>,
}

impl UserStore {
    pub fn new(handle: Arc<dyn StoreHandle>, clock: Arc<dyn Clock>) -> Self {
        Self { handle, clock }
    }

    /// Register a user
    ///
    /// A password, when given, is stored as an Argon2 hash.
    pub async fn create(&self, user: NewUser) -> Result<User> {
        check_fields(&user.external_id, &user.name, &user.email)?;

        let password_hash = match user.password.clone() {
            Some(raw) => Some(
                tokio::task::spawn_blocking(move || hash_password(&raw))
                    .await
                    .map_err(|e| BookhubError::PasswordHashFailed(e.to_string()))??,
            ),
            None => None,
        };

        let now = self.clock.now();
        let mut tx = self.handle.begin().await?;

        // The precedent check runs inside the insert, so the write lock is
        // taken by the first statement
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (external_id, name, email, password_hash, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM users WHERE external_id = ? OR email = ?)
            RETURNING *
            "#,
        )
        .bind(&user.external_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(now)
        .bind(now)
        .bind(&user.external_id)
        .bind(&user.email)
        .fetch_optional(&mut *tx)
        .await
        .step("insert user")?
        .ok_or_else(|| BookhubError::already_exists(format!("user {}", user.external_id)))?;

        tx.commit().await.step("commit")?;

        info!(user_id = created.id, "registered user");
        Ok(created)
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(self.handle.reader())
            .await
            .step("select user")?
            .ok_or_else(|| BookhubError::not_found(format!("user {}", external_id)))
    }

    /// Rewrite name, e-mail and external id of an existing user
    ///
    /// Changing `external_id` carries over to the user's books. The stored
    /// password hash is kept as is.
    pub async fn update(&self, user: User) -> Result<User> {
        check_fields(&user.external_id, &user.name, &user.email)?;

        let now = self.clock.now();
        let mut tx = self.handle.begin().await?;

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET external_id = ?, name = ?, email = ?, updated_at = ?
            WHERE id = ?
              AND NOT EXISTS (
                  SELECT 1 FROM users
                  WHERE (external_id = ? OR email = ?) AND id <> ?
              )
            RETURNING *
            "#,
        )
        .bind(&user.external_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(now)
        .bind(user.id)
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await
        .step("update user")?;

        let updated = match updated {
            Some(updated) => updated,
            None => {
                let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
                    .bind(user.id)
                    .fetch_optional(&mut *tx)
                    .await
                    .step("select user")?;
                return Err(match exists {
                    Some(_) => BookhubError::already_exists(format!("user {}", user.external_id)),
                    None => BookhubError::not_found(format!("user {}", user.id)),
                });
            }
        };

        tx.commit().await.step("commit")?;

        info!(user_id = updated.id, "updated user");
        Ok(updated)
    }

    /// Delete a user together with their books and charts
    pub async fn delete(&self, user: &User) -> Result<()> {
        let mut tx = self.handle.begin().await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user.id)
            .execute(&mut *tx)
            .await
            .step("delete user")?
            .rows_affected();

        if deleted == 0 {
            return Err(BookhubError::not_found(format!("user {}", user.external_id)));
        }

        tx.commit().await.step("commit")?;

        info!(user_id = user.id, "deleted user");
        Ok(())
    }
}

fn check_fields(external_id: &str, name: &str, email: &str) -> Result<()> {
    if external_id.trim().is_empty() {
        return Err(BookhubError::invalid_input("external id must not be empty"));
    }
    if name.trim().is_empty() {
        return Err(BookhubError::invalid_input("name must not be empty"));
    }
    if !email.contains('@') {
        return Err(BookhubError::invalid_input("email must contain '@'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::database::Database;

    fn store(db: &Database) -> UserStore {
        UserStore::new(Arc::new(db.clone()), Arc::new(FixedClock::default()))
    }

    fn alice() -> NewUser {
        NewUser::new(
            "auth0|alice".to_string(),
            "Alice".to_string(),
            "alice@example.com".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = Database::new_in_memory().await.unwrap();
        let users = store(&db);

        let created = users.create(alice()).await.expect("Failed to create user");
        assert_eq!(created.name, "Alice");
        assert!(created.password_hash.is_none());

        let found = users.find_by_external_id("auth0|alice").await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let db = Database::new_in_memory().await.unwrap();
        let users = store(&db);

        let created = users
            .create(alice().with_password("correct horse"))
            .await
            .unwrap();

        let hash = created.password_hash.clone().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(created.verify_password("correct horse"));
        assert!(!created.verify_password("battery staple"));
    }

    #[tokio::test]
    async fn test_duplicate_external_id_or_email() {
        let db = Database::new_in_memory().await.unwrap();
        let users = store(&db);
        users.create(alice()).await.unwrap();

        let err = users.create(alice()).await.unwrap_err();
        assert!(err.is_already_exists());

        let same_email = NewUser::new(
            "auth0|other".to_string(),
            "Other".to_string(),
            "alice@example.com".to_string(),
        );
        assert!(users.create(same_email).await.unwrap_err().is_already_exists());
    }

    #[tokio::test]
    async fn test_rejects_blank_fields() {
        let db = Database::new_in_memory().await.unwrap();
        let users = store(&db);

        let blank = NewUser::new(" ".to_string(), "A".to_string(), "a@example.com".to_string());
        assert!(users.create(blank).await.unwrap_err().is_validation_error());

        let bad_mail = NewUser::new("id".to_string(), "A".to_string(), "nope".to_string());
        assert!(users.create(bad_mail).await.unwrap_err().is_validation_error());
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let db = Database::new_in_memory().await.unwrap();
        let err = store(&db).find_by_external_id("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_keeps_hash_and_checks_precedent() {
        let db = Database::new_in_memory().await.unwrap();
        let users = store(&db);
        let alice = users.create(alice().with_password("pw")).await.unwrap();
        let bob = users
            .create(NewUser::new(
                "auth0|bob".to_string(),
                "Bob".to_string(),
                "bob@example.com".to_string(),
            ))
            .await
            .unwrap();

        let mut renamed = alice.clone();
        renamed.name = "Alice Liddell".to_string();
        renamed.password_hash = None;
        let updated = users.update(renamed).await.expect("Failed to update user");
        assert_eq!(updated.name, "Alice Liddell");
        assert_eq!(updated.password_hash, alice.password_hash);

        let mut clash = bob.clone();
        clash.email = "alice@example.com".to_string();
        assert!(users.update(clash).await.unwrap_err().is_already_exists());

        let mut ghost = bob;
        ghost.id = 999;
        ghost.external_id = "auth0|ghost".to_string();
        ghost.email = "ghost@example.com".to_string();
        assert!(users.update(ghost).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let db = Database::new_in_memory().await.unwrap();
        let users = store(&db);
        let user = users.create(alice()).await.unwrap();

        users.delete(&user).await.expect("Failed to delete user");
        assert!(users.delete(&user).await.unwrap_err().is_not_found());
        assert!(users
            .find_by_external_id("auth0|alice")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
