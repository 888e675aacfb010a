// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User accounts and login session tokens.

use concierge_core::types::{NewUser, User};
use concierge_core::ConciergeError;
use rusqlite::{params, ErrorCode, Row};

use crate::database::{now_timestamp, Database};

/// Insert a user. Returns `None` when the username or email is already taken.
pub async fn insert_user(db: &Database, user: NewUser) -> Result<Option<i64>, ConciergeError> {
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT INTO users (username, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user.username, user.email, user.password_hash, created_at],
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(failure, _))
                    if failure.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up an active user by username along with the stored password hash.
pub async fn find_active_by_username(
    db: &Database,
    username: &str,
) -> Result<Option<(User, String)>, ConciergeError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, created_at, last_login, is_active, password_hash
                 FROM users WHERE username = ?1 AND is_active = 1",
            )?;
            let result = stmt.query_row(params![username], |row| {
                Ok((row_to_user(row)?, row.get::<_, String>(6)?))
            });
            match result {
                Ok(found) => Ok(Some(found)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stamp `last_login` with the current time.
pub async fn touch_last_login(db: &Database, user_id: i64) -> Result<(), ConciergeError> {
    let now = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            conn.execute(
                "UPDATE users SET last_login = ?1 WHERE id = ?2",
                params![now, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store a session token for `user_id`.
pub async fn insert_session_token(
    db: &Database,
    user_id: i64,
    token: &str,
    expires_at: &str,
) -> Result<(), ConciergeError> {
    let token = token.to_string();
    let expires_at = expires_at.to_string();
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            conn.execute(
                "INSERT INTO user_sessions (user_id, session_token, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, token, expires_at, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve a token to its active user, provided it expires after `now`.
pub async fn user_for_token(
    db: &Database,
    token: &str,
    now: &str,
) -> Result<Option<User>, ConciergeError> {
    let token = token.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username, u.email, u.created_at, u.last_login, u.is_active
                 FROM users u JOIN user_sessions s ON u.id = s.user_id
                 WHERE s.session_token = ?1 AND s.expires_at > ?2 AND u.is_active = 1",
            )?;
            let result = stmt.query_row(params![token, now], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        last_login: row.get(4)?,
        is_active: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    async fn open(dir: &tempfile::TempDir) -> Database {
        Database::open(dir.path().join("u.db").to_str().unwrap(), true)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;

        assert!(insert_user(&db, new_user("ada", "ada@example.com")).await.unwrap().is_some());
        assert!(insert_user(&db, new_user("ada", "other@example.com")).await.unwrap().is_none());
        assert!(insert_user(&db, new_user("bob", "ada@example.com")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_returns_hash_and_login_is_stamped() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;
        let id = insert_user(&db, new_user("ada", "ada@example.com"))
            .await
            .unwrap()
            .unwrap();

        let (user, hash) = find_active_by_username(&db, "ada").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_active);
        assert!(user.last_login.is_none());
        assert_eq!(hash, "$argon2id$stub");

        touch_last_login(&db, id).await.unwrap();
        let (user, _) = find_active_by_username(&db, "ada").await.unwrap().unwrap();
        assert!(user.last_login.is_some());

        assert!(find_active_by_username(&db, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_resolves_until_expiry() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;
        let id = insert_user(&db, new_user("ada", "ada@example.com"))
            .await
            .unwrap()
            .unwrap();

        insert_session_token(&db, id, "tok", "2026-05-01T23:59:59.999Z")
            .await
            .unwrap();

        let before = user_for_token(&db, "tok", "2026-05-01T10:00:00.000Z")
            .await
            .unwrap();
        assert_eq!(before.map(|u| u.username), Some("ada".to_string()));

        let after = user_for_token(&db, "tok", "2026-05-02T00:00:00.000Z")
            .await
            .unwrap();
        assert!(after.is_none());

        let unknown = user_for_token(&db, "nope", "2026-05-01T10:00:00.000Z")
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn inactive_users_are_invisible() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;
        let id = insert_user(&db, new_user("ada", "ada@example.com"))
            .await
            .unwrap()
            .unwrap();
        insert_session_token(&db, id, "tok", "2099-01-01T00:00:00.000Z")
            .await
            .unwrap();

        db.connection()
            .call(move |conn| -> Result<_, rusqlite::Error> {
                conn.execute("UPDATE users SET is_active = 0 WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
            .unwrap();

        assert!(find_active_by_username(&db, "ada").await.unwrap().is_none());
        assert!(user_for_token(&db, "tok", "2026-01-01T00:00:00.000Z")
            .await
            .unwrap()
            .is_none());
    }
}
