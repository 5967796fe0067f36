use std::collections::HashMap;

use barter_types::models::{User, UserProfile};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};

use super::{OptionalExt, placeholders};
use crate::{Database, Result};

const USER_COLUMNS: &str =
    "user_id, username, email, password_hash, role, created_at, updated_at";

impl Database {
    pub fn create_user(&self, user: &User) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (user_id, username, email, password_hash, role, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    user.user_id,
                    user.username,
                    user.email,
                    user.password_hash,
                    user.role,
                    user.created_at,
                    user.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "user_id", user_id))
    }

    /// `email` must already be normalized (trimmed, lower-cased).
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE email = ?1 OR username = ?2 LIMIT 1",
                USER_COLUMNS
            );
            conn.query_row(&sql, [email, username], user_from_row)
                .optional()
        })
    }

    /// Set a new username and, optionally, a new password hash.
    /// Returns false when the user does not exist.
    pub fn update_user_profile(
        &self,
        user_id: &str,
        username: &str,
        password_hash: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = match password_hash {
                Some(hash) => conn.execute(
                    "UPDATE users SET username = ?1, password_hash = ?2, updated_at = ?3 WHERE user_id = ?4",
                    rusqlite::params![username, hash, at, user_id],
                )?,
                None => conn.execute(
                    "UPDATE users SET username = ?1, updated_at = ?2 WHERE user_id = ?3",
                    rusqlite::params![username, at, user_id],
                )?,
            };
            Ok(changed > 0)
        })
    }

    /// Batch-fetch public profiles, keyed by user id.
    pub fn get_profiles(&self, user_ids: &[String]) -> Result<HashMap<String, UserProfile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT user_id, username, email, role FROM users WHERE user_id IN ({})",
                placeholders(user_ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(user_ids), |row| {
                    Ok(UserProfile {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        role: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows.into_iter().map(|p| (p.user_id.clone(), p)).collect())
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    conn.query_row(&sql, [value], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::queries::test_support::{db, user};

    #[test]
    fn duplicate_email_reports_field() {
        let db = db();
        let mut u = user(&db, "u1", "Antheis");

        u.user_id = "u2".into();
        u.username = "Someone".into();
        let err = db.create_user(&u).unwrap_err();
        assert!(matches!(err, Error::Duplicate { ref field } if field == "email"), "{err:?}");
    }

    #[test]
    fn lookup_by_email_or_username() {
        let db = db();
        user(&db, "u1", "Joshua");

        let by_name = db.find_user_by_email_or_username("nobody@example.com", "Joshua").unwrap();
        assert_eq!(by_name.map(|u| u.user_id).as_deref(), Some("u1"));

        let by_email = db.get_user_by_email("joshua@example.com").unwrap();
        assert!(by_email.is_some());
        assert!(db.get_user_by_email("JOSHUA@example.com").unwrap().is_none());
    }

    #[test]
    fn update_profile_and_fetch_profiles() {
        let db = db();
        user(&db, "u1", "Rana");
        user(&db, "u2", "Sheibha");

        assert!(db.update_user_profile("u1", "RanaB", None, Utc::now()).unwrap());
        assert!(!db.update_user_profile("missing", "X", None, Utc::now()).unwrap());

        let profiles = db.get_profiles(&["u1".into(), "u2".into(), "u3".into()]).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles["u1"].username, "RanaB");

        let err = db.update_user_profile("u2", "RanaB", None, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Duplicate { ref field } if field == "username"));
    }
}
