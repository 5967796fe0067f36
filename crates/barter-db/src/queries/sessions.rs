use barter_types::models::{Session, SessionUser};
use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::OptionalExt;
use crate::{Database, Result};

impl Database {
    pub fn create_session(&self, session: &Session) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, username, email, role, flash, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    session.token,
                    session.user.user_id,
                    session.user.username,
                    session.user.email,
                    session.user.role,
                    session.flash,
                    session.created_at,
                    session.expires_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Look up a session that has not expired as of `now`.
    pub fn get_active_session(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Session>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT token, user_id, username, email, role, flash, created_at, expires_at
                 FROM sessions WHERE token = ?1 AND expires_at > ?2",
                rusqlite::params![token, now],
                session_from_row,
            )
            .optional()
        })
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(())
        })
    }

    pub fn set_flash(&self, token: &str, flash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE sessions SET flash = ?1 WHERE token = ?2",
                [flash, token],
            )?;
            Ok(())
        })
    }

    /// Read and clear the one-shot notice.
    pub fn take_flash(&self, token: &str) -> Result<Option<String>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let flash: Option<Option<String>> = tx
                .query_row("SELECT flash FROM sessions WHERE token = ?1", [token], |r| {
                    r.get(0)
                })
                .optional()?;
            let flash = flash.flatten();
            if flash.is_some() {
                tx.execute("UPDATE sessions SET flash = NULL WHERE token = ?1", [token])?;
            }
            tx.commit()?;
            Ok(flash)
        })
    }

    /// Keep every live session of the user showing the current username.
    pub fn update_session_username(&self, user_id: &str, username: &str) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE sessions SET username = ?1 WHERE user_id = ?2",
                [username, user_id],
            )?)
        })
    }

    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                rusqlite::params![now],
            )?)
        })
    }
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        token: row.get(0)?,
        user: SessionUser {
            user_id: row.get(1)?,
            username: row.get(2)?,
            email: row.get(3)?,
            role: row.get(4)?,
        },
        flash: row.get(5)?,
        created_at: row.get(6)?,
        expires_at: row.get(7)?,
    })
}
