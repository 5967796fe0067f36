use barter_types::models::{DELETED_MESSAGE_TEXT, Message};
use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::OptionalExt;
use crate::{Database, Result};

const MESSAGE_COLUMNS: &str =
    "message_id, sender_id, receiver_id, text, deleted, created_at, updated_at";

impl Database {
    pub fn insert_message(&self, msg: &Message) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (message_id, sender_id, receiver_id, text, deleted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    msg.message_id,
                    msg.sender_id,
                    msg.receiver_id,
                    msg.text,
                    msg.deleted,
                    msg.created_at,
                    msg.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM messages WHERE message_id = ?1", MESSAGE_COLUMNS);
            conn.query_row(&sql, [message_id], message_from_row)
                .optional()
        })
    }

    /// Every message between two users in either direction, oldest first.
    /// Soft-deleted messages stay in place as `[deleted]`.
    pub fn conversation(&self, user_a: &str, user_b: &str) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM messages
                 WHERE (sender_id = ?1 AND receiver_id = ?2) OR (sender_id = ?2 AND receiver_id = ?1)
                 ORDER BY created_at ASC, rowid ASC",
                MESSAGE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_a, user_b], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Blank out the text and mark the message deleted. Returns false when
    /// the message does not exist.
    pub fn soft_delete_message(&self, message_id: &str, at: DateTime<Utc>) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET text = ?1, deleted = 1, updated_at = ?2 WHERE message_id = ?3",
                rusqlite::params![DELETED_MESSAGE_TEXT, at, message_id],
            )?;
            Ok(changed > 0)
        })
    }
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        message_id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        text: row.get(3)?,
        deleted: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::db;

    fn msg(id: &str, from: &str, to: &str, text: &str) -> Message {
        let now = Utc::now();
        Message {
            message_id: id.into(),
            sender_id: from.into(),
            receiver_id: to.into(),
            text: text.into(),
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn conversation_covers_both_directions_in_order() {
        let db = db();
        db.insert_message(&msg("m1", "a", "b", "hi")).unwrap();
        db.insert_message(&msg("m2", "b", "a", "hello")).unwrap();
        db.insert_message(&msg("m3", "a", "c", "elsewhere")).unwrap();
        db.insert_message(&msg("m4", "a", "b", "swap?")).unwrap();

        let ids: Vec<String> = db
            .conversation("b", "a")
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(ids, vec!["m1", "m2", "m4"]);
    }

    #[test]
    fn soft_delete_keeps_the_row() {
        let db = db();
        db.insert_message(&msg("m1", "a", "b", "oops")).unwrap();

        assert!(db.soft_delete_message("m1", Utc::now()).unwrap());
        assert!(!db.soft_delete_message("m9", Utc::now()).unwrap());

        let m = db.get_message("m1").unwrap().unwrap();
        assert!(m.deleted);
        assert_eq!(m.text, DELETED_MESSAGE_TEXT);
        assert_eq!(db.conversation("a", "b").unwrap().len(), 1);
    }
}
