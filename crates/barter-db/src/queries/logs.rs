use barter_types::models::{LogEntry, new_id};
use chrono::Utc;
use rusqlite::Row;

use crate::{Database, Result};

impl Database {
    /// Record an audit event. `user_id` is absent for anonymous actions.
    pub fn append_log(&self, action: &str, user_id: Option<&str>) -> Result<LogEntry> {
        let entry = LogEntry {
            log_id: new_id(),
            action: action.to_string(),
            user_id: user_id.map(str::to_string),
            timestamp: Utc::now(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO logs (log_id, action, user_id, timestamp) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![entry.log_id, entry.action, entry.user_id, entry.timestamp],
            )?;
            Ok(())
        })?;

        Ok(entry)
    }

    /// Newest first.
    pub fn recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT log_id, action, user_id, timestamp FROM logs
                 ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], log_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn logs_for_user(&self, user_id: &str) -> Result<Vec<LogEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT log_id, action, user_id, timestamp FROM logs
                 WHERE user_id = ?1 ORDER BY timestamp DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id], log_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        log_id: row.get(0)?,
        action: row.get(1)?,
        user_id: row.get(2)?,
        timestamp: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::queries::test_support::db;

    #[test]
    fn appends_and_lists_logs() {
        let db = db();
        db.append_log("USER_REGISTER", Some("u1")).unwrap();
        db.append_log("USER_LOGIN", Some("u1")).unwrap();
        db.append_log("USER_LOGIN", None).unwrap();

        let recent = db.recent_logs(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].user_id, None);

        let mine = db.logs_for_user("u1").unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[1].action, "USER_REGISTER");
    }
}
