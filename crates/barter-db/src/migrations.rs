use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        // Items, swap requests and messages reference users and items by id
        // without foreign keys: a deleted item leaves its requests in place.
        conn.execute_batch(
            "
            CREATE TABLE users (
                user_id         TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                role            TEXT NOT NULL DEFAULT 'user',
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_users_role ON users(role, created_at);

            CREATE TABLE items (
                item_id             TEXT PRIMARY KEY,
                title               TEXT NOT NULL,
                description         TEXT NOT NULL,
                owner_id            TEXT NOT NULL,
                category            TEXT,
                wanted_categories   TEXT NOT NULL DEFAULT '[]',
                image_data          BLOB,
                image_content_type  TEXT,
                image_url           TEXT,
                status              TEXT NOT NULL DEFAULT 'available'
                                    CHECK (status IN ('available', 'swapped')),
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX idx_items_owner ON items(owner_id, category);
            CREATE INDEX idx_items_status ON items(status, created_at);

            CREATE TABLE swap_requests (
                swap_request_id TEXT PRIMARY KEY,
                item_id         TEXT NOT NULL,
                offered_item_id TEXT NOT NULL,
                requester_id    TEXT NOT NULL,
                receiver_id     TEXT NOT NULL,
                message         TEXT NOT NULL,
                image_url       TEXT,
                status          TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'accepted', 'rejected', 'cancelled')),
                created_at      TEXT NOT NULL,
                accepted_at     TEXT,
                rejected_at     TEXT,
                cancelled_at    TEXT,
                UNIQUE (item_id, requester_id, offered_item_id)
            );

            CREATE INDEX idx_swaps_item ON swap_requests(item_id, status);
            CREATE INDEX idx_swaps_requester ON swap_requests(requester_id, status);
            CREATE INDEX idx_swaps_receiver ON swap_requests(receiver_id, status);

            CREATE TABLE messages (
                message_id  TEXT PRIMARY KEY,
                sender_id   TEXT NOT NULL,
                receiver_id TEXT NOT NULL,
                text        TEXT NOT NULL,
                deleted     INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_messages_pair ON messages(sender_id, receiver_id, created_at);

            CREATE TABLE logs (
                log_id      TEXT PRIMARY KEY,
                action      TEXT NOT NULL,
                user_id     TEXT,
                timestamp   TEXT NOT NULL
            );

            CREATE INDEX idx_logs_user ON logs(user_id, timestamp);
            CREATE INDEX idx_logs_action ON logs(action, timestamp);

            CREATE TABLE sessions (
                token       TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
                username    TEXT NOT NULL,
                email       TEXT NOT NULL,
                role        TEXT NOT NULL,
                flash       TEXT,
                created_at  TEXT NOT NULL,
                expires_at  TEXT NOT NULL
            );

            CREATE INDEX idx_sessions_user ON sessions(user_id);
            CREATE INDEX idx_sessions_expiry ON sessions(expires_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
