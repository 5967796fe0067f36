mod items;
mod logs;
mod messages;
mod sessions;
mod swaps;
mod users;

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

use crate::Result;

/// `?, ?, ?` for an `IN (...)` clause with `n` values.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Read a text column and parse it, reporting bad values as a conversion
/// failure on that column.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use barter_types::models::{DEFAULT_ROLE, User};
    use chrono::Utc;

    use crate::Database;
    use crate::models::NewItem;

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn user(db: &Database, id: &str, name: &str) -> User {
        let now = Utc::now();
        let user = User {
            user_id: id.into(),
            username: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".into(),
            role: DEFAULT_ROLE.into(),
            created_at: now,
            updated_at: now,
        };
        db.create_user(&user).unwrap();
        user
    }

    pub fn new_item(id: &str, owner: &str, title: &str, description: &str) -> NewItem {
        NewItem {
            item_id: id.into(),
            title: title.into(),
            description: description.into(),
            owner_id: owner.into(),
            category: None,
            wanted_categories: vec![],
            image: None,
            image_url: None,
        }
    }
}
