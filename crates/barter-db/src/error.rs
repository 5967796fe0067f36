use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A unique index rejected the write. `field` is the first column of the
    /// violated index, e.g. `email`.
    #[error("duplicate value for unique field `{field}`")]
    Duplicate { field: String },

    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ffi_err, msg) = &err {
            match ffi_err.code {
                ErrorCode::ConstraintViolation => {
                    if let Some(field) = msg.as_deref().and_then(unique_field) {
                        return Error::Duplicate { field };
                    }
                }
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen => {
                    return Error::Unavailable(err.to_string());
                }
                _ => {}
            }
        }
        Error::Sqlite(err)
    }
}

/// Pull the column out of `UNIQUE constraint failed: users.email` style
/// messages. Compound indexes report their first column.
fn unique_field(msg: &str) -> Option<String> {
    let columns = msg.strip_prefix("UNIQUE constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    let column = first.rsplit('.').next().unwrap_or(first);
    Some(column.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unique_field() {
        assert_eq!(
            unique_field("UNIQUE constraint failed: users.email").as_deref(),
            Some("email")
        );
        assert_eq!(
            unique_field("UNIQUE constraint failed: swap_requests.item_id, swap_requests.requester_id")
                .as_deref(),
            Some("item_id")
        );
        assert_eq!(unique_field("NOT NULL constraint failed: users.email"), None);
    }
}
