use barter_types::models::{Item, SwapRequest, SwapStatus};
use barter_types::swap::SwapAction;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};

use super::items::insert_item_on;
use super::{OptionalExt, parse_column};
use crate::models::{NewItem, TransitionOutcome};
use crate::{Database, Result};

const SWAP_COLUMNS: &str = "swap_request_id, item_id, offered_item_id, requester_id, receiver_id, \
     message, image_url, status, created_at, accepted_at, rejected_at, cancelled_at";

impl Database {
    pub fn insert_swap_request(&self, swap: &SwapRequest) -> Result<()> {
        self.with_conn(|conn| insert_swap_on(conn, swap))
    }

    /// Create the offered item and the request referencing it together.
    /// Neither row exists if either insert fails.
    pub fn insert_swap_request_with_item(
        &self,
        item: &NewItem,
        swap: &SwapRequest,
    ) -> Result<Item> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let created = insert_item_on(&tx, item)?;
            insert_swap_on(&tx, swap)?;
            tx.commit()?;
            Ok(created)
        })
    }

    pub fn get_swap_request(&self, swap_request_id: &str) -> Result<Option<SwapRequest>> {
        self.with_conn(|conn| query_swap(conn, swap_request_id))
    }

    pub fn find_swap_request(
        &self,
        item_id: &str,
        requester_id: &str,
        offered_item_id: &str,
    ) -> Result<Option<SwapRequest>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM swap_requests
                 WHERE item_id = ?1 AND requester_id = ?2 AND offered_item_id = ?3",
                SWAP_COLUMNS
            );
            conn.query_row(&sql, [item_id, requester_id, offered_item_id], swap_from_row)
                .optional()
        })
    }

    /// Requests the user sent, newest first.
    pub fn swap_requests_by_requester(&self, requester_id: &str) -> Result<Vec<SwapRequest>> {
        self.list_swaps("requester_id", requester_id)
    }

    /// Requests addressed to the user, newest first.
    pub fn swap_requests_by_receiver(&self, receiver_id: &str) -> Result<Vec<SwapRequest>> {
        self.list_swaps("receiver_id", receiver_id)
    }

    pub fn count_swap_requests(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM swap_requests", [], |r| r.get(0))?)
        })
    }

    /// Move a pending request to the action's target state.
    ///
    /// The status guard and, for accept, the flip of both items to `swapped`
    /// happen in one transaction. If either item is no longer available the
    /// whole thing rolls back.
    pub fn transition_swap_request(
        &self,
        swap_request_id: &str,
        action: SwapAction,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let stamp_column = match action {
            SwapAction::Accept => "accepted_at",
            SwapAction::Reject => "rejected_at",
            SwapAction::Cancel => "cancelled_at",
        };

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(current) = query_swap(&tx, swap_request_id)? else {
                return Ok(TransitionOutcome::NotFound);
            };

            let sql = format!(
                "UPDATE swap_requests SET status = ?1, {} = ?2
                 WHERE swap_request_id = ?3 AND status = 'pending'",
                stamp_column
            );
            let changed = tx.execute(
                &sql,
                rusqlite::params![action.target().as_str(), at, swap_request_id],
            )?;
            if changed == 0 {
                return Ok(TransitionOutcome::NotPending(current.status));
            }

            if action == SwapAction::Accept {
                let flipped = tx.execute(
                    "UPDATE items SET status = 'swapped', updated_at = ?1
                     WHERE item_id IN (?2, ?3) AND status = 'available'",
                    rusqlite::params![at, current.item_id, current.offered_item_id],
                )?;
                if flipped != 2 {
                    // Dropping the transaction rolls it back.
                    return Ok(TransitionOutcome::ItemUnavailable);
                }
            }

            let updated = query_swap(&tx, swap_request_id)?;
            tx.commit()?;

            Ok(match updated {
                Some(swap) => TransitionOutcome::Applied(swap),
                None => TransitionOutcome::NotFound,
            })
        })
    }

    fn list_swaps(&self, column: &str, user_id: &str) -> Result<Vec<SwapRequest>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM swap_requests WHERE {} = ?1 ORDER BY created_at DESC, rowid DESC",
                SWAP_COLUMNS, column
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], swap_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn insert_swap_on(conn: &Connection, swap: &SwapRequest) -> Result<()> {
    conn.execute(
        "INSERT INTO swap_requests (swap_request_id, item_id, offered_item_id, requester_id,
                                    receiver_id, message, image_url, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            swap.swap_request_id,
            swap.item_id,
            swap.offered_item_id,
            swap.requester_id,
            swap.receiver_id,
            swap.message,
            swap.image_url,
            swap.status.as_str(),
            swap.created_at,
        ],
    )?;
    Ok(())
}

fn query_swap(conn: &Connection, swap_request_id: &str) -> Result<Option<SwapRequest>> {
    let sql = format!(
        "SELECT {} FROM swap_requests WHERE swap_request_id = ?1",
        SWAP_COLUMNS
    );
    conn.query_row(&sql, [swap_request_id], swap_from_row)
        .optional()
}

fn swap_from_row(row: &Row<'_>) -> rusqlite::Result<SwapRequest> {
    let status: SwapStatus = parse_column(row, 7)?;
    Ok(SwapRequest {
        swap_request_id: row.get(0)?,
        item_id: row.get(1)?,
        offered_item_id: row.get(2)?,
        requester_id: row.get(3)?,
        receiver_id: row.get(4)?,
        message: row.get(5)?,
        image_url: row.get(6)?,
        status,
        created_at: row.get(8)?,
        accepted_at: row.get(9)?,
        rejected_at: row.get(10)?,
        cancelled_at: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::queries::test_support::{db, new_item, user};
    use barter_types::models::ItemStatus;

    fn pending(id: &str, item: &str, offered: &str, requester: &str, receiver: &str) -> SwapRequest {
        SwapRequest {
            swap_request_id: id.into(),
            item_id: item.into(),
            offered_item_id: offered.into(),
            requester_id: requester.into(),
            receiver_id: receiver.into(),
            message: "Interested?".into(),
            image_url: None,
            status: SwapStatus::Pending,
            created_at: Utc::now(),
            accepted_at: None,
            rejected_at: None,
            cancelled_at: None,
        }
    }

    fn setup() -> Database {
        let db = db();
        user(&db, "alice", "Alice");
        user(&db, "bob", "Bob");
        db.insert_item(&new_item("bike", "alice", "Bike", "Blue")).unwrap();
        db.insert_item(&new_item("guitar", "bob", "Guitar", "Acoustic")).unwrap();
        db
    }

    #[test]
    fn accept_flips_both_items() {
        let db = setup();
        db.insert_swap_request(&pending("s1", "bike", "guitar", "bob", "alice"))
            .unwrap();

        let outcome = db
            .transition_swap_request("s1", SwapAction::Accept, Utc::now())
            .unwrap();
        let TransitionOutcome::Applied(swap) = outcome else {
            panic!("expected applied, got {outcome:?}");
        };
        assert_eq!(swap.status, SwapStatus::Accepted);
        assert!(swap.accepted_at.is_some());

        for id in ["bike", "guitar"] {
            assert_eq!(db.get_item(id).unwrap().unwrap().status, ItemStatus::Swapped);
        }
    }

    #[test]
    fn terminal_requests_do_not_move() {
        let db = setup();
        db.insert_swap_request(&pending("s1", "bike", "guitar", "bob", "alice"))
            .unwrap();

        db.transition_swap_request("s1", SwapAction::Reject, Utc::now())
            .unwrap();
        let again = db
            .transition_swap_request("s1", SwapAction::Accept, Utc::now())
            .unwrap();
        assert!(matches!(again, TransitionOutcome::NotPending(SwapStatus::Rejected)));

        assert_eq!(db.get_item("bike").unwrap().unwrap().status, ItemStatus::Available);
        assert!(matches!(
            db.transition_swap_request("nope", SwapAction::Cancel, Utc::now())
                .unwrap(),
            TransitionOutcome::NotFound
        ));
    }

    #[test]
    fn accept_rolls_back_when_item_already_swapped() {
        let db = setup();
        db.insert_item(&new_item("drum", "bob", "Drum", "Snare")).unwrap();
        db.insert_swap_request(&pending("s1", "bike", "guitar", "bob", "alice"))
            .unwrap();
        db.insert_swap_request(&pending("s2", "bike", "drum", "bob", "alice"))
            .unwrap();

        db.transition_swap_request("s1", SwapAction::Accept, Utc::now())
            .unwrap();
        let second = db
            .transition_swap_request("s2", SwapAction::Accept, Utc::now())
            .unwrap();
        assert!(matches!(second, TransitionOutcome::ItemUnavailable));

        let s2 = db.get_swap_request("s2").unwrap().unwrap();
        assert_eq!(s2.status, SwapStatus::Pending);
        assert_eq!(db.get_item("drum").unwrap().unwrap().status, ItemStatus::Available);
    }

    #[test]
    fn duplicate_triple_is_rejected() {
        let db = setup();
        db.insert_swap_request(&pending("s1", "bike", "guitar", "bob", "alice"))
            .unwrap();
        let err = db
            .insert_swap_request(&pending("s2", "bike", "guitar", "bob", "alice"))
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
        assert!(db.find_swap_request("bike", "bob", "guitar").unwrap().is_some());
    }

    #[test]
    fn inline_item_and_request_are_written_together() {
        let db = setup();
        db.insert_swap_request(&pending("s1", "bike", "guitar", "bob", "alice"))
            .unwrap();

        // Reusing s1's id fails the request insert after the item went in.
        let item = new_item("banjo", "bob", "Banjo", "Five string");
        let err = db
            .insert_swap_request_with_item(&item, &pending("s1", "bike", "banjo", "bob", "alice"))
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
        assert!(db.get_item("banjo").unwrap().is_none());

        let item = new_item("ukulele", "bob", "Ukulele", "Soprano");
        let created = db
            .insert_swap_request_with_item(&item, &pending("s3", "bike", "ukulele", "bob", "alice"))
            .unwrap();
        assert_eq!(created.owner_id, "bob");
        assert_eq!(db.swap_requests_by_requester("bob").unwrap().len(), 2);
        assert_eq!(db.swap_requests_by_receiver("alice").unwrap().len(), 2);
        assert_eq!(db.count_swap_requests().unwrap(), 2);
    }
}
