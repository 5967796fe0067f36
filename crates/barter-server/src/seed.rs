//! Demo data for a fresh store.

use chrono::{Duration, Utc};
use tracing::info;

use barter_api::password::hash_password;
use barter_db::Database;
use barter_db::models::{NewItem, TransitionOutcome};
use barter_types::categories::normalize_wanted;
use barter_types::models::{SwapRequest, SwapStatus, User, new_id};
use barter_types::swap::SwapAction;

pub const SAMPLE_ROLE: &str = "sample";
pub const SAMPLE_PASSWORD: &str = "Password123";

const USERS: [&str; 4] = ["Antheis", "Joshua", "Rana", "Sheibha"];

struct SampleItem {
    owner: usize,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    wanted: &'static [&'static str],
}

const ITEMS: [SampleItem; 8] = [
    SampleItem {
        owner: 0,
        title: "Makita Batteries",
        description: "4x Makita batteries. 18V. 2x 5.0Ah and 2x 2.0Ah in good condition.",
        category: "Tools",
        wanted: &["Electronics", "Tools"],
    },
    SampleItem {
        owner: 1,
        title: "Pocket Lint",
        description: "A small collection of pocket lint from various trousers and jackets.",
        category: "Other",
        wanted: &[],
    },
    SampleItem {
        owner: 2,
        title: "Candlesticks",
        description: "A pair of vintage brass candlesticks.",
        category: "Home Decor",
        wanted: &["Clothing", "Kitchen"],
    },
    SampleItem {
        owner: 3,
        title: "Kids balance bikes",
        description: "Durable kids balance bikes for outdoor play.",
        category: "Toys",
        wanted: &["Games", "Books"],
    },
    SampleItem {
        owner: 0,
        title: "Vintage Cookbook Collection",
        description: "Twelve cookbooks from the 1970s and 1980s in great condition.",
        category: "Books",
        wanted: &["Kitchen", "Garden"],
    },
    SampleItem {
        owner: 1,
        title: "Board Game Collection",
        description: "Monopoly, Scrabble and Risk, all complete with pieces.",
        category: "Games",
        wanted: &["Electronics", "Sports"],
    },
    SampleItem {
        owner: 2,
        title: "Yoga Mat and Blocks",
        description: "Yoga mat with matching blocks and strap. Barely used.",
        category: "Sports",
        wanted: &["Books"],
    },
    SampleItem {
        owner: 3,
        title: "Plant Cuttings",
        description: "Pothos, snake plant and spider plant cuttings ready for propagation.",
        category: "Garden",
        wanted: &["Home Decor"],
    },
];

/// Populate an empty store. Returns `false` without writing when any user
/// already exists.
pub fn seed_demo_data(db: &Database) -> anyhow::Result<bool> {
    if db.count_users()? > 0 {
        return Ok(false);
    }

    let now = Utc::now();
    let mut users = Vec::with_capacity(USERS.len());
    for name in USERS {
        let user = User {
            user_id: new_id(),
            username: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: hash_password(SAMPLE_PASSWORD)?,
            role: SAMPLE_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        };
        db.create_user(&user)?;
        users.push(user);
    }

    let mut items = Vec::with_capacity(ITEMS.len());
    for sample in &ITEMS {
        let item = db.insert_item(&NewItem {
            item_id: new_id(),
            title: sample.title.to_string(),
            description: sample.description.to_string(),
            owner_id: users[sample.owner].user_id.clone(),
            category: Some(sample.category.to_string()),
            wanted_categories: normalize_wanted(sample.wanted.iter().copied()),
            image: None,
            image_url: None,
        })?;
        items.push(item);
    }

    // Candlesticks offered for the batteries, still open.
    let pending = swap(&items[0].item_id, &items[2].item_id, &users[2], &users[0], now);
    db.insert_swap_request(&pending)?;

    // Pocket lint for the balance bikes, already done: both items end up swapped.
    let done = swap(&items[3].item_id, &items[1].item_id, &users[1], &users[3], now - Duration::days(2));
    db.insert_swap_request(&done)?;
    match db.transition_swap_request(&done.swap_request_id, SwapAction::Accept, now - Duration::days(1))? {
        TransitionOutcome::Applied(_) => {}
        other => anyhow::bail!("seeding the accepted swap failed: {:?}", other),
    }

    db.append_log("USER_REGISTER", Some(&users[0].user_id))?;
    db.append_log("ITEM_CREATE", Some(&users[0].user_id))?;
    db.append_log("SWAP_REQUEST_CREATE", Some(&users[2].user_id))?;

    info!(
        "Seeded {} sample users, {} items and 2 swap requests",
        users.len(),
        items.len()
    );
    Ok(true)
}

fn swap(
    item_id: &str,
    offered_item_id: &str,
    requester: &User,
    receiver: &User,
    at: chrono::DateTime<Utc>,
) -> SwapRequest {
    SwapRequest {
        swap_request_id: new_id(),
        item_id: item_id.to_string(),
        offered_item_id: offered_item_id.to_string(),
        requester_id: requester.user_id.clone(),
        receiver_id: receiver.user_id.clone(),
        message: "Would you be up for a swap?".to_string(),
        image_url: None,
        status: SwapStatus::Pending,
        created_at: at,
        accepted_at: None,
        rejected_at: None,
        cancelled_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barter_types::models::ItemStatus;

    #[test]
    fn seeds_once_into_an_empty_store() {
        let db = Database::open_in_memory().unwrap();
        assert!(seed_demo_data(&db).unwrap());
        assert_eq!(db.count_users().unwrap(), 4);
        assert_eq!(db.count_items().unwrap(), 8);
        assert_eq!(db.count_swap_requests().unwrap(), 2);
        assert_eq!(db.recent_logs(10).unwrap().len(), 3);

        let rana = db.get_user_by_email("rana@example.com").unwrap().unwrap();
        assert_eq!(rana.role, SAMPLE_ROLE);
        assert!(barter_api::password::verify_password(SAMPLE_PASSWORD, &rana.password_hash));

        let joshua = db.get_user_by_email("joshua@example.com").unwrap().unwrap();
        let lint = db
            .items_by_owner(&joshua.user_id)
            .unwrap()
            .into_iter()
            .find(|i| i.title == "Pocket Lint")
            .unwrap();
        assert_eq!(lint.status, ItemStatus::Swapped);

        assert!(!seed_demo_data(&db).unwrap());
        assert_eq!(db.count_users().unwrap(), 4);
    }
}
