//! Write payloads and query shapes for the store.
//! Read results use the `barter-types` models directly.

use barter_types::models::{Item, ItemImage, SwapRequest, SwapStatus};

pub struct NewItem {
    pub item_id: String,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    pub category: Option<String>,
    pub wanted_categories: Vec<String>,
    pub image: Option<ItemImage>,
    pub image_url: Option<String>,
}

pub struct ItemUpdate {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub wanted_categories: Vec<String>,
    /// Replacement image plus the cache-busting URL to store with it.
    /// `None` keeps the current image.
    pub image: Option<(ItemImage, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Case-insensitive substring over title and description.
    pub text: Option<String>,
    /// Exact (case-insensitive) item category.
    pub offer: Option<String>,
    /// Must appear in the item's wanted categories.
    pub want: Option<String>,
    pub include_swapped: bool,
    pub limit: u32,
}

/// An item with its owner's display name.
#[derive(Debug, Clone)]
pub struct ListedItem {
    pub item: Item,
    pub owner_name: String,
}

pub const UNKNOWN_USER: &str = "Unknown User";

#[derive(Debug)]
pub enum TransitionOutcome {
    Applied(SwapRequest),
    NotFound,
    /// Someone else moved the request out of `pending` first.
    NotPending(SwapStatus),
    /// Accept found the target or offered item already swapped or gone.
    /// Nothing was written.
    ItemUnavailable,
}
