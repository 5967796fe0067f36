use std::collections::HashMap;

use barter_types::models::{Item, ItemImage, ItemStatus};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use super::{OptionalExt, parse_column, placeholders};
use crate::models::{ItemUpdate, ListedItem, NewItem, SearchFilter, UNKNOWN_USER};
use crate::{Database, Result};

/// Item columns in `item_from_row` order. Queries alias `items` as `i`.
const ITEM_COLUMNS: &str = "i.item_id, i.title, i.description, i.owner_id, i.category, \
     i.wanted_categories, i.image_url, \
     (i.image_data IS NOT NULL AND length(i.image_data) > 0), \
     i.status, i.created_at, i.updated_at";

impl Database {
    pub fn insert_item(&self, item: &NewItem) -> Result<Item> {
        self.with_conn(|conn| insert_item_on(conn, item))
    }

    pub fn get_item(&self, item_id: &str) -> Result<Option<Item>> {
        self.with_conn(|conn| query_item(conn, item_id))
    }

    pub fn get_item_image(&self, item_id: &str) -> Result<Option<ItemImage>> {
        self.with_conn(|conn| {
            let row: Option<(Option<Vec<u8>>, Option<String>)> = conn
                .query_row(
                    "SELECT image_data, image_content_type FROM items WHERE item_id = ?1",
                    [item_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            Ok(match row {
                Some((Some(data), content_type)) if !data.is_empty() => Some(ItemImage {
                    data,
                    content_type: content_type.unwrap_or_default(),
                }),
                _ => None,
            })
        })
    }

    /// Returns false when the item does not exist.
    pub fn update_item(&self, item_id: &str, update: &ItemUpdate) -> Result<bool> {
        let wanted = serde_json::to_string(&update.wanted_categories)?;
        let now = Utc::now();

        self.with_conn(|conn| {
            let changed = match &update.image {
                Some((image, url)) => conn.execute(
                    "UPDATE items SET title = ?1, description = ?2, category = ?3, wanted_categories = ?4,
                         image_data = ?5, image_content_type = ?6, image_url = ?7, updated_at = ?8
                     WHERE item_id = ?9",
                    rusqlite::params![
                        update.title,
                        update.description,
                        update.category,
                        wanted,
                        image.data,
                        image.content_type,
                        url,
                        now,
                        item_id,
                    ],
                )?,
                None => conn.execute(
                    "UPDATE items SET title = ?1, description = ?2, category = ?3, wanted_categories = ?4,
                         updated_at = ?5
                     WHERE item_id = ?6",
                    rusqlite::params![
                        update.title,
                        update.description,
                        update.category,
                        wanted,
                        now,
                        item_id,
                    ],
                )?,
            };
            Ok(changed > 0)
        })
    }

    pub fn delete_item(&self, item_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM items WHERE item_id = ?1", [item_id])? > 0)
        })
    }

    /// Items owned by `owner_id`, newest first.
    pub fn items_by_owner(&self, owner_id: &str) -> Result<Vec<Item>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM items i WHERE i.owner_id = ?1 ORDER BY i.created_at DESC, i.rowid DESC",
                ITEM_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id], item_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch items keyed by id. Missing ids are simply absent.
    pub fn items_by_ids(&self, item_ids: &[String]) -> Result<HashMap<String, Item>> {
        if item_ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM items i WHERE i.item_id IN ({})",
                ITEM_COLUMNS,
                placeholders(item_ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(item_ids), item_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(|i| (i.item_id.clone(), i)).collect())
        })
    }

    /// Browse/search listings, newest first, each with its owner's name.
    pub fn search_items(&self, filter: &SearchFilter) -> Result<Vec<ListedItem>> {
        let mut sql = format!(
            "SELECT {}, u.username FROM items i LEFT JOIN users u ON u.user_id = i.owner_id WHERE 1 = 1",
            ITEM_COLUMNS
        );
        let mut params: Vec<Value> = Vec::new();

        if !filter.include_swapped {
            sql.push_str(" AND i.status != 'swapped'");
        }

        if let Some(text) = filter.text.as_deref().filter(|t| !t.is_empty()) {
            sql.push_str(
                " AND (fold_case(i.title) LIKE ? ESCAPE '\\' OR fold_case(i.description) LIKE ? ESCAPE '\\')",
            );
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
        }

        if let Some(offer) = filter.offer.as_deref() {
            sql.push_str(" AND i.category = ? COLLATE NOCASE");
            params.push(Value::Text(offer.to_string()));
        }

        if let Some(want) = filter.want.as_deref() {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(i.wanted_categories) w WHERE w.value = ? COLLATE NOCASE)",
            );
            params.push(Value::Text(want.to_string()));
        }

        sql.push_str(" ORDER BY i.created_at DESC, i.rowid DESC LIMIT ?");
        params.push(Value::Integer(i64::from(filter.limit)));

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                    Ok(ListedItem {
                        item: item_from_row(row)?,
                        owner_name: row
                            .get::<_, Option<String>>(11)?
                            .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_items(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))?))
    }
}

pub(super) fn insert_item_on(conn: &Connection, item: &NewItem) -> Result<Item> {
    let now = Utc::now();
    let wanted = serde_json::to_string(&item.wanted_categories)?;
    let (image_data, image_type) = match &item.image {
        Some(img) => (Some(img.data.as_slice()), Some(img.content_type.as_str())),
        None => (None, None),
    };

    conn.execute(
        "INSERT INTO items (item_id, title, description, owner_id, category, wanted_categories,
                            image_data, image_content_type, image_url, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'available', ?10, ?10)",
        rusqlite::params![
            item.item_id,
            item.title,
            item.description,
            item.owner_id,
            item.category,
            wanted,
            image_data,
            image_type,
            item.image_url,
            now,
        ],
    )?;

    Ok(Item {
        item_id: item.item_id.clone(),
        title: item.title.clone(),
        description: item.description.clone(),
        owner_id: item.owner_id.clone(),
        category: item.category.clone(),
        wanted_categories: item.wanted_categories.clone(),
        image_url: item.image_url.clone(),
        has_image: item.image.as_ref().is_some_and(|img| !img.data.is_empty()),
        status: ItemStatus::Available,
        created_at: now,
        updated_at: now,
    })
}

fn query_item(conn: &Connection, item_id: &str) -> Result<Option<Item>> {
    let sql = format!("SELECT {} FROM items i WHERE i.item_id = ?1", ITEM_COLUMNS);
    conn.query_row(&sql, [item_id], item_from_row).optional()
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let wanted_raw: String = row.get(5)?;
    let wanted_categories: Vec<String> = serde_json::from_str(&wanted_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Item {
        item_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        category: row.get(4)?,
        wanted_categories,
        image_url: row.get(6)?,
        has_image: row.get(7)?,
        status: parse_column(row, 8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Make `%`, `_` and `\` match literally under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
