use axum::{
    Extension,
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::debug;

use barter_db::models::SearchFilter;
use barter_types::categories::{canonical_category, normalize_category};
use barter_types::models::Session;

use crate::error::AppError;
use crate::state::AppState;
use crate::views::items::{SearchView, search_page};

pub const SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub offer: Option<String>,
    /// Older links used `type` for the offered category.
    #[serde(rename = "type")]
    pub legacy_type: Option<String>,
    pub want: Option<String>,
    #[serde(rename = "includeSwapped")]
    pub include_swapped: Option<String>,
}

impl SearchQuery {
    fn view(&self) -> SearchView {
        let offer = self
            .offer
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .or(self.legacy_type.as_deref())
            .unwrap_or("");
        SearchView {
            q: self.q.as_deref().unwrap_or("").trim().to_string(),
            offer: normalize_category(offer),
            want: normalize_category(self.want.as_deref().unwrap_or("")),
            include_swapped: self.include_swapped.as_deref() == Some("true"),
        }
    }
}

impl SearchView {
    /// Unknown categories are ignored rather than matching nothing.
    fn filter(&self) -> SearchFilter {
        SearchFilter {
            text: (!self.q.is_empty()).then(|| self.q.clone()),
            offer: canonical_category(&self.offer).map(str::to_string),
            want: canonical_category(&self.want).map(str::to_string),
            include_swapped: self.include_swapped,
            limit: SEARCH_LIMIT,
        }
    }
}

pub async fn search(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
    let view = query.view();
    let filter = view.filter();
    debug!("Search {:?}", filter);

    let results = state.db(move |db| db.search_items(&filter)).await?;
    Ok(Html(search_page(&session, &view, &results)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_type_stands_in_for_offer() {
        let query = SearchQuery {
            legacy_type: Some("books".into()),
            ..SearchQuery::default()
        };
        let filter = query.view().filter();
        assert_eq!(filter.offer.as_deref(), Some("Books"));
        assert!(!filter.include_swapped);
        assert_eq!(filter.limit, SEARCH_LIMIT);
    }

    #[test]
    fn unknown_categories_and_blank_text_are_ignored() {
        let query = SearchQuery {
            q: Some("   ".into()),
            want: Some("Spaceships".into()),
            include_swapped: Some("true".into()),
            ..SearchQuery::default()
        };
        let view = query.view();
        let filter = view.filter();
        assert_eq!(filter.text, None);
        assert_eq!(filter.want, None);
        assert_eq!(view.want, "Spaceships");
        assert!(filter.include_swapped);
    }
}
