use axum::{
    Extension,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{info, warn};

use barter_db::models::{ItemUpdate, NewItem};
use barter_types::categories::{canonical_category, normalize_wanted};
use barter_types::image::resolve_content_type;
use barter_types::models::{Item, ItemImage, Session, image_path, new_id};
use barter_types::policy::{Action, Resource, authorize};

use crate::error::AppError;
use crate::extract::SubmittedForm;
use crate::state::AppState;
use crate::views::items::{ItemFormValues, edit_item_page, new_item_page};

/// Validated contents of an item form.
pub(crate) struct ItemInput {
    pub values: ItemFormValues,
    pub category: Option<String>,
    pub wanted: Vec<String>,
    pub image: Option<ItemImage>,
    pub errors: Vec<String>,
}

impl ItemInput {
    /// Read title, description, itemType, wantedCategories and the image.
    pub fn parse(form: &mut SubmittedForm) -> Self {
        let values = ItemFormValues {
            title: form.text("title"),
            description: form.text("description"),
            item_type: form.text("itemType"),
            wanted: form.all("wantedCategories").iter().map(|s| s.to_string()).collect(),
        };

        let mut errors = Vec::new();
        if values.title.is_empty() {
            errors.push("Title is required".to_string());
        }
        if values.description.is_empty() {
            errors.push("Description is required".to_string());
        }
        if let Some(upload_error) = form.upload_error {
            errors.push(upload_error.to_string());
        }

        Self {
            category: canonical_category(&values.item_type).map(str::to_string),
            wanted: normalize_wanted(values.wanted.iter().map(String::as_str)),
            image: form.upload.take(),
            values,
            errors,
        }
    }

    pub fn into_new_item(self, owner_id: &str) -> NewItem {
        let item_id = new_id();
        NewItem {
            image_url: self.image.as_ref().map(|_| image_path(&item_id)),
            item_id,
            title: self.values.title,
            description: self.values.description,
            owner_id: owner_id.to_string(),
            category: self.category,
            wanted_categories: self.wanted,
            image: self.image,
        }
    }
}

fn require_id(id: &str) -> Result<String, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::bad_request("Invalid Item", "Item ID is required."));
    }
    Ok(id.to_string())
}

/// Load an item the session user is about to change, enforcing ownership.
async fn owned_item(
    state: &AppState,
    session: &Session,
    item_id: String,
    action: Action,
) -> Result<Item, AppError> {
    let lookup = item_id.clone();
    let item = state
        .db(move |db| db.get_item(&lookup))
        .await?
        .ok_or_else(|| {
            let verb = if action == Action::DeleteItem { "delete" } else { "edit" };
            AppError::not_found(
                "Item Not Found",
                format!("The item you are trying to {} does not exist.", verb),
            )
        })?;

    if let Err(denied) = authorize(&session.user.user_id, action, Resource::Item(&item)) {
        warn!(
            "User {} attempted {:?} on item {} owned by {}",
            session.user.user_id, action, item_id, item.owner_id
        );
        return Err(AppError::Forbidden {
            title: "Access Denied".into(),
            message: denied.message.into(),
        });
    }

    Ok(item)
}

/// Public image endpoint.
pub async fn image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let item_id = require_id(&id)?;
    let image = state
        .db(move |db| db.get_item_image(&item_id))
        .await?
        .ok_or_else(|| AppError::not_found("Image Not Found", "This item has no image."))?;

    let content_type = resolve_content_type(Some(&image.content_type), &image.data);
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate".to_string()),
            (header::PRAGMA, "no-cache".to_string()),
            (header::EXPIRES, "0".to_string()),
        ],
        image.data,
    )
        .into_response())
}

pub async fn new_form(Extension(session): Extension<Session>) -> Html<String> {
    Html(new_item_page(Some(&session), &ItemFormValues::default(), &[]))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut form: SubmittedForm,
) -> Result<Response, AppError> {
    let input = ItemInput::parse(&mut form);
    if !input.errors.is_empty() {
        let page = new_item_page(Some(&session), &input.values, &input.errors);
        return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
    }

    let new_item = input.into_new_item(&session.user.user_id);
    let item = state.db(move |db| db.insert_item(&new_item)).await?;

    info!("User {} created item {}", session.user.user_id, item.item_id);
    state.audit("ITEM_CREATE", Some(session.user.user_id.clone()));
    Ok(Redirect::to("/search").into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let item_id = require_id(&id)?;
    let item = owned_item(&state, &session, item_id, Action::EditItem).await?;
    Ok(Html(edit_item_page(Some(&session), &item, &ItemFormValues::from(&item), &[])))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    mut form: SubmittedForm,
) -> Result<Response, AppError> {
    let item_id = require_id(&id)?;
    let item = owned_item(&state, &session, item_id.clone(), Action::EditItem).await?;

    let input = ItemInput::parse(&mut form);
    if !input.errors.is_empty() {
        let page = edit_item_page(Some(&session), &item, &input.values, &input.errors);
        return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
    }

    let image = input.image.map(|img| {
        let url = format!("{}?v={}", image_path(&item_id), Utc::now().timestamp_millis());
        (img, url)
    });
    let update = ItemUpdate {
        title: input.values.title,
        description: input.values.description,
        category: input.category,
        wanted_categories: input.wanted,
        image,
    };

    let target = item_id.clone();
    let updated = state.db(move |db| db.update_item(&target, &update)).await?;
    if !updated {
        return Err(AppError::not_found(
            "Item Not Found",
            "The item you are trying to edit does not exist.",
        ));
    }

    info!("User {} edited item {}", session.user.user_id, item_id);
    state.audit("ITEM_EDIT", Some(session.user.user_id.clone()));
    Ok(Redirect::to("/search").into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let item_id = require_id(&id)?;
    owned_item(&state, &session, item_id.clone(), Action::DeleteItem).await?;

    let target = item_id.clone();
    state.db(move |db| db.delete_item(&target)).await?;

    info!("User {} deleted item {}", session.user.user_id, item_id);
    state.audit("ITEM_DELETE", Some(session.user.user_id.clone()));
    Ok(Redirect::to("/search"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_categories_and_collects_errors() {
        let mut form = SubmittedForm::from_fields(vec![
            ("title".into(), "   ".into()),
            ("description".into(), "Cordless drill".into()),
            ("itemType".into(), "tools".into()),
            ("wantedCategories".into(), "books".into()),
            ("wantedCategories".into(), "Spaceships".into()),
        ]);
        let input = ItemInput::parse(&mut form);

        assert_eq!(input.errors, vec!["Title is required".to_string()]);
        assert_eq!(input.category.as_deref(), Some("Tools"));
        assert_eq!(input.wanted, vec!["Books".to_string()]);
        assert_eq!(input.values.item_type, "tools");
    }

    #[test]
    fn unknown_item_type_is_dropped() {
        let mut form = SubmittedForm::from_fields(vec![
            ("title".into(), "Telescope".into()),
            ("description".into(), "Refractor".into()),
            ("itemType".into(), "Astronomy".into()),
        ]);
        let input = ItemInput::parse(&mut form);
        assert!(input.errors.is_empty());
        assert_eq!(input.category, None);

        let new_item = input.into_new_item("u1");
        assert_eq!(new_item.owner_id, "u1");
        assert!(new_item.image_url.is_none());
    }
}
