use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::info;

use barter_types::models::Session;
use barter_types::validate::MIN_ACCOUNT_PASSWORD_LEN;

use crate::error::AppError;
use crate::extract::SubmittedForm;
use crate::password;
use crate::state::AppState;
use crate::views::account::{account_page, edit_account_page};

fn account_not_found() -> AppError {
    AppError::not_found("Not Found", "User account not found.")
}

pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    let user_id = session.user.user_id.clone();
    let (user, items) = state
        .db(move |db| Ok((db.get_user_by_id(&user_id)?, db.items_by_owner(&user_id)?)))
        .await?;
    let user = user.ok_or_else(account_not_found)?;

    Ok(Html(account_page(&session, &user, &items)))
}

pub async fn edit_form(Extension(session): Extension<Session>) -> Html<String> {
    Html(edit_account_page(&session, &session.user.username, &[]))
}

/// Account form rules: username required, an optional new password of at
/// least six characters that matches its confirmation.
fn validate(username: &str, password: &str, confirm: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    }
    if !password.is_empty() {
        if password.chars().count() < MIN_ACCOUNT_PASSWORD_LEN {
            errors.push("Password must be at least 6 characters".to_string());
        }
        if password != confirm {
            errors.push("Passwords do not match".to_string());
        }
    }
    errors
}

pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    form: SubmittedForm,
) -> Result<Response, AppError> {
    let username = form.text("username");
    let new_password = form.text("password");
    let confirm = form.text("confirmPassword");

    let errors = validate(&username, &new_password, &confirm);
    if !errors.is_empty() {
        let shown = if username.is_empty() { session.user.username.as_str() } else { username.as_str() };
        let page = edit_account_page(&session, shown, &errors);
        return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
    }

    let password_hash = if new_password.is_empty() {
        None
    } else {
        Some(password::hash(new_password).await?)
    };

    let user_id = session.user.user_id.clone();
    let name = username.clone();
    let outcome = state
        .db(move |db| {
            let updated = match db.update_user_profile(&user_id, &name, password_hash.as_deref(), Utc::now()) {
                Err(barter_db::Error::Duplicate { field }) => return Ok(Err(field)),
                other => other?,
            };
            if updated {
                db.update_session_username(&user_id, &name)?;
            }
            Ok(Ok(updated))
        })
        .await?;

    match outcome {
        Ok(true) => {}
        Ok(false) => return Err(account_not_found()),
        Err(field) => {
            let errors = vec![format!("That {} is already in use", field)];
            let page = edit_account_page(&session, &username, &errors);
            return Ok((StatusCode::CONFLICT, Html(page)).into_response());
        }
    }

    info!("User {} updated their account", session.user.user_id);
    state.audit("ACCOUNT_UPDATE", Some(session.user.user_id.clone()));
    Ok(Redirect::to("/account").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_optional_but_checked_when_given() {
        assert!(validate("rana", "", "").is_empty());
        assert_eq!(
            validate("", "abc", "abd"),
            vec![
                "Username is required".to_string(),
                "Password must be at least 6 characters".to_string(),
                "Passwords do not match".to_string(),
            ]
        );
        assert!(validate("rana", "secret1", "secret1").is_empty());
    }
}
