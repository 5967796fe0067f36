use axum::{Extension, http::StatusCode, response::Html};

use barter_types::models::Session;

use crate::views;

pub async fn home(session: Option<Extension<Session>>) -> Html<String> {
    Html(views::home_page(session.as_ref().map(|s| &s.0)))
}

/// Reference sheet for the site's buttons, badges and form controls.
pub async fn styleguide(session: Option<Extension<Session>>) -> Html<String> {
    Html(views::styleguide_page(session.as_ref().map(|s| &s.0)))
}

pub async fn not_found(session: Option<Extension<Session>>) -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(views::not_found_page(session.as_ref().map(|s| &s.0))),
    )
}
