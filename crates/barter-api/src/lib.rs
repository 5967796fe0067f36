pub mod account;
pub mod auth;
pub mod error;
pub mod extract;
pub mod items;
pub mod messages;
pub mod middleware;
pub mod pages;
pub mod password;
pub mod search;
pub mod state;
pub mod swaps;
pub mod views;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use state::{ApiConfig, AppState, AppStateInner};

/// The whole application. The binary serves it, tests drive it directly.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/styleguide", get(pages::styleguide))
        .route("/auth/register", get(auth::register_form).post(auth::register))
        .route("/auth/login", get(auth::login_form).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session_status))
        .route("/items/{id}/image", get(items::image));

    let session_routes = Router::new()
        .route("/items/new", get(items::new_form).post(items::create))
        .route("/items/{id}/edit", get(items::edit_form).post(items::update))
        .route("/items/{id}/delete", post(items::delete))
        .route("/search", get(search::search))
        .route("/swaps/outgoing", get(swaps::outgoing))
        .route("/swaps/incoming", get(swaps::incoming))
        .route("/swaps/{id}", get(swaps::request_form).post(swaps::create))
        .route("/swaps/{id}/accept", post(swaps::accept).put(swaps::accept))
        .route("/swaps/{id}/reject", post(swaps::reject).put(swaps::reject))
        .route("/swaps/{id}/cancel", post(swaps::cancel).put(swaps::cancel))
        .route("/account", get(account::show))
        .route("/account/edit", get(account::edit_form).post(account::update))
        .layer(DefaultBodyLimit::max(extract::FORM_BODY_LIMIT))
        .route_layer(from_fn(middleware::require_session));

    let api_routes = Router::new()
        .route("/messages", get(messages::status).post(messages::send_message))
        .route("/messages/conversation/{id}", get(messages::conversation))
        .route("/messages/{id}", delete(messages::delete_message))
        .route_layer(from_fn(middleware::require_session_api));

    let static_dir = state.config.static_dir.clone();
    let detail_state = state.clone();

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(api_routes)
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::load_session))
        .with_state(state)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(from_fn_with_state(detail_state, middleware::expose_error_detail))
        .layer(TraceLayer::new_for_http())
}
