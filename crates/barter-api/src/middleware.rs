use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::Utc;
use tracing::{debug, warn};

use barter_types::models::{Session, SessionUser};

use crate::error::{ApiError, AppError, ErrorDetail};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "barter_session";

/// Resolve the session cookie into an `Extension<Session>` when it points at
/// a live session. Anonymous requests pass through untouched.
pub async fn load_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return next.run(req).await;
    };

    let consume_flash = renders_page(&req);
    let lookup = state
        .db(move |db| {
            let Some(mut session) = db.get_active_session(&token, Utc::now())? else {
                return Ok(None);
            };
            if consume_flash && session.flash.is_some() {
                session.flash = db.take_flash(&session.token)?;
            } else {
                session.flash = None;
            }
            Ok(Some(session))
        })
        .await;

    match lookup {
        Ok(Some(session)) => {
            req.extensions_mut().insert(session);
        }
        Ok(None) => debug!("Session cookie with no live session"),
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            return if is_json_route(&req) {
                ApiError(e).into_response()
            } else {
                e.into_response()
            };
        }
    }

    next.run(req).await
}

fn is_json_route(req: &Request) -> bool {
    let path = req.uri().path();
    path.starts_with("/messages") || path == "/auth/session"
}

/// In development, re-render failed responses with their underlying cause.
pub async fn expose_error_detail(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    if !state.config.development {
        return resp;
    }
    match resp.extensions().get::<ErrorDetail>().cloned() {
        Some(detail) => detail.render(resp.status()),
        None => resp,
    }
}

/// GET navigations that may show the one-shot flash notice.
fn renders_page(req: &Request) -> bool {
    let path = req.uri().path();
    req.method() == Method::GET
        && !path.starts_with("/static/")
        && !path.starts_with("/messages")
        && !path.starts_with("/auth/session")
        && !path.ends_with("/image")
}

/// HTML routes: anonymous visitors go to the login page.
pub async fn require_session(req: Request, next: Next) -> Response {
    if req.extensions().get::<Session>().is_some() {
        next.run(req).await
    } else {
        Redirect::to("/auth/login").into_response()
    }
}

/// JSON routes: anonymous callers get 401.
pub async fn require_session_api(req: Request, next: Next) -> Response {
    if req.extensions().get::<Session>().is_some() {
        next.run(req).await
    } else {
        ApiError::unauthorized("Login required").into_response()
    }
}

pub fn new_token() -> String {
    let bytes: [u8; 32] = rand::random();
    B64.encode(bytes)
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Persist a fresh session for `user` and return it.
pub async fn start_session(state: &AppState, user: SessionUser) -> Result<Session, AppError> {
    let now = Utc::now();
    let session = Session {
        token: new_token(),
        user,
        flash: None,
        created_at: now,
        expires_at: now + state.config.session_ttl,
    };

    let stored = session.clone();
    state.db(move |db| db.create_session(&stored)).await?;
    Ok(session)
}

/// Queue a notice for the next rendered page of this session.
pub async fn set_flash(state: &AppState, session: &Session, flash: &'static str) {
    let token = session.token.clone();
    if let Err(e) = state.db(move |db| db.set_flash(&token, flash)).await {
        warn!("Failed to store flash message: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = new_token();
        let b = new_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok".into(), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(cookie.max_age().is_none());
    }
}
