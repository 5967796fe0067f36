use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use tracing::{info, warn};

use barter_types::api::{ApiResponse, LoginRequest, RegisterRequest, SessionStatus, UserData};
use barter_types::models::{DEFAULT_ROLE, Session, SessionUser, User, new_id};
use barter_types::validate::{check_password_strength, is_valid_email, normalize_email};

use crate::error::ApiError;
use crate::extract::FormOrJson;
use crate::middleware::{SESSION_COOKIE, session_cookie, start_session};
use crate::password;
use crate::state::AppState;
use crate::views;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub async fn register_form(session: Option<Extension<Session>>) -> Html<String> {
    Html(views::auth::register_page(session.as_ref().map(|s| &s.0)))
}

pub async fn login_form(session: Option<Extension<Session>>) -> Response {
    if session.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(views::auth::login_page(None)).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    FormOrJson(req): FormOrJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(email), Some(password)) =
        (provided(&req.name), provided(&req.email), provided(&req.password))
    else {
        return Err(ApiError::bad_request("Please provide name, email, and password"));
    };

    let username = name.trim().to_string();
    let email = normalize_email(email);
    if username.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Please provide a valid email address"));
    }
    check_password_strength(password).map_err(ApiError::bad_request)?;

    let lookup = (email.clone(), username.clone());
    let existing = state
        .db(move |db| db.find_user_by_email_or_username(&lookup.0, &lookup.1))
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("User with this email or username already exists"));
    }

    let password_hash = password::hash(password.to_string()).await?;
    let now = Utc::now();
    let user = User {
        user_id: new_id(),
        username,
        email,
        password_hash,
        role: DEFAULT_ROLE.to_string(),
        created_at: now,
        updated_at: now,
    };

    let stored = user.clone();
    let created = state
        .db(move |db| match db.create_user(&stored) {
            // Lost a race with a concurrent registration.
            Err(barter_db::Error::Duplicate { field }) => Ok(Err(field)),
            other => other.map(Ok),
        })
        .await?;
    if let Err(field) = created {
        return Err(ApiError::conflict(format!("User with this {} already exists", field)));
    }

    info!("Registered user {} ({})", user.username, user.user_id);
    state.audit("USER_REGISTER", Some(user.user_id.clone()));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Account registered successfully", UserData::from(&user))),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    FormOrJson(req): FormOrJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (provided(&req.email), provided(&req.password)) else {
        return Err(ApiError::bad_request("Please provide email and password"));
    };

    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Please provide a valid email address"));
    }

    let lookup = email.clone();
    let Some(user) = state.db(move |db| db.get_user_by_email(&lookup)).await? else {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !password::verify(password.to_string(), user.password_hash.clone()).await? {
        warn!("Failed login for user {}", user.user_id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let session = start_session(&state, SessionUser::from(&user)).await?;
    state.audit("USER_LOGIN", Some(user.user_id.clone()));

    let jar = jar.add(session_cookie(session.token, state.config.cookie_secure));
    Ok((
        jar,
        Json(ApiResponse::ok("Login successful", UserData::from(&user))),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Some(Extension(session)) = session {
        let token = session.token.clone();
        if let Err(e) = state.db(move |db| db.delete_session(&token)).await {
            warn!("Failed to delete session on logout: {}", e);
        }
        state.audit("USER_LOGOUT", Some(session.user.user_id));
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/auth/login"))
}

pub async fn session_status(session: Option<Extension<Session>>) -> Json<SessionStatus> {
    Json(match session {
        Some(Extension(session)) => SessionStatus {
            authenticated: true,
            user: Some(UserData::from(&session.user)),
        },
        None => SessionStatus {
            authenticated: false,
            user: None,
        },
    })
}
