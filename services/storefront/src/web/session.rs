//! services/storefront/src/web/session.rs
//!
//! Visitor sessions: loading them for each request and writing them back.
//!
//! The middleware only reads. Handlers that change the session build the new
//! `SessionData` themselves and call `save_session`, which returns the
//! `Set-Cookie` value to send with their response.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use storefront_core::domain::SessionData;
use tracing::error;
use uuid::Uuid;

use crate::config::Config;
use crate::web::{internal_error, state::AppState};

pub const SESSION_COOKIE: &str = "sessionid";

/// The visitor's session as it was when the request arrived.
#[derive(Debug, Clone)]
pub struct Visitor {
    pub session_id: String,
    pub data: SessionData,
    /// True when no stored session matched the request's cookie.
    pub is_new: bool,
}

impl Visitor {
    fn fresh() -> Self {
        Self {
            session_id: new_session_id(),
            data: SessionData::default(),
            is_new: true,
        }
    }
}

pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Middleware that loads the visitor session named by the session cookie.
///
/// Unknown, expired or missing sessions give a fresh, empty `Visitor`, which
/// is inserted into the request extensions for handlers to use.
pub async fn load_visitor(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let stored = match cookie_value(req.headers(), SESSION_COOKIE) {
        Some(session_id) => state
            .db
            .load_session(&session_id)
            .await
            .map_err(|e| {
                error!("Failed to load visitor session: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .map(|data| Visitor {
                session_id,
                data,
                is_new: false,
            }),
        None => None,
    };

    req.extensions_mut()
        .insert(stored.unwrap_or_else(Visitor::fresh));
    Ok(next.run(req).await)
}

/// Persists `data` under `session_id`, pushing the expiry forward, and
/// returns the matching `Set-Cookie` header value.
pub async fn save_session(
    state: &AppState,
    session_id: &str,
    data: &SessionData,
) -> Result<String, (StatusCode, String)> {
    let expires_at = Utc::now() + state.config.session_ttl;
    state
        .db
        .save_session(session_id, data, expires_at)
        .await
        .map_err(internal_error("Failed to save session"))?;
    Ok(session_cookie(&state.config, session_id))
}

pub fn session_cookie(config: &Config, session_id: &str) -> String {
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        secure_attribute(config),
        config.session_ttl.num_seconds()
    )
}

pub fn expired_session_cookie(config: &Config) -> String {
    format!(
        "{}=; HttpOnly;{} SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE,
        secure_attribute(config)
    )
}

fn secure_attribute(config: &Config) -> &'static str {
    if config.public_base_url.starts_with("https://") {
        " Secure;"
    } else {
        ""
    }
}

/// Finds `name` in the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (key, value) = c.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}
