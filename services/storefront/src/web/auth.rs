//! services/storefront/src/web/auth.rs
//!
//! Account endpoints: signup, activation, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    Extension, Form,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use storefront_core::accounts::{SignupErrors, SignupForm};
use storefront_core::domain::{Account, NewAccount, SessionData};
use storefront_core::ports::{OutgoingMail, PortError};
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::adapters::tokens::{decode_uid, encode_uid};
use crate::web::{
    internal_error,
    session::{expired_session_cookie, new_session_id, save_session, Visitor},
    state::AppState,
    views::{ActivationPage, ActivationStatus, LoginPage, SignupPage, SignupSuccess},
};

const INVALID_LOGIN: &str = "Please enter a correct username and password.";

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

//=========================================================================================
// Signup and Activation
//=========================================================================================

/// GET /signup/ - A blank signup form
#[utoipa::path(
    get,
    path = "/signup/",
    responses((status = 200, description = "Blank signup form", body = SignupPage))
)]
pub async fn signup_page_handler() -> Json<SignupPage> {
    Json(SignupPage::default())
}

/// POST /signup/ - Create an inactive account and mail its activation link
#[utoipa::path(
    post,
    path = "/signup/",
    request_body(
        content_type = "application/x-www-form-urlencoded",
        description = "username, email, password1, password2"
    ),
    responses(
        (status = 201, description = "Account created; activation mail sent", body = SignupSuccess),
        (status = 400, description = "The form has errors", body = SignupPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Response, (StatusCode, String)> {
    let signup = match form.validate() {
        Ok(signup) => signup,
        Err(errors) => return Ok(signup_rejected(&form, errors)),
    };

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(signup.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to hash password".to_string(),
            )
        })?
        .to_string();

    // 2. Store the account, inactive until the link is followed
    let account = match state
        .db
        .create_account(NewAccount {
            username: signup.username,
            email: signup.email,
            password_hash,
        })
        .await
    {
        Ok(account) => account,
        Err(PortError::Conflict(_)) => {
            return Ok(signup_rejected(&form, SignupErrors::username_taken()))
        }
        Err(e) => return Err(internal_error("Failed to create account")(e)),
    };

    // 3. Mail the activation link
    let link = activation_link(&state, &account);
    state
        .mailer
        .send_mail(OutgoingMail {
            to: account.email.clone(),
            subject: "Activate your account".to_string(),
            body: format!("Hello {}, click here to activate your account: {}", account.username, link),
        })
        .await
        .map_err(internal_error("Failed to send activation mail"))?;

    info!(account_id = account.id, "Account created; activation mail sent");
    Ok((
        StatusCode::CREATED,
        Json(SignupSuccess {
            email: account.email,
        }),
    )
        .into_response())
}

fn signup_rejected(form: &SignupForm, errors: SignupErrors) -> Response {
    let page = SignupPage {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        errors: errors.into(),
    };
    (StatusCode::BAD_REQUEST, Json(page)).into_response()
}

fn activation_link(state: &AppState, account: &Account) -> String {
    format!(
        "{}/activate/{}/{}/",
        state.config.public_base_url,
        encode_uid(account.id),
        state.tokens.make_token(account)
    )
}

/// GET /activate/{uid}/{token}/ - Activate an account from its emailed link
#[utoipa::path(
    get,
    path = "/activate/{uid}/{token}/",
    params(
        ("uid" = String, Path, description = "Encoded account id"),
        ("token" = String, Path, description = "Activation token")
    ),
    responses(
        (status = 200, description = "Account activated", body = ActivationPage),
        (status = 400, description = "The link is invalid or has expired", body = ActivationPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn activate_handler(
    State(state): State<Arc<AppState>>,
    Path((uid, token)): Path<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    let invalid = || {
        (
            StatusCode::BAD_REQUEST,
            Json(ActivationPage {
                status: ActivationStatus::Invalid,
            }),
        )
            .into_response()
    };

    let Some(account_id) = decode_uid(&uid) else {
        return Ok(invalid());
    };
    let account = match state.db.get_account(account_id).await {
        Ok(account) => account,
        Err(PortError::NotFound(_)) => return Ok(invalid()),
        Err(e) => {
            error!("Failed to look up account {}: {:?}", account_id, e);
            return Ok(invalid());
        }
    };
    if !state.tokens.check_token(&account, &token) {
        warn!(account_id, "Rejected activation token");
        return Ok(invalid());
    }

    state
        .db
        .activate_account(account.id)
        .await
        .map_err(internal_error("Failed to activate account"))?;

    info!(account_id, "Account activated");
    Ok(Json(ActivationPage {
        status: ActivationStatus::Activated,
    })
    .into_response())
}

//=========================================================================================
// Login and Logout
//=========================================================================================

/// GET /login/ - A blank login form
#[utoipa::path(
    get,
    path = "/login/",
    responses((status = 200, description = "Blank login form", body = LoginPage))
)]
pub async fn login_page_handler() -> Json<LoginPage> {
    Json(LoginPage::default())
}

/// POST /login/ - Bind an account to the visitor session
#[utoipa::path(
    post,
    path = "/login/",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in; redirect to the catalog"),
        (status = 401, description = "Invalid credentials", body = LoginPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let rejected = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(LoginPage {
                username: form.username.clone(),
                error: Some(INVALID_LOGIN.to_string()),
            }),
        )
            .into_response()
    };

    // 1. Get the account by username
    let account = match state.db.get_account_by_username(form.username.trim()).await {
        Ok(account) => account,
        Err(PortError::NotFound(_)) => return Ok(rejected()),
        Err(e) => return Err(internal_error("Failed to look up account")(e)),
    };

    // 2. Verify the password; inactive accounts fail the same way
    let parsed_hash = PasswordHash::new(&account.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error".to_string(),
        )
    })?;
    let valid = Argon2::default()
        .verify_password(form.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid || !account.is_active {
        return Ok(rejected());
    }

    // 3. Record the login
    state
        .db
        .record_login(account.id, Utc::now())
        .await
        .map_err(internal_error("Failed to record login"))?;

    // 4. Move the visitor's cart to a new session id bound to the account
    let data = SessionData {
        account_id: Some(account.id),
        cart: visitor.data.cart,
    };
    let session_id = new_session_id();
    let cookie = save_session(&state, &session_id, &data).await?;
    if !visitor.is_new {
        state
            .db
            .delete_session(&visitor.session_id)
            .await
            .map_err(internal_error("Failed to rotate session"))?;
    }

    info!(account_id = account.id, "Account logged in");
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// GET /logout/ - Forget the visitor session, cart included
#[utoipa::path(
    get,
    path = "/logout/",
    responses((status = 303, description = "Logged out; redirect to the catalog"))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, (StatusCode, String)> {
    if !visitor.is_new {
        state
            .db
            .delete_session(&visitor.session_id)
            .await
            .map_err(internal_error("Failed to logout"))?;
    }

    let cookie = expired_session_cookie(&state.config);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}
