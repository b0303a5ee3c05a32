//! HTTP handlers for `/signup`, `/login`, `/users` and the token guard

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::storage::StoreError;
use super::token::extract_token;
use super::types::{LoginForm, SignupForm, TokenResponse, User, UserSummary};
use super::validate::{normalize_email, validate_email, validate_name, validate_password};
use super::{AuthError, Identity};
use crate::error::AppError;
use crate::server::AppState;

/// Register a new user
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);

    validate_name(&form.name)?;
    validate_email(&email)?;
    validate_password(&form.password)?;

    if state.users.find_by_email(&email).await.map_err(AuthError::from)?.is_some() {
        debug!(%email, "Signup for existing user");
        return Err(AuthError::AlreadyExists.into());
    }

    let user = User::new(form.name, email.clone(), state.hasher.hash(&form.password));
    match state.users.insert(user).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => return Err(AuthError::AlreadyExists.into()),
        Err(e) => return Err(AuthError::from(e).into()),
    }

    info!(%email, "Registered new user");
    Ok((StatusCode::CREATED, "Successfully registered.").into_response())
}

/// Exchange email and password for an access token.
///
/// HTTP Basic credentials, when present, take precedence over the form.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Option<Form<LoginForm>>,
) -> Result<Json<TokenResponse>, AppError> {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let (email, password) = basic_credentials(&headers).unwrap_or((form.email, form.password));

    if email.is_empty() || password.is_empty() {
        return Err(AuthError::CouldNotVerify {
            reason: "Credentials required",
        }
        .into());
    }

    let email = normalize_email(&email);
    validate_email(&email)?;
    validate_password(&password)?;

    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(AuthError::from)?
        .ok_or(AuthError::CouldNotVerify {
            reason: "Invalid Email Address.",
        })?;

    if !state.hasher.verify(&user.password_hash, &password) {
        warn!(%email, "Login with wrong password");
        return Err(AuthError::CouldNotVerify {
            reason: "Invalid Password.",
        }
        .into());
    }

    let access_token = state.tokens.issue(&user.email)?;
    info!(%email, "Issued access token");
    Ok(Json(TokenResponse { access_token }))
}

/// List registered users; requires a valid access token
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    debug!(identity = %identity.0, "Listing users");
    let users = state.users.list().await.map_err(AuthError::from)?;
    Ok(Json(users.iter().map(User::summary).collect()))
}

/// Middleware rejecting requests without a valid access token
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_token)
    {
        Some(t) => t.to_string(),
        None => return AppError::from(AuthError::MissingToken).into_response(),
    };

    let claims = match state.tokens.verify(&token) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Token verification failed");
            return AppError::from(e).into_response();
        }
    };

    request.extensions_mut().insert(Identity(claims.sub));
    next.run(request).await
}

/// Decode `Authorization: Basic <base64(user:pass)>`
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
