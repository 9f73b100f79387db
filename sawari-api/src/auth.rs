use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use sawari_core::{NewUser, User, UserRole};

use crate::error::AppError;
use crate::middleware::auth::{claims_from_headers, Claims};
use crate::state::{AppState, AuthConfig};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub operator_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {e}")))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<AuthResponse>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("name is required".to_string()));
    }
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError(
            "a valid email is required".to_string(),
        ));
    }
    if req.password.len() < 6 {
        return Err(AppError::ValidationError(
            "password must be at least 6 characters".to_string(),
        ));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::ConflictError("user already exists".to_string()));
    }

    // The first account becomes the admin; an unused operator key upgrades
    // the account to an operator.
    let mut role = UserRole::User;
    let mut key_record = None;

    if state.users.count_users().await? == 0 {
        role = UserRole::Admin;
    } else if let Some(key) = &req.operator_key {
        let record = state
            .users
            .find_operator_key(key)
            .await?
            .ok_or_else(|| AppError::ValidationError("invalid operator key".to_string()))?;

        if record.is_used() {
            return Err(AppError::ConflictError(
                "operator key already used".to_string(),
            ));
        }

        role = UserRole::BusOperator;
        key_record = Some(record);
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {e}")))?;

    let user = state
        .users
        .create_user(NewUser {
            name: req.name.trim().to_string(),
            email,
            password_hash,
            phone: req.phone,
            role,
        })
        .await?;

    if let Some(record) = key_record {
        state
            .users
            .mark_operator_key_used(record.id, user.id)
            .await?;
    }

    let token = issue_token(&state.auth, &user)?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(AuthResponse { token, user }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::AuthenticationError("invalid credentials".to_string()))?;

    let matches = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !matches {
        return Err(AppError::AuthenticationError(
            "invalid credentials".to_string(),
        ));
    }

    let token = issue_token(&state.auth, &user)?;

    Ok(Json(AuthResponse { token, user }))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>, AppError> {
    let claims = claims_from_headers(&headers, &state.auth.secret)
        .map_err(|_| AppError::AuthenticationError("not authorized".to_string()))?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::AuthenticationError("not authorized".to_string()))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("user not found".to_string()))?;

    Ok(Json(user))
}
