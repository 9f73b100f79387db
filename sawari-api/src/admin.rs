use axum::{extract::State, middleware, routing::post, Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{admin_auth_middleware, Claims};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OperatorKeyResponse {
    pub key: String,
    pub created_at: DateTime<Utc>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/operator-keys", post(generate_operator_key))
        .layer(middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

/// POST /api/admin/operator-keys
/// Mint a single-use key that grants the operator role at registration.
async fn generate_operator_key(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<(axum::http::StatusCode, Json<OperatorKeyResponse>), AppError> {
    let admin_id = claims
        .user_id()
        .ok_or_else(|| AppError::AuthenticationError("not authorized".to_string()))?;

    let key = Uuid::new_v4().simple().to_string();
    let record = state.users.create_operator_key(&key, admin_id).await?;

    tracing::info!(admin_id = %admin_id, "operator key generated");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(OperatorKeyResponse {
            key: record.key,
            created_at: record.created_at,
        }),
    ))
}
