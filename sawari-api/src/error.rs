use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use sawari_booking::BookingError;
use sawari_catalog::CatalogError;
use sawari_core::RepositoryError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    /// Race loss or stale client view: distinct from generic failure so the
    /// caller can re-fetch availability and retry.
    SeatsUnavailable(Vec<Uuid>),
    /// The bus has no trip on the requested date's weekday: distinct from
    /// fully booked.
    NotOperating(NaiveDate),
    /// Persisted state disagrees with itself (e.g. seat count vs.
    /// configuration). Surfaced, never auto-corrected.
    IntegrityError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": msg }))
            }
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::SeatsUnavailable(seats) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "seats no longer available",
                    "code": "SEATS_UNAVAILABLE",
                    "seats": seats,
                }),
            ),
            AppError::NotOperating(date) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": format!("bus does not operate on {date}"),
                    "code": "NOT_OPERATING",
                }),
            ),
            AppError::IntegrityError(msg) => {
                tracing::error!("Data integrity error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "data integrity error" }),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => AppError::NotFoundError(what),
            RepositoryError::Conflict(what) => AppError::ConflictError(what),
            RepositoryError::Storage(err) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::SeatCountMismatch { .. } => AppError::IntegrityError(err.to_string()),
            CatalogError::UnknownConfig(_)
            | CatalogError::MissingPrice(_)
            | CatalogError::InvalidPrice(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SeatsUnavailable { seats } => AppError::SeatsUnavailable(seats),
            BookingError::NotOperating { date } => AppError::NotOperating(date),
            BookingError::Repository(err) => err.into(),
            BookingError::NoSeatsRequested
            | BookingError::DuplicateSeats
            | BookingError::PassengerCountMismatch { .. }
            | BookingError::UnknownSeats(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_loss_maps_to_conflict() {
        let err: AppError = BookingError::SeatsUnavailable {
            seats: vec![Uuid::new_v4()],
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_operating_distinct_from_not_found() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let err: AppError = BookingError::NotOperating { date }.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_integrity_error_is_server_side() {
        let err: AppError = CatalogError::SeatCountMismatch {
            expected: 28,
            actual: 27,
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
