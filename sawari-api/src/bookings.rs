use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use sawari_booking::{Booking, BookingDetails, Gender, NewBooking, NewPassenger};

use crate::error::AppError;
use crate::middleware::auth::{claims_from_headers, Claims};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PassengerPayload {
    pub name: String,
    pub gender: Gender,
    pub age: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub bus_id: Uuid,
    pub date: NaiveDate,
    pub seats: Vec<Uuid>,
    pub passengers: Vec<PassengerPayload>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{id}", delete(cancel_booking))
        .route("/api/bookings/user/{user_id}", get(list_user_bookings))
        .route(
            "/api/bookings/operator/{operator_id}",
            get(list_operator_bookings),
        )
}

/// Bookings may be anonymous; a bearer token, when present, must be valid
/// and attributes the booking to that account.
fn optional_claims(headers: &HeaderMap, secret: &str) -> Result<Option<Claims>, AppError> {
    if !headers.contains_key("Authorization") {
        return Ok(None);
    }
    claims_from_headers(headers, secret)
        .map(Some)
        .map_err(|_| AppError::AuthenticationError("not authorized".to_string()))
}

fn required_claims(headers: &HeaderMap, secret: &str) -> Result<Claims, AppError> {
    claims_from_headers(headers, secret)
        .map_err(|_| AppError::AuthenticationError("not authorized".to_string()))
}

/// POST /api/bookings
/// Admission and commit happen atomically in the repository; a race loss
/// surfaces as 409 SEATS_UNAVAILABLE and the client re-fetches availability.
async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(axum::http::StatusCode, Json<BookingDetails>), AppError> {
    let user_id = optional_claims(&headers, &state.auth.secret)?
        .and_then(|claims| claims.user_id());

    let bus = state
        .buses
        .find_bus(req.bus_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("bus not found".to_string()))?;

    // Operating-day filter runs before any seat-level work.
    let operates = state
        .trips
        .find_by_bus(bus.id)
        .await?
        .is_some_and(|trip| trip.operates_on(req.date));
    if !operates {
        return Err(AppError::NotOperating(req.date));
    }

    for passenger in &req.passengers {
        if passenger.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "passenger name is required".to_string(),
            ));
        }
        if passenger.age <= 0 || passenger.age > 120 {
            return Err(AppError::ValidationError(
                "passenger age must be between 1 and 120".to_string(),
            ));
        }
    }

    let details = state
        .bookings
        .create_booking(NewBooking {
            bus_id: req.bus_id,
            user_id,
            travel_date: req.date,
            seat_ids: req.seats,
            passengers: req
                .passengers
                .into_iter()
                .map(|p| NewPassenger {
                    name: p.name.trim().to_string(),
                    gender: p.gender,
                    age: p.age,
                })
                .collect(),
        })
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(details)))
}

/// DELETE /api/bookings/:id
/// Cancels the booking and releases its seats for the travel date.
async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.cancel_booking(id).await?;
    Ok(Json(booking))
}

/// GET /api/bookings/user/:user_id
async fn list_user_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let claims = required_claims(&headers, &state.auth.secret)?;

    if claims.user_id() != Some(user_id) && claims.role != "ADMIN" {
        return Err(AppError::AuthorizationError(
            "cannot list another user's bookings".to_string(),
        ));
    }

    let bookings = state.bookings.list_by_user(user_id).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/operator/:operator_id
/// Bookings across all buses owned by the operator, newest first.
async fn list_operator_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(operator_id): Path<Uuid>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let claims = required_claims(&headers, &state.auth.secret)?;

    let is_owner = claims.role == "BUS_OPERATOR" && claims.user_id() == Some(operator_id);
    if !is_owner && claims.role != "ADMIN" {
        return Err(AppError::AuthorizationError(
            "cannot list another operator's bookings".to_string(),
        ));
    }

    let bookings = state.bookings.list_by_operator(operator_id).await?;
    Ok(Json(bookings))
}
