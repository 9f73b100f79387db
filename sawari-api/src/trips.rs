use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sawari_catalog::{Bus, DayOfWeek, NewRecurringTrip, RecurringTrip, TripUpdate};

use crate::error::AppError;
use crate::middleware::auth::{operator_auth_middleware, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub bus_id: Uuid,
    pub departure_time: String,
    pub arrival_time: String,
    pub days_of_week: Vec<DayOfWeek>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTripRequest {
    pub departure_time: String,
    pub arrival_time: String,
    pub days_of_week: Vec<DayOfWeek>,
}

#[derive(Debug, Deserialize)]
pub struct ListTripsQuery {
    pub operator_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
    #[serde(flatten)]
    pub trip: RecurringTrip,
    pub bus: Bus,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/recurring-trips", post(create_trip))
        .route("/api/recurring-trips/{id}", put(update_trip).delete(delete_trip))
        .layer(middleware::from_fn_with_state(
            state,
            operator_auth_middleware,
        ));

    Router::new()
        .route("/api/recurring-trips", get(list_trips))
        .merge(protected)
}

/// Accepts "21:30" as well as "21:30:00".
fn parse_time_of_day(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| AppError::ValidationError(format!("{field} must be HH:MM")))
}

fn validate_days(days: &[DayOfWeek]) -> Result<Vec<DayOfWeek>, AppError> {
    if days.is_empty() {
        return Err(AppError::ValidationError(
            "at least one operating day is required".to_string(),
        ));
    }

    let mut seen = Vec::new();
    for day in days {
        if !seen.contains(day) {
            seen.push(*day);
        }
    }
    Ok(seen)
}

/// POST /api/recurring-trips
/// One recurring trip per bus; a second one is a conflict.
async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTripRequest>,
) -> Result<(axum::http::StatusCode, Json<RecurringTrip>), AppError> {
    let operator_id = claims
        .user_id()
        .ok_or_else(|| AppError::AuthenticationError("not authorized".to_string()))?;

    let bus = state
        .buses
        .find_bus(req.bus_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("bus not found".to_string()))?;

    if bus.operator_id != operator_id {
        return Err(AppError::AuthorizationError(
            "bus belongs to another operator".to_string(),
        ));
    }

    let trip = state
        .trips
        .create_trip(NewRecurringTrip {
            bus_id: req.bus_id,
            operator_id,
            departure_time: parse_time_of_day(&req.departure_time, "departure time")?,
            arrival_time: parse_time_of_day(&req.arrival_time, "arrival time")?,
            days_of_week: validate_days(&req.days_of_week)?,
        })
        .await?;

    tracing::info!(trip_id = %trip.id, bus_id = %trip.bus_id, "recurring trip created");

    Ok((axum::http::StatusCode::CREATED, Json(trip)))
}

/// GET /api/recurring-trips?operator_id=
async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<ListTripsQuery>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let trips = state.trips.list_by_operator(query.operator_id).await?;

    let mut responses = Vec::with_capacity(trips.len());
    for trip in trips {
        let bus = state
            .buses
            .find_bus(trip.bus_id)
            .await?
            .ok_or_else(|| AppError::IntegrityError(format!("trip {} references a missing bus", trip.id)))?;
        responses.push(TripResponse { trip, bus });
    }

    Ok(Json(responses))
}

/// PUT /api/recurring-trips/:id
async fn update_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTripRequest>,
) -> Result<Json<RecurringTrip>, AppError> {
    let trip = state
        .trips
        .find_trip(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("recurring trip not found".to_string()))?;

    if claims.user_id() != Some(trip.operator_id) {
        return Err(AppError::AuthorizationError(
            "trip belongs to another operator".to_string(),
        ));
    }

    let updated = state
        .trips
        .update_trip(
            id,
            TripUpdate {
                departure_time: parse_time_of_day(&req.departure_time, "departure time")?,
                arrival_time: parse_time_of_day(&req.arrival_time, "arrival time")?,
                days_of_week: validate_days(&req.days_of_week)?,
            },
        )
        .await?;

    Ok(Json(updated))
}

/// DELETE /api/recurring-trips/:id
async fn delete_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    let trip = state
        .trips
        .find_trip(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("recurring trip not found".to_string()))?;

    if claims.user_id() != Some(trip.operator_id) {
        return Err(AppError::AuthorizationError(
            "trip belongs to another operator".to_string(),
        ));
    }

    state.trips.delete_trip(id).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("21:30", "departure time").unwrap(),
            NaiveTime::from_hms_opt(21, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("06:00:00", "arrival time").unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap()
        );
        assert!(parse_time_of_day("9.30pm", "departure time").is_err());
    }

    #[test]
    fn test_validate_days_dedupes_and_rejects_empty() {
        assert!(validate_days(&[]).is_err());

        let days = validate_days(&[DayOfWeek::Mon, DayOfWeek::Fri, DayOfWeek::Mon]).unwrap();
        assert_eq!(days, vec![DayOfWeek::Mon, DayOfWeek::Fri]);
    }
}
