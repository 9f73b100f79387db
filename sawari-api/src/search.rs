use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sawari_booking::{resolve, BusAvailability};
use sawari_catalog::{Bus, DayOfWeek, RecurringTrip};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub from: String,
    pub to: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct SeatChartQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub bus: Bus,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub days_of_week: Vec<DayOfWeek>,
    #[serde(flatten)]
    pub availability: BusAvailability,
}

#[derive(Debug, Serialize)]
pub struct SeatChartResponse {
    pub bus: Bus,
    #[serde(flatten)]
    pub availability: BusAvailability,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search_buses))
        .route("/api/buses/{id}/seats", get(bus_seat_chart))
}

fn parse_travel_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError("date must be YYYY-MM-DD".to_string()))
}

/// Resolve one bus's chart for a date: read the persisted seats, check them
/// against the configuration, and fold in that day's live bookings. Never
/// cached; booking state changes between queries.
async fn resolve_bus(
    state: &AppState,
    bus: &Bus,
    date: NaiveDate,
) -> Result<BusAvailability, AppError> {
    let seats = state.buses.list_seats(bus.id).await?;
    bus.config.check_seat_count(seats.len())?;

    let booked = state.bookings.booked_seats_on(bus.id, date).await?;

    Ok(resolve(date, seats, &booked))
}

/// GET /api/search?from=&to=&date=
/// Route search; buses without a trip on the date's weekday are filtered
/// out, the rest carry their resolved seat chart.
async fn search_buses(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    if query.from.trim().is_empty() || query.to.trim().is_empty() {
        return Err(AppError::ValidationError(
            "from and to are required".to_string(),
        ));
    }
    let date = parse_travel_date(&query.date)?;

    let buses = state
        .buses
        .search_by_route(query.from.trim(), query.to.trim())
        .await?;

    let mut results = Vec::new();
    for bus in buses {
        let trip: Option<RecurringTrip> = state.trips.find_by_bus(bus.id).await?;
        let Some(trip) = trip else {
            continue;
        };
        if !trip.operates_on(date) {
            continue;
        }

        let availability = resolve_bus(&state, &bus, date).await?;

        results.push(SearchResult {
            bus,
            departure_time: trip.departure_time,
            arrival_time: trip.arrival_time,
            days_of_week: trip.days_of_week,
            availability,
        });
    }

    Ok(Json(results))
}

/// GET /api/buses/:id/seats?date=
/// One bus's chart with per-seat status. A date the bus does not operate is
/// an explicit "not operating" outcome, distinct from fully booked.
async fn bus_seat_chart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SeatChartQuery>,
) -> Result<Json<SeatChartResponse>, AppError> {
    let date = match &query.date {
        Some(value) => parse_travel_date(value)?,
        None => Utc::now().date_naive(),
    };

    let bus = state
        .buses
        .find_bus(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("bus not found".to_string()))?;

    let operates = state
        .trips
        .find_by_bus(bus.id)
        .await?
        .is_some_and(|trip| trip.operates_on(date));
    if !operates {
        return Err(AppError::NotOperating(date));
    }

    let availability = resolve_bus(&state, &bus, date).await?;

    Ok(Json(SeatChartResponse { bus, availability }))
}
