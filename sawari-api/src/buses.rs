use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sawari_catalog::{
    generate_layout, AcType, Bus, BusConfig, BusUpdate, ClassPrices, NewBus, Seat, SeatClass,
};

use crate::error::AppError;
use crate::middleware::auth::{operator_auth_middleware, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBusRequest {
    pub name: String,
    pub number_plate: String,
    pub route_from: String,
    pub route_to: String,
    pub config: BusConfig,
    pub ac_type: AcType,
    pub price_seater: Option<i32>,
    pub price_sleeper: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBusRequest {
    pub name: String,
    pub number_plate: String,
    pub route_from: String,
    pub route_to: String,
    pub ac_type: AcType,
}

#[derive(Debug, Deserialize)]
pub struct ListBusesQuery {
    pub operator_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BusWithSeats {
    #[serde(flatten)]
    pub bus: Bus,
    pub seats: Vec<Seat>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/buses", post(create_bus))
        .route("/api/buses/{id}", put(update_bus).delete(delete_bus))
        .layer(middleware::from_fn_with_state(
            state,
            operator_auth_middleware,
        ));

    Router::new()
        .route("/api/buses", get(list_buses))
        .route("/api/buses/{id}", get(get_bus))
        .merge(protected)
}

fn require_non_empty(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// POST /api/buses
/// Create a bus and persist its generated seat chart in one transaction.
async fn create_bus(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBusRequest>,
) -> Result<(axum::http::StatusCode, Json<Bus>), AppError> {
    let operator_id = claims
        .user_id()
        .ok_or_else(|| AppError::AuthenticationError("not authorized".to_string()))?;

    let name = require_non_empty(&req.name, "bus name")?;
    let number_plate = require_non_empty(&req.number_plate, "number plate")?;
    let route_from = require_non_empty(&req.route_from, "route from")?;
    let route_to = require_non_empty(&req.route_to, "route to")?;

    // Validation happens here; the generator below only ever sees a checked
    // configuration/price pair.
    let prices = ClassPrices::for_config(req.config, req.price_seater, req.price_sleeper)?;
    let seats = generate_layout(req.config, &prices);

    let bus = state
        .buses
        .create_bus_with_seats(
            NewBus {
                operator_id,
                name,
                number_plate,
                route_from,
                route_to,
                config: req.config,
                ac_type: req.ac_type,
                price_seater: req
                    .config
                    .has_class(SeatClass::Seater)
                    .then_some(prices.price_of(SeatClass::Seater)),
                price_sleeper: req
                    .config
                    .has_class(SeatClass::Sleeper)
                    .then_some(prices.price_of(SeatClass::Sleeper)),
            },
            seats,
        )
        .await?;

    tracing::info!(bus_id = %bus.id, operator_id = %operator_id, "bus created");

    Ok((axum::http::StatusCode::CREATED, Json(bus)))
}

/// GET /api/buses?operator_id=
async fn list_buses(
    State(state): State<AppState>,
    Query(query): Query<ListBusesQuery>,
) -> Result<Json<Vec<Bus>>, AppError> {
    let buses = state.buses.list_buses(query.operator_id).await?;
    Ok(Json(buses))
}

/// GET /api/buses/:id
async fn get_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BusWithSeats>, AppError> {
    let bus = state
        .buses
        .find_bus(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("bus not found".to_string()))?;

    let seats = state.buses.list_seats(id).await?;
    bus.config.check_seat_count(seats.len())?;

    Ok(Json(BusWithSeats { bus, seats }))
}

/// PUT /api/buses/:id
async fn update_bus(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBusRequest>,
) -> Result<Json<Bus>, AppError> {
    let bus = state
        .buses
        .find_bus(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("bus not found".to_string()))?;

    if claims.user_id() != Some(bus.operator_id) {
        return Err(AppError::AuthorizationError(
            "bus belongs to another operator".to_string(),
        ));
    }

    let updated = state
        .buses
        .update_bus(
            id,
            BusUpdate {
                name: require_non_empty(&req.name, "bus name")?,
                number_plate: require_non_empty(&req.number_plate, "number plate")?,
                route_from: require_non_empty(&req.route_from, "route from")?,
                route_to: require_non_empty(&req.route_to, "route to")?,
                ac_type: req.ac_type,
            },
        )
        .await?;

    Ok(Json(updated))
}

/// DELETE /api/buses/:id
/// Refused while a recurring trip references the bus.
async fn delete_bus(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    let bus = state
        .buses
        .find_bus(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("bus not found".to_string()))?;

    if claims.user_id() != Some(bus.operator_id) {
        return Err(AppError::AuthorizationError(
            "bus belongs to another operator".to_string(),
        ));
    }

    state.buses.delete_bus(id).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}
