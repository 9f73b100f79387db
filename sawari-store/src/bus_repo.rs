use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sawari_catalog::{
    AcType, Bus, BusConfig, BusRepository, BusUpdate, Deck, NewBus, Seat, SeatBlueprint,
    SeatClass, SeatPosition, Side,
};
use sawari_core::RepositoryError;

use crate::{corrupt, map_unique};

pub struct PgBusRepository {
    pool: PgPool,
}

impl PgBusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BusRow {
    id: Uuid,
    operator_id: Uuid,
    name: String,
    number_plate: String,
    route_from: String,
    route_to: String,
    config: String,
    ac_type: String,
    price_seater: Option<i32>,
    price_sleeper: Option<i32>,
    seat_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BusRow {
    fn into_bus(self) -> Result<Bus, RepositoryError> {
        let config = BusConfig::parse(&self.config)
            .map_err(|_| corrupt("bus configuration", &self.config))?;
        let ac_type = AcType::parse(&self.ac_type).ok_or_else(|| corrupt("ac type", &self.ac_type))?;

        Ok(Bus {
            id: self.id,
            operator_id: self.operator_id,
            name: self.name,
            number_plate: self.number_plate,
            route_from: self.route_from,
            route_to: self.route_to,
            config,
            ac_type,
            price_seater: self.price_seater,
            price_sleeper: self.price_sleeper,
            seat_count: self.seat_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    id: Uuid,
    bus_id: Uuid,
    label: String,
    class: String,
    deck: String,
    seat_row: i32,
    side: String,
    slot: i32,
    price: i32,
}

impl SeatRow {
    fn into_seat(self) -> Result<Seat, RepositoryError> {
        let class = SeatClass::parse(&self.class).ok_or_else(|| corrupt("seat class", &self.class))?;
        let deck = Deck::parse(&self.deck).ok_or_else(|| corrupt("seat deck", &self.deck))?;
        let side = Side::parse(&self.side).ok_or_else(|| corrupt("seat side", &self.side))?;

        Ok(Seat {
            id: self.id,
            bus_id: self.bus_id,
            label: self.label,
            class,
            deck,
            position: SeatPosition {
                row: self.seat_row as u32,
                side,
                slot: self.slot as u32,
            },
            price: self.price,
        })
    }
}

#[async_trait]
impl BusRepository for PgBusRepository {
    async fn create_bus_with_seats(
        &self,
        bus: NewBus,
        seats: Vec<SeatBlueprint>,
    ) -> Result<Bus, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::storage)?;

        let now = Utc::now();
        let row: BusRow = sqlx::query_as(
            "
            INSERT INTO buses (
                id, operator_id, name, number_plate, route_from, route_to,
                config, ac_type, price_seater, price_sleeper, seat_count,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *;
            ",
        )
        .bind(Uuid::new_v4())
        .bind(bus.operator_id)
        .bind(&bus.name)
        .bind(&bus.number_plate)
        .bind(&bus.route_from)
        .bind(&bus.route_to)
        .bind(bus.config.as_str())
        .bind(bus.ac_type.as_str())
        .bind(bus.price_seater)
        .bind(bus.price_sleeper)
        .bind(seats.len() as i32)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| map_unique(err, "bus with this number plate already exists"))?;

        // The chart is written with the bus row: a bus never exists without
        // its full seat set.
        for seat in &seats {
            sqlx::query(
                "
                INSERT INTO seats (id, bus_id, label, class, deck, seat_row, side, slot, price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
                ",
            )
            .bind(Uuid::new_v4())
            .bind(row.id)
            .bind(&seat.label)
            .bind(seat.class.as_str())
            .bind(seat.deck.as_str())
            .bind(seat.position.row as i32)
            .bind(seat.position.side.as_str())
            .bind(seat.position.slot as i32)
            .bind(seat.price)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::storage)?;
        }

        tx.commit().await.map_err(RepositoryError::storage)?;

        row.into_bus()
    }

    async fn list_buses(&self, operator_id: Option<Uuid>) -> Result<Vec<Bus>, RepositoryError> {
        let rows: Vec<BusRow> = match operator_id {
            Some(operator_id) => {
                sqlx::query_as("SELECT * FROM buses WHERE operator_id = $1 ORDER BY created_at;")
                    .bind(operator_id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as("SELECT * FROM buses ORDER BY created_at;")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(RepositoryError::storage)?;

        rows.into_iter().map(BusRow::into_bus).collect()
    }

    async fn find_bus(&self, id: Uuid) -> Result<Option<Bus>, RepositoryError> {
        let row: Option<BusRow> = sqlx::query_as("SELECT * FROM buses WHERE id = $1;")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::storage)?;

        row.map(BusRow::into_bus).transpose()
    }

    async fn search_by_route(&self, from: &str, to: &str) -> Result<Vec<Bus>, RepositoryError> {
        let rows: Vec<BusRow> = sqlx::query_as(
            "
            SELECT * FROM buses
            WHERE LOWER(route_from) = LOWER($1) AND LOWER(route_to) = LOWER($2)
            ORDER BY created_at;
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        rows.into_iter().map(BusRow::into_bus).collect()
    }

    async fn update_bus(&self, id: Uuid, update: BusUpdate) -> Result<Bus, RepositoryError> {
        let row: Option<BusRow> = sqlx::query_as(
            "
            UPDATE buses
            SET name = $1, number_plate = $2, route_from = $3, route_to = $4,
                ac_type = $5, updated_at = $6
            WHERE id = $7
            RETURNING *;
            ",
        )
        .bind(&update.name)
        .bind(&update.number_plate)
        .bind(&update.route_from)
        .bind(&update.route_to)
        .bind(update.ac_type.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_unique(err, "bus with this number plate already exists"))?;

        row.ok_or_else(|| RepositoryError::NotFound(format!("bus {id}")))?
            .into_bus()
    }

    async fn delete_bus(&self, id: Uuid) -> Result<(), RepositoryError> {
        let trips: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM recurring_trips WHERE bus_id = $1;")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(RepositoryError::storage)?;

        if trips.0 > 0 {
            return Err(RepositoryError::Conflict(
                "bus has a recurring trip; delete the trip first".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM buses WHERE id = $1;")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(db_err) = &err {
                    if db_err.code().as_deref() == Some("23503") {
                        return RepositoryError::Conflict(
                            "bus has bookings and cannot be deleted".to_string(),
                        );
                    }
                }
                RepositoryError::storage(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("bus {id}")));
        }
        Ok(())
    }

    async fn list_seats(&self, bus_id: Uuid) -> Result<Vec<Seat>, RepositoryError> {
        let rows: Vec<SeatRow> = sqlx::query_as(
            "
            SELECT * FROM seats
            WHERE bus_id = $1
            ORDER BY deck DESC, seat_row, side, slot;
            ",
        )
        .bind(bus_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        rows.into_iter().map(SeatRow::into_seat).collect()
    }
}
