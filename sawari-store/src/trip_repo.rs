use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sawari_catalog::{DayOfWeek, NewRecurringTrip, RecurringTrip, TripRepository, TripUpdate};
use sawari_core::RepositoryError;

use crate::{corrupt, map_unique};

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    bus_id: Uuid,
    operator_id: Uuid,
    departure_time: NaiveTime,
    arrival_time: NaiveTime,
    days_of_week: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TripRow {
    fn into_trip(self) -> Result<RecurringTrip, RepositoryError> {
        let days_of_week = self
            .days_of_week
            .iter()
            .map(|day| DayOfWeek::parse(day).ok_or_else(|| corrupt("weekday code", day)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecurringTrip {
            id: self.id,
            bus_id: self.bus_id,
            operator_id: self.operator_id,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            days_of_week,
            created_at: self.created_at,
        })
    }
}

fn day_codes(days: &[DayOfWeek]) -> Vec<String> {
    days.iter().map(|day| day.as_str().to_string()).collect()
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create_trip(&self, trip: NewRecurringTrip) -> Result<RecurringTrip, RepositoryError> {
        let row: TripRow = sqlx::query_as(
            "
            INSERT INTO recurring_trips (
                id, bus_id, operator_id, departure_time, arrival_time,
                days_of_week, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
            ",
        )
        .bind(Uuid::new_v4())
        .bind(trip.bus_id)
        .bind(trip.operator_id)
        .bind(trip.departure_time)
        .bind(trip.arrival_time)
        .bind(day_codes(&trip.days_of_week))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            map_unique(
                err,
                "a recurring trip already exists for this bus; only one is allowed",
            )
        })?;

        row.into_trip()
    }

    async fn find_trip(&self, id: Uuid) -> Result<Option<RecurringTrip>, RepositoryError> {
        let row: Option<TripRow> = sqlx::query_as("SELECT * FROM recurring_trips WHERE id = $1;")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::storage)?;

        row.map(TripRow::into_trip).transpose()
    }

    async fn find_by_bus(&self, bus_id: Uuid) -> Result<Option<RecurringTrip>, RepositoryError> {
        let row: Option<TripRow> =
            sqlx::query_as("SELECT * FROM recurring_trips WHERE bus_id = $1;")
                .bind(bus_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(RepositoryError::storage)?;

        row.map(TripRow::into_trip).transpose()
    }

    async fn list_by_operator(
        &self,
        operator_id: Uuid,
    ) -> Result<Vec<RecurringTrip>, RepositoryError> {
        let rows: Vec<TripRow> = sqlx::query_as(
            "SELECT * FROM recurring_trips WHERE operator_id = $1 ORDER BY created_at;",
        )
        .bind(operator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        rows.into_iter().map(TripRow::into_trip).collect()
    }

    async fn update_trip(
        &self,
        id: Uuid,
        update: TripUpdate,
    ) -> Result<RecurringTrip, RepositoryError> {
        let row: Option<TripRow> = sqlx::query_as(
            "
            UPDATE recurring_trips
            SET departure_time = $1, arrival_time = $2, days_of_week = $3
            WHERE id = $4
            RETURNING *;
            ",
        )
        .bind(update.departure_time)
        .bind(update.arrival_time)
        .bind(day_codes(&update.days_of_week))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        row.ok_or_else(|| RepositoryError::NotFound(format!("recurring trip {id}")))?
            .into_trip()
    }

    async fn delete_trip(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM recurring_trips WHERE id = $1;")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("recurring trip {id}")));
        }
        Ok(())
    }
}
