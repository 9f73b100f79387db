use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use sawari_booking::{
    admit, resolve, BookedSeat, Booking, BookingDetails, BookingError, BookingRepository,
    BookingStatus, Gender, NewBooking, Passenger,
};
use sawari_catalog::{Deck, Seat, SeatClass, SeatPosition, Side};
use sawari_core::RepositoryError;

use crate::corrupt;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    bus_id: Uuid,
    user_id: Option<Uuid>,
    travel_date: NaiveDate,
    status: String,
    total_price: i32,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, RepositoryError> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| corrupt("booking status", &self.status))?;
        Ok(Booking {
            id: self.id,
            bus_id: self.bus_id,
            user_id: self.user_id,
            travel_date: self.travel_date,
            status,
            total_price: self.total_price,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: Uuid,
    booking_id: Uuid,
    name: String,
    gender: String,
    age: i32,
}

impl PassengerRow {
    fn into_passenger(self) -> Result<Passenger, RepositoryError> {
        let gender =
            Gender::parse(&self.gender).ok_or_else(|| corrupt("passenger gender", &self.gender))?;
        Ok(Passenger {
            id: self.id,
            booking_id: self.booking_id,
            name: self.name,
            gender,
            age: self.age,
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

#[derive(sqlx::FromRow)]
struct BookedSeatRow {
    booking_id: Uuid,
    seat_id: Uuid,
    travel_date: NaiveDate,
}

impl From<BookedSeatRow> for BookedSeat {
    fn from(row: BookedSeatRow) -> Self {
        BookedSeat {
            booking_id: row.booking_id,
            seat_id: row.seat_id,
            travel_date: row.travel_date,
        }
    }
}

/// A serialization failure (40001) or a unique violation on
/// `booked_seats (seat_id, travel_date)` (23505) means a concurrent booking
/// committed first; both collapse to the recoverable race-loss outcome.
fn map_commit_race(err: sqlx::Error, seats: &[Uuid]) -> BookingError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(db_err.code().as_deref(), Some("40001") | Some("23505")) {
            return BookingError::SeatsUnavailable {
                seats: seats.to_vec(),
            };
        }
    }
    BookingError::Repository(RepositoryError::storage(err))
}

impl PgBookingRepository {
    async fn booking_details(&self, booking: Booking) -> Result<BookingDetails, BookingError> {
        let seat_rows: Vec<SeatRow> = sqlx::query_as(
            "
            SELECT s.* FROM seats s
            JOIN booking_seats bs ON bs.seat_id = s.id
            WHERE bs.booking_id = $1
            ORDER BY s.deck DESC, s.seat_row, s.side, s.slot;
            ",
        )
        .bind(booking.id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        let passenger_rows: Vec<PassengerRow> =
            sqlx::query_as("SELECT * FROM passengers WHERE booking_id = $1;")
                .bind(booking.id)
                .fetch_all(&self.pool)
                .await
                .map_err(RepositoryError::storage)?;

        let seats = seat_rows
            .into_iter()
            .map(SeatRow::into_seat)
            .collect::<Result<Vec<_>, _>>()?;
        let passengers = passenger_rows
            .into_iter()
            .map(PassengerRow::into_passenger)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BookingDetails {
            booking,
            seats,
            passengers,
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(&self, booking: NewBooking) -> Result<BookingDetails, BookingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(RepositoryError::storage)?;

        // The availability read and the seat writes must form one atomic
        // unit; of two transactions racing for overlapping seats, the second
        // serializes behind the first and fails its re-check.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE;")
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::storage)?;

        let seat_rows: Vec<SeatRow> =
            sqlx::query_as("SELECT * FROM seats WHERE bus_id = $1 ORDER BY deck DESC, seat_row, side, slot;")
                .bind(booking.bus_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(RepositoryError::storage)?;

        if seat_rows.is_empty() {
            return Err(
                RepositoryError::NotFound(format!("bus {}", booking.bus_id)).into(),
            );
        }

        let seats = seat_rows
            .into_iter()
            .map(SeatRow::into_seat)
            .collect::<Result<Vec<_>, _>>()?;

        let booked_rows: Vec<BookedSeatRow> = sqlx::query_as(
            "
            SELECT bs.* FROM booked_seats bs
            JOIN bookings b ON b.id = bs.booking_id
            JOIN seats s ON s.id = bs.seat_id
            WHERE s.bus_id = $1 AND bs.travel_date = $2 AND b.status = 'confirmed';
            ",
        )
        .bind(booking.bus_id)
        .bind(booking.travel_date)
        .fetch_all(&mut *tx)
        .await
        .map_err(RepositoryError::storage)?;

        let booked: Vec<BookedSeat> = booked_rows.into_iter().map(Into::into).collect();

        // In-transaction re-check against freshly read state.
        let availability = resolve(booking.travel_date, seats, &booked);
        let admission = admit(&booking.seat_ids, booking.passengers.len(), &availability)?;

        let booking_id = Uuid::new_v4();
        let now = Utc::now();

        let booking_row: BookingRow = sqlx::query_as(
            "
            INSERT INTO bookings (id, bus_id, user_id, travel_date, status, total_price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
            ",
        )
        .bind(booking_id)
        .bind(booking.bus_id)
        .bind(booking.user_id)
        .bind(booking.travel_date)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(admission.total_price)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::storage)?;

        let mut passengers = Vec::with_capacity(booking.passengers.len());
        for passenger in &booking.passengers {
            let row: PassengerRow = sqlx::query_as(
                "
                INSERT INTO passengers (id, booking_id, name, gender, age)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *;
                ",
            )
            .bind(Uuid::new_v4())
            .bind(booking_id)
            .bind(&passenger.name)
            .bind(passenger.gender.as_str())
            .bind(passenger.age)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::storage)?;

            passengers.push(row.into_passenger()?);
        }

        for seat_id in &admission.seat_ids {
            // Permanent record of the booked seats.
            sqlx::query("INSERT INTO booking_seats (booking_id, seat_id) VALUES ($1, $2);")
                .bind(booking_id)
                .bind(seat_id)
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::storage)?;

            // Date-scoped occupancy row; its unique constraint is the last
            // line of defense against a double booking.
            sqlx::query(
                "INSERT INTO booked_seats (booking_id, seat_id, travel_date) VALUES ($1, $2, $3);",
            )
            .bind(booking_id)
            .bind(seat_id)
            .bind(booking.travel_date)
            .execute(&mut *tx)
            .await
            .map_err(|err| map_commit_race(err, &admission.seat_ids))?;
        }

        tx.commit()
            .await
            .map_err(|err| map_commit_race(err, &admission.seat_ids))?;

        info!(
            booking_id = %booking_id,
            bus_id = %booking.bus_id,
            seats = admission.seat_ids.len(),
            "booking confirmed"
        );

        let seats = availability
            .seats
            .into_iter()
            .map(|entry| entry.seat)
            .filter(|seat| admission.seat_ids.contains(&seat.id))
            .collect();

        Ok(BookingDetails {
            booking: booking_row.into_booking()?,
            seats,
            passengers,
        })
    }

    async fn cancel_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(RepositoryError::storage)?;

        let row: Option<BookingRow> = sqlx::query_as(
            "
            UPDATE bookings SET status = $1 WHERE id = $2
            RETURNING *;
            ",
        )
        .bind(BookingStatus::Canceled.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::storage)?;

        let booking = row
            .ok_or_else(|| RepositoryError::NotFound(format!("booking {id}")))?
            .into_booking()?;

        // Releasing the date-scoped rows is what returns the seats to
        // available; passengers and seat templates stay.
        let released = sqlx::query("DELETE FROM booked_seats WHERE booking_id = $1;")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::storage)?;

        tx.commit().await.map_err(RepositoryError::storage)?;

        info!(
            booking_id = %id,
            released = released.rows_affected(),
            "booking canceled"
        );

        Ok(booking)
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<BookingDetails>, BookingError> {
        let row: Option<BookingRow> = sqlx::query_as("SELECT * FROM bookings WHERE id = $1;")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::storage)?;

        match row {
            Some(row) => Ok(Some(self.booking_details(row.into_booking()?).await?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<BookingDetails>, BookingError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC;",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            details.push(self.booking_details(row.into_booking()?).await?);
        }
        Ok(details)
    }

    async fn list_by_operator(
        &self,
        operator_id: Uuid,
    ) -> Result<Vec<BookingDetails>, BookingError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            "
            SELECT b.* FROM bookings b
            JOIN buses bus ON bus.id = b.bus_id
            WHERE bus.operator_id = $1
            ORDER BY b.created_at DESC;
            ",
        )
        .bind(operator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            details.push(self.booking_details(row.into_booking()?).await?);
        }
        Ok(details)
    }

    async fn booked_seats_on(
        &self,
        bus_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookedSeat>, BookingError> {
        let rows: Vec<BookedSeatRow> = sqlx::query_as(
            "
            SELECT bs.* FROM booked_seats bs
            JOIN bookings b ON b.id = bs.booking_id
            JOIN seats s ON s.id = bs.seat_id
            WHERE s.bus_id = $1 AND bs.travel_date = $2 AND b.status = 'confirmed';
            ",
        )
        .bind(bus_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
