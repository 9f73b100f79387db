use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{BookedSeat, Booking, BookingDetails, NewBooking};
use crate::BookingError;

/// Repository trait for bookings.
///
/// `create_booking` owns the check-then-commit: it re-runs the admission
/// check against re-read seat state inside one serializable transaction, so
/// of two concurrent requests for an overlapping seat set at most one
/// commits and the other surfaces `SeatsUnavailable`.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: NewBooking) -> Result<BookingDetails, BookingError>;

    /// Flips the booking to canceled and deletes its date-scoped seat rows.
    /// Passengers and seat templates are kept. Idempotent on an
    /// already-canceled booking.
    async fn cancel_booking(&self, id: Uuid) -> Result<Booking, BookingError>;

    async fn find_booking(&self, id: Uuid) -> Result<Option<BookingDetails>, BookingError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<BookingDetails>, BookingError>;

    /// Bookings across every bus owned by the operator, newest first.
    async fn list_by_operator(
        &self,
        operator_id: Uuid,
    ) -> Result<Vec<BookingDetails>, BookingError>;

    /// Live (non-canceled) seat rows for one bus and travel date; the input
    /// to the availability resolver.
    async fn booked_seats_on(
        &self,
        bus_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookedSeat>, BookingError>;
}
