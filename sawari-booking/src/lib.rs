pub mod admission;
pub mod availability;
pub mod models;
pub mod repository;

pub use admission::{admit, Admission};
pub use availability::{day_window, resolve, BusAvailability, SeatAvailability, SeatStatus};
pub use models::{
    BookedSeat, Booking, BookingDetails, BookingStatus, Gender, NewBooking, NewPassenger,
    Passenger,
};
pub use repository::BookingRepository;

use chrono::NaiveDate;
use sawari_core::RepositoryError;
use uuid::Uuid;

/// Booking-domain errors. `SeatsUnavailable` is the recoverable race-loss
/// outcome: the caller re-fetches availability and retries.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("no seats requested")]
    NoSeatsRequested,

    #[error("duplicate seats in request")]
    DuplicateSeats,

    #[error("passenger count {passengers} does not match seat count {seats}")]
    PassengerCountMismatch { seats: usize, passengers: usize },

    #[error("seats do not belong to this bus: {0:?}")]
    UnknownSeats(Vec<Uuid>),

    #[error("seats no longer available: {seats:?}")]
    SeatsUnavailable { seats: Vec<Uuid> },

    #[error("bus does not operate on {date}")]
    NotOperating { date: NaiveDate },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
