use chrono::{DateTime, NaiveDate, Utc};
use sawari_catalog::Seat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle. Canceling releases the date-scoped seat rows; the
/// booking record itself is kept.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "confirmed" => Some(BookingStatus::Confirmed),
            "canceled" => Some(BookingStatus::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub user_id: Option<Uuid>,
    pub travel_date: NaiveDate,
    pub status: BookingStatus,
    pub total_price: i32,
    pub created_at: DateTime<Utc>,
}

/// One traveler per booked seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub name: String,
    pub gender: Gender,
    pub age: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPassenger {
    pub name: String,
    pub gender: Gender,
    pub age: i32,
}

/// Date-scoped join row linking a booking to a seat for one travel day.
/// The `(seat_id, travel_date)` pair is unique among live bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookedSeat {
    pub booking_id: Uuid,
    pub seat_id: Uuid,
    pub travel_date: NaiveDate,
}

/// Admission input: the requested party. The total price is computed from
/// the seat chart during admission, never taken from the client.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub bus_id: Uuid,
    pub user_id: Option<Uuid>,
    pub travel_date: NaiveDate,
    pub seat_ids: Vec<Uuid>,
    pub passengers: Vec<NewPassenger>,
}

/// A booking joined with its passengers and seat templates, shaped for
/// listing and confirmation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    pub booking: Booking,
    pub seats: Vec<Seat>,
    pub passengers: Vec<Passenger>,
}
