use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use sawari_catalog::Seat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::BookedSeat;

/// Per-seat, per-date derived status. Never stored on the seat template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAvailability {
    #[serde(flatten)]
    pub seat: Seat,
    pub status: SeatStatus,
}

/// The resolved chart for one bus and one travel date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusAvailability {
    pub travel_date: NaiveDate,
    pub seats: Vec<SeatAvailability>,
    pub available_count: usize,
}

impl BusAvailability {
    pub fn available_seat_ids(&self) -> HashSet<Uuid> {
        self.seats
            .iter()
            .filter(|entry| entry.status == SeatStatus::Available)
            .map(|entry| entry.seat.id)
            .collect()
    }

    pub fn seat(&self, id: Uuid) -> Option<&SeatAvailability> {
        self.seats.iter().find(|entry| entry.seat.id == id)
    }
}

/// Half-open UTC window covering one calendar day: `[day 00:00, day+1 00:00)`.
/// Timestamp inputs are compared against this window instead of string-built
/// date arithmetic.
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + TimeDelta::days(1))
}

/// Compute per-seat status for one travel date.
///
/// Pure set membership: a seat is booked iff a live booking's seat row
/// matches it on exactly this date. Rows for other dates never affect the
/// result, and nothing is cached between calls.
pub fn resolve(date: NaiveDate, seats: Vec<Seat>, booked: &[BookedSeat]) -> BusAvailability {
    let taken: HashSet<Uuid> = booked
        .iter()
        .filter(|row| row.travel_date == date)
        .map(|row| row.seat_id)
        .collect();

    let seats: Vec<SeatAvailability> = seats
        .into_iter()
        .map(|seat| {
            let status = if taken.contains(&seat.id) {
                SeatStatus::Booked
            } else {
                SeatStatus::Available
            };
            SeatAvailability { seat, status }
        })
        .collect();

    let available_count = seats
        .iter()
        .filter(|entry| entry.status == SeatStatus::Available)
        .count();

    BusAvailability {
        travel_date: date,
        seats,
        available_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sawari_catalog::{generate_layout, BusConfig, ClassPrices};

    fn chart(bus_id: Uuid) -> Vec<Seat> {
        let config = BusConfig::AllSeaterOnly;
        let prices = ClassPrices::for_config(config, Some(500), None).unwrap();
        generate_layout(config, &prices)
            .into_iter()
            .map(|blueprint| Seat {
                id: Uuid::new_v4(),
                bus_id,
                label: blueprint.label,
                class: blueprint.class,
                deck: blueprint.deck,
                position: blueprint.position,
                price: blueprint.price,
            })
            .collect()
    }

    fn booked(seat_id: Uuid, date: NaiveDate) -> BookedSeat {
        BookedSeat {
            booking_id: Uuid::new_v4(),
            seat_id,
            travel_date: date,
        }
    }

    #[test]
    fn test_no_bookings_all_available() {
        let seats = chart(Uuid::new_v4());
        let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();

        let availability = resolve(date, seats, &[]);

        assert_eq!(availability.available_count, 28);
        assert!(availability
            .seats
            .iter()
            .all(|entry| entry.status == SeatStatus::Available));
    }

    #[test]
    fn test_date_scoping() {
        let seats = chart(Uuid::new_v4());
        let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2025, 5, 11).unwrap();

        // Three seats booked today, one booked tomorrow.
        let rows = vec![
            booked(seats[0].id, today),
            booked(seats[1].id, today),
            booked(seats[2].id, today),
            booked(seats[3].id, tomorrow),
        ];

        let availability = resolve(today, seats.clone(), &rows);

        assert_eq!(availability.available_count, 25);
        assert_eq!(availability.seat(seats[0].id).unwrap().status, SeatStatus::Booked);
        assert_eq!(availability.seat(seats[1].id).unwrap().status, SeatStatus::Booked);
        assert_eq!(availability.seat(seats[2].id).unwrap().status, SeatStatus::Booked);

        // The other-date row must not leak into today's status.
        assert_eq!(
            availability.seat(seats[3].id).unwrap().status,
            SeatStatus::Available
        );
    }

    #[test]
    fn test_cancellation_returns_seats() {
        let seats = chart(Uuid::new_v4());
        let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let rows = vec![booked(seats[0].id, date), booked(seats[1].id, date)];

        let before = resolve(date, seats.clone(), &rows);
        assert_eq!(before.available_count, 26);

        // Cancellation deletes the booking's seat rows; the chart itself is
        // untouched.
        let after = resolve(date, seats.clone(), &[]);
        assert_eq!(after.available_count, 28);
        assert_eq!(after.seats.len(), seats.len());
    }

    #[test]
    fn test_day_window_is_half_open() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let (start, end) = day_window(date);

        assert_eq!(start.to_rfc3339(), "2025-05-10T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-05-11T00:00:00+00:00");
        assert!(start < end);
    }
}
