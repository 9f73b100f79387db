use std::collections::HashSet;

use uuid::Uuid;

use crate::availability::{BusAvailability, SeatStatus};
use crate::BookingError;

/// A validated, admissible party: the seat ids to commit and the total price
/// summed from the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub seat_ids: Vec<Uuid>,
    pub total_price: i32,
}

/// All-or-nothing admission check against a freshly-resolved chart.
///
/// Every requested seat must exist on the bus and be available for the
/// chart's travel date; any miss rejects the whole request. The caller runs
/// this twice: once against the view the client booked from, and again
/// inside the commit transaction against re-read state, so a concurrent
/// winner turns the loser into `SeatsUnavailable` rather than a double
/// booking.
pub fn admit(
    requested: &[Uuid],
    passenger_count: usize,
    availability: &BusAvailability,
) -> Result<Admission, BookingError> {
    if requested.is_empty() {
        return Err(BookingError::NoSeatsRequested);
    }

    let distinct: HashSet<Uuid> = requested.iter().copied().collect();
    if distinct.len() != requested.len() {
        return Err(BookingError::DuplicateSeats);
    }

    if passenger_count != requested.len() {
        return Err(BookingError::PassengerCountMismatch {
            seats: requested.len(),
            passengers: passenger_count,
        });
    }

    let unknown: Vec<Uuid> = requested
        .iter()
        .copied()
        .filter(|id| availability.seat(*id).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(BookingError::UnknownSeats(unknown));
    }

    let taken: Vec<Uuid> = requested
        .iter()
        .copied()
        .filter(|id| {
            availability
                .seat(*id)
                .is_some_and(|entry| entry.status == SeatStatus::Booked)
        })
        .collect();
    if !taken.is_empty() {
        return Err(BookingError::SeatsUnavailable { seats: taken });
    }

    let total_price = requested
        .iter()
        .filter_map(|id| availability.seat(*id))
        .map(|entry| entry.seat.price)
        .sum();

    Ok(Admission {
        seat_ids: requested.to_vec(),
        total_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::resolve;
    use crate::models::BookedSeat;
    use chrono::NaiveDate;
    use sawari_catalog::{generate_layout, BusConfig, ClassPrices, Seat};

    fn chart() -> Vec<Seat> {
        let config = BusConfig::AllSeaterOnly;
        let prices = ClassPrices::for_config(config, Some(500), None).unwrap();
        generate_layout(config, &prices)
            .into_iter()
            .map(|blueprint| Seat {
                id: Uuid::new_v4(),
                bus_id: Uuid::nil(),
                label: blueprint.label,
                class: blueprint.class,
                deck: blueprint.deck,
                position: blueprint.position,
                price: blueprint.price,
            })
            .collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 10).unwrap()
    }

    #[test]
    fn test_admit_available_seats() {
        let seats = chart();
        let availability = resolve(date(), seats.clone(), &[]);

        let requested = [seats[0].id, seats[1].id];
        let admission = admit(&requested, 2, &availability).unwrap();

        assert_eq!(admission.seat_ids, requested);
        assert_eq!(admission.total_price, 1000);
    }

    #[test]
    fn test_admission_is_all_or_nothing() {
        let seats = chart();
        let rows = [BookedSeat {
            booking_id: Uuid::new_v4(),
            seat_id: seats[0].id,
            travel_date: date(),
        }];
        let availability = resolve(date(), seats.clone(), &rows);

        // One taken seat rejects the whole party, including the free seat.
        let requested = [seats[0].id, seats[1].id];
        let err = admit(&requested, 2, &availability).unwrap_err();

        match err {
            BookingError::SeatsUnavailable { seats: taken } => {
                assert_eq!(taken, vec![seats[0].id]);
            }
            other => panic!("expected SeatsUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_recheck_after_concurrent_commit_rejects_loser() {
        let seats = chart();
        let stale = resolve(date(), seats.clone(), &[]);

        // Both parties admitted against the same stale view.
        let first = admit(&[seats[5].id], 1, &stale).unwrap();
        let second = admit(&[seats[5].id], 1, &stale).unwrap();
        assert_eq!(first.seat_ids, second.seat_ids);

        // First commit lands; the loser's in-transaction re-check fails.
        let committed = [BookedSeat {
            booking_id: Uuid::new_v4(),
            seat_id: seats[5].id,
            travel_date: date(),
        }];
        let refreshed = resolve(date(), seats.clone(), &committed);
        let err = admit(&second.seat_ids, 1, &refreshed).unwrap_err();
        assert!(matches!(err, BookingError::SeatsUnavailable { .. }));
    }

    #[test]
    fn test_party_validation() {
        let seats = chart();
        let availability = resolve(date(), seats.clone(), &[]);

        assert!(matches!(
            admit(&[], 0, &availability),
            Err(BookingError::NoSeatsRequested)
        ));

        assert!(matches!(
            admit(&[seats[0].id, seats[0].id], 2, &availability),
            Err(BookingError::DuplicateSeats)
        ));

        assert!(matches!(
            admit(&[seats[0].id], 3, &availability),
            Err(BookingError::PassengerCountMismatch {
                seats: 1,
                passengers: 3
            })
        ));

        let stranger = Uuid::new_v4();
        assert!(matches!(
            admit(&[stranger], 1, &availability),
            Err(BookingError::UnknownSeats(ids)) if ids == vec![stranger]
        ));
    }
}
