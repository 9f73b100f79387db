use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bus::{BusConfig, ClassPrices, DeckPlan};

/// Physical seating level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Deck {
    Upper,
    Lower,
}

impl Deck {
    /// Label prefix for seats on this deck ("U3", "L7").
    pub fn prefix(&self) -> &'static str {
        match self {
            Deck::Upper => "U",
            Deck::Lower => "L",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Deck::Upper => "upper",
            Deck::Lower => "lower",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "upper" => Some(Deck::Upper),
            "lower" => Some(Deck::Lower),
            _ => None,
        }
    }
}

/// Seat category, which determines both the deck's row shape and the price
/// copied onto each seat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeatClass {
    Seater,
    Sleeper,
}

impl SeatClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatClass::Seater => "seater",
            SeatClass::Sleeper => "sleeper",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "seater" => Some(SeatClass::Seater),
            "sleeper" => Some(SeatClass::Sleeper),
            _ => None,
        }
    }
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the aisle a seat sits on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

/// Grid position within a deck: 1-based row, side of the aisle, and the
/// 0-based slot within that side's column group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatPosition {
    pub row: u32,
    pub side: Side,
    pub slot: u32,
}

/// Generator output: one seat of the canonical chart, ready to be persisted
/// as a seat row or rendered as a grid cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatBlueprint {
    pub label: String,
    pub class: SeatClass,
    pub deck: Deck,
    pub position: SeatPosition,
    pub price: i32,
}

/// A persisted seat. Availability is derived per travel date and is not a
/// field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub label: String,
    pub class: SeatClass,
    pub deck: Deck,
    pub position: SeatPosition,
    pub price: i32,
}

/// Seater decks hold rows of four: two seats left of the aisle, two right.
const SEATER_ROW_WIDTH: u32 = 4;

/// Sleeper decks hold three berths per row (one left, two right) for rows
/// 1-4, and row 5 holds only the two right berths.
const SLEEPER_ROW_WIDTH: u32 = 3;
const SLEEPER_FULL_ROWS: u32 = 4;

/// Produce the canonical ordered seat chart for a configuration.
///
/// Deterministic and idempotent: the same configuration always yields the
/// same labels in the same order. Labels use one incrementing counter per
/// deck ("U1".., "L1..") in row-major order; left/right assignment is
/// positional within the row.
pub fn generate_layout(config: BusConfig, prices: &ClassPrices) -> Vec<SeatBlueprint> {
    let mut seats = Vec::with_capacity(config.total_seats() as usize);

    for plan in config.deck_plans() {
        lay_out_deck(&plan, prices.price_of(plan.class), &mut seats);
    }

    seats
}

fn lay_out_deck(plan: &DeckPlan, price: i32, out: &mut Vec<SeatBlueprint>) {
    for index in 0..plan.seats {
        let position = match plan.class {
            SeatClass::Seater => seater_position(index),
            SeatClass::Sleeper => sleeper_position(index),
        };

        out.push(SeatBlueprint {
            label: format!("{}{}", plan.deck.prefix(), index + 1),
            class: plan.class,
            deck: plan.deck,
            position,
            price,
        });
    }
}

fn seater_position(index: u32) -> SeatPosition {
    let within_row = index % SEATER_ROW_WIDTH;
    let (side, slot) = if within_row < 2 {
        (Side::Left, within_row)
    } else {
        (Side::Right, within_row - 2)
    };

    SeatPosition {
        row: index / SEATER_ROW_WIDTH + 1,
        side,
        slot,
    }
}

fn sleeper_position(index: u32) -> SeatPosition {
    let full_rows_span = SLEEPER_FULL_ROWS * SLEEPER_ROW_WIDTH;

    if index < full_rows_span {
        let within_row = index % SLEEPER_ROW_WIDTH;
        let (side, slot) = if within_row == 0 {
            (Side::Left, 0)
        } else {
            (Side::Right, within_row - 1)
        };
        return SeatPosition {
            row: index / SLEEPER_ROW_WIDTH + 1,
            side,
            slot,
        };
    }

    // Past the four full rows only the last row's right pair remains.
    SeatPosition {
        row: SLEEPER_FULL_ROWS + 1,
        side: Side::Right,
        slot: index - full_rows_span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn prices(config: BusConfig, seater: Option<i32>, sleeper: Option<i32>) -> ClassPrices {
        ClassPrices::for_config(config, seater, sleeper).unwrap()
    }

    #[test]
    fn test_all_seater_chart() {
        let config = BusConfig::AllSeaterOnly;
        let seats = generate_layout(config, &prices(config, Some(500), None));

        assert_eq!(seats.len(), 28);
        assert!(seats.iter().all(|s| s.deck == Deck::Lower));
        assert!(seats.iter().all(|s| s.class == SeatClass::Seater));
        assert!(seats.iter().all(|s| s.price == 500));

        // Labels L1..L28 in order.
        let labels: Vec<&str> = seats.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels[0], "L1");
        assert_eq!(labels[27], "L28");

        // 7 rows of 2 left + 2 right.
        for row in 1..=7 {
            let row_seats: Vec<_> = seats.iter().filter(|s| s.position.row == row).collect();
            assert_eq!(row_seats.len(), 4);
            assert_eq!(
                row_seats
                    .iter()
                    .filter(|s| s.position.side == Side::Left)
                    .count(),
                2
            );
            assert_eq!(
                row_seats
                    .iter()
                    .filter(|s| s.position.side == Side::Right)
                    .count(),
                2
            );
        }

        // Row-major positional assignment: first two of each row are left.
        assert_eq!(seats[0].position.side, Side::Left);
        assert_eq!(seats[1].position.side, Side::Left);
        assert_eq!(seats[2].position.side, Side::Right);
        assert_eq!(seats[3].position.side, Side::Right);
    }

    #[test]
    fn test_sleeper_deck_shape() {
        let config = BusConfig::SleeperUpperSleeperLower;
        let seats = generate_layout(config, &prices(config, None, Some(800)));

        assert_eq!(seats.len(), 28);

        for deck in [Deck::Upper, Deck::Lower] {
            let deck_seats: Vec<_> = seats.iter().filter(|s| s.deck == deck).collect();
            assert_eq!(deck_seats.len(), 14);
            assert!(deck_seats.iter().all(|s| s.class == SeatClass::Sleeper));

            // Rows 1-4: one left berth, two right berths.
            for row in 1..=4 {
                let left = deck_seats
                    .iter()
                    .filter(|s| s.position.row == row && s.position.side == Side::Left)
                    .count();
                let right = deck_seats
                    .iter()
                    .filter(|s| s.position.row == row && s.position.side == Side::Right)
                    .count();
                assert_eq!((left, right), (1, 2), "row {row}");
            }

            // Row 5: no left berth, two right berths.
            let left = deck_seats
                .iter()
                .filter(|s| s.position.row == 5 && s.position.side == Side::Left)
                .count();
            let right = deck_seats
                .iter()
                .filter(|s| s.position.row == 5 && s.position.side == Side::Right)
                .count();
            assert_eq!((left, right), (0, 2));
        }
    }

    #[test]
    fn test_mixed_config_counts_and_prices() {
        let config = BusConfig::SleeperUpperSeaterLower;
        let seats = generate_layout(config, &prices(config, Some(500), Some(800)));

        assert_eq!(seats.len(), 42);

        let upper: Vec<_> = seats.iter().filter(|s| s.deck == Deck::Upper).collect();
        let lower: Vec<_> = seats.iter().filter(|s| s.deck == Deck::Lower).collect();
        assert_eq!(upper.len(), 14);
        assert_eq!(lower.len(), 28);

        assert!(upper
            .iter()
            .all(|s| s.class == SeatClass::Sleeper && s.price == 800));
        assert!(lower
            .iter()
            .all(|s| s.class == SeatClass::Seater && s.price == 500));

        // Independent label counters per deck.
        assert_eq!(upper[0].label, "U1");
        assert_eq!(upper[13].label, "U14");
        assert_eq!(lower[0].label, "L1");
        assert_eq!(lower[27].label, "L28");
    }

    #[test]
    fn test_labels_unique_and_generation_idempotent() {
        for config in [
            BusConfig::AllSeaterOnly,
            BusConfig::SleeperUpperSeaterLower,
            BusConfig::SleeperUpperSleeperLower,
        ] {
            let class_prices = prices(config, Some(500), Some(800));
            let first = generate_layout(config, &class_prices);
            let second = generate_layout(config, &class_prices);

            let labels: HashSet<&str> = first.iter().map(|s| s.label.as_str()).collect();
            assert_eq!(labels.len(), first.len(), "{config:?}");
            assert_eq!(first, second, "{config:?}");
        }
    }

    #[test]
    fn test_output_matches_configuration_total() {
        for config in [
            BusConfig::AllSeaterOnly,
            BusConfig::SleeperUpperSeaterLower,
            BusConfig::SleeperUpperSleeperLower,
        ] {
            let seats = generate_layout(config, &prices(config, Some(450), Some(900)));
            assert_eq!(seats.len() as u32, config.total_seats());
            assert!(config.check_seat_count(seats.len()).is_ok());
        }
    }
}
