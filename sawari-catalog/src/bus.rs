use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::{Deck, SeatClass};
use crate::CatalogError;

/// The closed set of supported bus layouts. Seat counts per deck are implied
/// by the variant and never supplied by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusConfig {
    AllSeaterOnly,
    SleeperUpperSeaterLower,
    SleeperUpperSleeperLower,
}

/// One deck's share of a configuration: which class it carries and how many
/// seats it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckPlan {
    pub deck: Deck,
    pub class: SeatClass,
    pub seats: u32,
}

impl BusConfig {
    /// Deck plans in generation order: upper first, then lower.
    pub fn deck_plans(&self) -> Vec<DeckPlan> {
        match self {
            BusConfig::AllSeaterOnly => vec![DeckPlan {
                deck: Deck::Lower,
                class: SeatClass::Seater,
                seats: 28,
            }],
            BusConfig::SleeperUpperSeaterLower => vec![
                DeckPlan {
                    deck: Deck::Upper,
                    class: SeatClass::Sleeper,
                    seats: 14,
                },
                DeckPlan {
                    deck: Deck::Lower,
                    class: SeatClass::Seater,
                    seats: 28,
                },
            ],
            BusConfig::SleeperUpperSleeperLower => vec![
                DeckPlan {
                    deck: Deck::Upper,
                    class: SeatClass::Sleeper,
                    seats: 14,
                },
                DeckPlan {
                    deck: Deck::Lower,
                    class: SeatClass::Sleeper,
                    seats: 14,
                },
            ],
        }
    }

    pub fn total_seats(&self) -> u32 {
        self.deck_plans().iter().map(|plan| plan.seats).sum()
    }

    pub fn has_class(&self, class: SeatClass) -> bool {
        self.deck_plans().iter().any(|plan| plan.class == class)
    }

    /// Integrity check for a persisted seat list against this configuration.
    pub fn check_seat_count(&self, actual: usize) -> Result<(), CatalogError> {
        let expected = self.total_seats();
        if actual as u32 != expected {
            return Err(CatalogError::SeatCountMismatch {
                expected,
                actual: actual as u32,
            });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusConfig::AllSeaterOnly => "all_seater_only",
            BusConfig::SleeperUpperSeaterLower => "sleeper_upper_seater_lower",
            BusConfig::SleeperUpperSleeperLower => "sleeper_upper_sleeper_lower",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        match value {
            "all_seater_only" => Ok(BusConfig::AllSeaterOnly),
            "sleeper_upper_seater_lower" => Ok(BusConfig::SleeperUpperSeaterLower),
            "sleeper_upper_sleeper_lower" => Ok(BusConfig::SleeperUpperSleeperLower),
            other => Err(CatalogError::UnknownConfig(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcType {
    Ac,
    NonAc,
}

impl AcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcType::Ac => "AC",
            AcType::NonAc => "NON_AC",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AC" => Some(AcType::Ac),
            "NON_AC" => Some(AcType::NonAc),
            _ => None,
        }
    }
}

/// Per-class base prices validated against a configuration. Construction is
/// the validation step: every class the configuration carries must have a
/// positive price. The layout generator takes this as an already-checked
/// witness and never re-validates.
#[derive(Debug, Clone, Copy)]
pub struct ClassPrices {
    seater: i32,
    sleeper: i32,
}

impl ClassPrices {
    pub fn for_config(
        config: BusConfig,
        seater: Option<i32>,
        sleeper: Option<i32>,
    ) -> Result<Self, CatalogError> {
        let mut prices = ClassPrices {
            seater: 0,
            sleeper: 0,
        };

        for class in [SeatClass::Seater, SeatClass::Sleeper] {
            if !config.has_class(class) {
                continue;
            }
            let supplied = match class {
                SeatClass::Seater => seater,
                SeatClass::Sleeper => sleeper,
            };
            match supplied {
                None => return Err(CatalogError::MissingPrice(class)),
                Some(price) if price <= 0 => return Err(CatalogError::InvalidPrice(class)),
                Some(price) => match class {
                    SeatClass::Seater => prices.seater = price,
                    SeatClass::Sleeper => prices.sleeper = price,
                },
            }
        }

        Ok(prices)
    }

    pub fn price_of(&self, class: SeatClass) -> i32 {
        match class {
            SeatClass::Seater => self.seater,
            SeatClass::Sleeper => self.sleeper,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bus {
    pub id: Uuid,
    pub operator_id: Uuid,
    pub name: String,
    pub number_plate: String,
    pub route_from: String,
    pub route_to: String,
    pub config: BusConfig,
    pub ac_type: AcType,
    pub price_seater: Option<i32>,
    pub price_sleeper: Option<i32>,
    pub seat_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new bus. Prices arrive raw and are validated into
/// `ClassPrices` before the seat chart is generated.
#[derive(Debug, Clone)]
pub struct NewBus {
    pub operator_id: Uuid,
    pub name: String,
    pub number_plate: String,
    pub route_from: String,
    pub route_to: String,
    pub config: BusConfig,
    pub ac_type: AcType,
    pub price_seater: Option<i32>,
    pub price_sleeper: Option<i32>,
}

/// Mutable subset of a bus. Configuration and prices are fixed once the seat
/// chart exists.
#[derive(Debug, Clone)]
pub struct BusUpdate {
    pub name: String,
    pub number_plate: String,
    pub route_from: String,
    pub route_to: String,
    pub ac_type: AcType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_totals() {
        assert_eq!(BusConfig::AllSeaterOnly.total_seats(), 28);
        assert_eq!(BusConfig::SleeperUpperSeaterLower.total_seats(), 42);
        assert_eq!(BusConfig::SleeperUpperSleeperLower.total_seats(), 28);
    }

    #[test]
    fn test_config_round_trip() {
        for config in [
            BusConfig::AllSeaterOnly,
            BusConfig::SleeperUpperSeaterLower,
            BusConfig::SleeperUpperSleeperLower,
        ] {
            assert_eq!(BusConfig::parse(config.as_str()).unwrap(), config);
        }
        assert!(BusConfig::parse("double_decker").is_err());
    }

    #[test]
    fn test_prices_validated_per_config() {
        // Seater-only bus needs no sleeper price.
        let prices = ClassPrices::for_config(BusConfig::AllSeaterOnly, Some(500), None).unwrap();
        assert_eq!(prices.price_of(SeatClass::Seater), 500);

        // Mixed bus needs both.
        let err = ClassPrices::for_config(BusConfig::SleeperUpperSeaterLower, Some(500), None);
        assert!(matches!(err, Err(CatalogError::MissingPrice(SeatClass::Sleeper))));

        // Non-positive prices rejected.
        let err = ClassPrices::for_config(BusConfig::AllSeaterOnly, Some(0), None);
        assert!(matches!(err, Err(CatalogError::InvalidPrice(SeatClass::Seater))));
    }

    #[test]
    fn test_seat_count_check() {
        assert!(BusConfig::AllSeaterOnly.check_seat_count(28).is_ok());
        let err = BusConfig::AllSeaterOnly.check_seat_count(27);
        assert!(matches!(
            err,
            Err(CatalogError::SeatCountMismatch {
                expected: 28,
                actual: 27
            })
        ));
    }
}
