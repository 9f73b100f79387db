pub mod bus;
pub mod layout;
pub mod repository;
pub mod trip;

pub use bus::{AcType, Bus, BusConfig, BusUpdate, ClassPrices, DeckPlan, NewBus};
pub use layout::{generate_layout, Deck, Seat, SeatBlueprint, SeatClass, SeatPosition, Side};
pub use repository::{BusRepository, TripRepository};
pub use trip::{DayOfWeek, NewRecurringTrip, RecurringTrip, TripUpdate};

/// Catalog-level validation and integrity errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown bus configuration: {0}")]
    UnknownConfig(String),

    #[error("missing {0} price for this configuration")]
    MissingPrice(SeatClass),

    #[error("{0} price must be positive")]
    InvalidPrice(SeatClass),

    #[error("seat count mismatch: configuration implies {expected}, found {actual}")]
    SeatCountMismatch { expected: u32, actual: u32 },
}
