use async_trait::async_trait;
use sawari_core::RepositoryError;
use uuid::Uuid;

use crate::bus::{Bus, BusUpdate, NewBus};
use crate::layout::{Seat, SeatBlueprint};
use crate::trip::{NewRecurringTrip, RecurringTrip, TripUpdate};

/// Repository trait for buses and their seat charts.
///
/// Bus creation and seat persistence are a single operation: the chart is
/// generated once from the configuration and written in the same transaction
/// as the bus row.
#[async_trait]
pub trait BusRepository: Send + Sync {
    async fn create_bus_with_seats(
        &self,
        bus: NewBus,
        seats: Vec<SeatBlueprint>,
    ) -> Result<Bus, RepositoryError>;

    async fn list_buses(&self, operator_id: Option<Uuid>) -> Result<Vec<Bus>, RepositoryError>;

    async fn find_bus(&self, id: Uuid) -> Result<Option<Bus>, RepositoryError>;

    /// Case-insensitive route-endpoint match.
    async fn search_by_route(&self, from: &str, to: &str) -> Result<Vec<Bus>, RepositoryError>;

    async fn update_bus(&self, id: Uuid, update: BusUpdate) -> Result<Bus, RepositoryError>;

    /// Fails with `Conflict` while a recurring trip references the bus;
    /// seats cascade with the bus row.
    async fn delete_bus(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// The persisted chart in generation order (deck, then label sequence).
    async fn list_seats(&self, bus_id: Uuid) -> Result<Vec<Seat>, RepositoryError>;
}

/// Repository trait for recurring-trip templates. One template per bus is an
/// invariant: creation against an already-scheduled bus yields `Conflict`.
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create_trip(&self, trip: NewRecurringTrip) -> Result<RecurringTrip, RepositoryError>;

    async fn find_trip(&self, id: Uuid) -> Result<Option<RecurringTrip>, RepositoryError>;

    async fn find_by_bus(&self, bus_id: Uuid) -> Result<Option<RecurringTrip>, RepositoryError>;

    async fn list_by_operator(
        &self,
        operator_id: Uuid,
    ) -> Result<Vec<RecurringTrip>, RepositoryError>;

    async fn update_trip(&self, id: Uuid, update: TripUpdate)
        -> Result<RecurringTrip, RepositoryError>;

    async fn delete_trip(&self, id: Uuid) -> Result<(), RepositoryError>;
}
