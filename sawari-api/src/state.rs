use std::sync::Arc;

use sawari_booking::BookingRepository;
use sawari_catalog::{BusRepository, TripRepository};
use sawari_core::UserRepository;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Handler dependencies. Handlers only see the repository traits; the
/// Postgres implementations are wired up in `main`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub buses: Arc<dyn BusRepository>,
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub auth: AuthConfig,
}
