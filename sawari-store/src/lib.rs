pub mod app_config;
pub mod booking_repo;
pub mod bus_repo;
pub mod database;
pub mod trip_repo;
pub mod user_repo;

pub use booking_repo::PgBookingRepository;
pub use bus_repo::PgBusRepository;
pub use database::DbClient;
pub use trip_repo::PgTripRepository;
pub use user_repo::PgUserRepository;

use sawari_core::RepositoryError;

/// A persisted value that no longer parses into its domain type.
#[derive(Debug, thiserror::Error)]
#[error("corrupt row: {0}")]
pub(crate) struct CorruptRow(pub String);

pub(crate) fn corrupt(what: &str, value: &str) -> RepositoryError {
    RepositoryError::Storage(Box::new(CorruptRow(format!("{what}: {value}"))))
}

/// Map a sqlx error onto the shared repository error, turning unique
/// violations into conflicts with the given message.
pub(crate) fn map_unique(err: sqlx::Error, conflict_message: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return RepositoryError::Conflict(conflict_message.to_string());
        }
    }
    RepositoryError::storage(err)
}
