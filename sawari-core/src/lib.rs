pub mod identity;
pub mod repository;

pub use identity::{NewUser, OperatorKey, User, UserRole};
pub use repository::{RepositoryError, UserRepository};
