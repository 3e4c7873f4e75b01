//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in
//! subtrack-core: PostgreSQL via sqlx, plus an in-memory variant.

pub mod memory_repo;
pub mod subscription_repo;

pub use memory_repo::InMemorySubscriptionRepository;
pub use subscription_repo::PgSubscriptionRepository;
