pub mod common;
pub mod memory;
pub mod user;
pub mod user_repository;

pub use memory::InMemoryUserStore;
pub use user::PgUserStore;
pub use user_repository::*;
