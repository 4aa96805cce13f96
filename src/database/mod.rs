pub mod manager;
pub mod mutation;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use mutation::Mutation;
pub use store::{EntityStore, PgStore};
