// Adapters layer: concrete storage backends behind the TheaterStore port.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
