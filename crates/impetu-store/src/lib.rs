//! Storage backends for the impetu momentum engine.
//!
//! Both backends implement [`PriceSource`](impetu_traits::PriceSource) and
//! [`RecordStore`](impetu_traits::RecordStore):
//! - [`MemoryStore`]: in-process maps, used by tests and dry runs
//! - [`PgStore`]: PostgreSQL through an `sqlx` pool
//!
//! In both, replacing an evaluation date's records is atomic: a failed
//! write leaves the previous cross-section in place.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{DatabaseConfig, PgStore};
