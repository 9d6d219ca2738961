//! In-memory collections of doctors, patients and appointments.
//!
//! Memory only: the cache starts empty on every run and is hydrated from
//! the backend through [`DomainCache::begin_fetch`] / `apply_*`.

mod collection;
mod intent;
mod reducer;
mod sequence;
mod state;
mod store;

pub use intent::CacheIntent;
pub use reducer::CacheReducer;
pub use sequence::{EntityKind, FetchTicket};
pub use state::CacheState;
pub use store::DomainCache;
