//! Model-View-Intent (MVI) primitives shared by the session and cache stores.
//!
//! Every state transition in the crate goes through a reducer:
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ snapshot for consumers
//!    ↑                                      │
//!    └──────────────────────────────────────┘
//! ```
//!
//! - **State**: plain data, cloned out to readers as snapshots
//! - **Intent**: a login, a logout, a cache mutation, a backend response
//! - **Reducer**: pure function producing the next state

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::StoreState;
