//! Base trait for store state.

/// Marker trait for state objects held by a store.
///
/// States should be:
/// - Cloneable (readers get snapshots, never references into the store)
/// - Comparable (PartialEq for detecting changes)
/// - Defaultable (the state a freshly constructed store starts in)
pub trait StoreState: Clone + PartialEq + Default + Send + 'static {}
