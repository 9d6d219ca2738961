//! Id-keyed operations shared by the three collections.
//!
//! Collections are plain `Vec`s: insertion order is kept and duplicate ids
//! are not rejected, so replace and remove act on every matching element.

use crate::domain::Entity;

pub(crate) fn contains<T: Entity>(items: &[T], id: &str) -> bool {
    items.iter().any(|item| item.id() == id)
}

pub(crate) fn find<'a, T: Entity>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// Replace elements whose id matches `item`'s. Unknown ids change nothing.
pub(crate) fn replace<T: Entity>(mut items: Vec<T>, item: T) -> Vec<T> {
    for slot in items.iter_mut().filter(|slot| slot.id() == item.id()) {
        *slot = item.clone();
    }
    items
}

pub(crate) fn remove<T: Entity>(mut items: Vec<T>, id: &str) -> Vec<T> {
    items.retain(|item| item.id() != id);
    items
}
