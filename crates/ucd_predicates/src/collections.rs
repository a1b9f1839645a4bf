//! Fx hashed collections. Keys are small integers (pending set values) and category, property
//! or cache key names, none of them attacker controlled.

use rustc_hash::{FxHashMap, FxHashSet};

/// Values added to a set that is still being built.
pub type Set<T> = FxHashSet<T>;

/// Sets by name: general categories, properties, cached queries.
pub type Map<K, V> = FxHashMap<K, V>;
