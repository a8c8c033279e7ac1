//! Placement-preference overrides.
//!
//! A table mapping a registry path to a comma-separated canonical order of
//! child names. Names listed come first, in list order; everything else keeps
//! registration order after them. Paths are normalised so that `"/View/Windows"`
//! and `"View/Windows"` are the same key, and the root is `""`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use horizon_menus_core::logging::targets;

/// Ordering overrides keyed by registry path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct OrderingPreferences {
    orders: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for OrderingPreferences {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let mut preferences = Self::new();
        for (path, order) in raw {
            preferences.set(&path, order);
        }
        preferences
    }
}

impl From<OrderingPreferences> for BTreeMap<String, String> {
    fn from(preferences: OrderingPreferences) -> Self {
        preferences.orders
    }
}

/// Strip leading and trailing separators from a registry path.
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

impl OrderingPreferences {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
        }
    }

    /// Set the order for `path`, replacing any previous value.
    pub fn set(&mut self, path: &str, order: impl Into<String>) {
        self.orders
            .insert(normalize_path(path).to_string(), order.into());
    }

    /// The raw order string for `path`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.orders.get(normalize_path(path)).map(String::as_str)
    }

    /// The order for `path`, split into names. Empty names are dropped.
    pub fn order_for(&self, path: &str) -> Vec<&str> {
        self.get(path)
            .map(|order| {
                order
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fill in defaults for paths that have no order yet. Returns how many
    /// paths were added.
    pub fn initialize_defaults<'a, I>(&mut self, defaults: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut added = 0;
        for (path, order) in defaults {
            let key = normalize_path(path);
            if !self.orders.contains_key(key) {
                self.orders.insert(key.to_string(), order.to_string());
                added += 1;
            }
        }
        if added > 0 {
            tracing::debug!(target: targets::REGISTRY, added, "initialized default orderings");
        }
        added
    }

    /// Number of paths with an order.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// True when no path has an order.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterate `(path, order)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.orders
            .iter()
            .map(|(path, order)| (path.as_str(), order.as_str()))
    }

    /// Arrange `items` for the group at `path`.
    ///
    /// The input is in registration order. Items named in the override come
    /// first in override order; the rest follow in their original order.
    /// Names are matched once each, so a repeated name in the override does
    /// not duplicate an item.
    pub fn arrange<T, F>(&self, path: &str, items: Vec<T>, name_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        let order = self.order_for(path);
        if order.is_empty() {
            return items;
        }

        let mut remaining: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let mut arranged = Vec::with_capacity(remaining.len());
        for name in order {
            let found = remaining
                .iter()
                .position(|slot| slot.as_ref().is_some_and(|item| name_of(item) == name));
            if let Some(item) = found.and_then(|index| remaining[index].take()) {
                arranged.push(item);
            }
        }
        arranged.extend(remaining.into_iter().flatten());
        arranged
    }
}
