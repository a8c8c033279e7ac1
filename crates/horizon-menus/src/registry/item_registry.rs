//! The process-wide menu item tree.
//!
//! An [`ItemRegistry`] is built once at startup: a static tree of top-level
//! items plus items contributed by feature modules at hierarchical paths.
//! Walking it merges both sources per group and applies the ordering
//! overrides, so the logical order never depends on the order in which
//! modules happened to register.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use horizon_menus_core::logging::targets;

use super::item::{GroupItem, GroupKind, Item, LeafItem};
use super::ordering::{normalize_path, OrderingPreferences};

/// Name of the root group of every menu registry.
pub const MENU_PATH_START: &str = "MenuBar";

/// Receiver of a raw depth-first walk.
///
/// `path` is the registry path of the group being entered or left, or of
/// the group containing the leaf.
pub trait ItemVisitor<P> {
    /// Entering a group.
    fn begin_group(&mut self, group: &GroupItem<P>, path: &str);

    /// A leaf.
    fn visit(&mut self, leaf: &LeafItem<P>, path: &str);

    /// Leaving a group.
    fn end_group(&mut self, group: &GroupItem<P>, path: &str);
}

/// Static tree plus path-registered contributions.
pub struct ItemRegistry<P> {
    root: GroupItem<P>,
    registered: BTreeMap<String, Vec<Item<P>>>,
}

impl<P> Default for ItemRegistry<P> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<P> ItemRegistry<P> {
    /// Create a registry whose root holds `items`.
    pub fn new(items: Vec<Item<P>>) -> Self {
        Self {
            root: GroupItem::new(MENU_PATH_START, GroupKind::Inline, items),
            registered: BTreeMap::new(),
        }
    }

    /// The root group.
    pub fn root(&self) -> &GroupItem<P> {
        &self.root
    }

    /// Contribute `item` to the group at `path` (`""` is the top level).
    ///
    /// Items registered at the same path keep their registration order
    /// unless an ordering override says otherwise.
    pub fn register(&mut self, path: &str, item: Item<P>) {
        let path = normalize_path(path);
        tracing::debug!(
            target: targets::REGISTRY,
            path,
            item = item.name(),
            "registered menu item"
        );
        self.registered.entry(path.to_string()).or_default().push(item);
    }

    /// Number of path-registered items.
    pub fn registered_len(&self) -> usize {
        self.registered.values().map(Vec::len).sum()
    }

    /// Walk the tree depth-first, in override order.
    pub fn visit<V>(&self, ordering: &OrderingPreferences, visitor: &mut V)
    where
        V: ItemVisitor<P> + ?Sized,
    {
        self.visit_group(&self.root, "", true, ordering, visitor);
    }

    fn visit_group<V>(
        &self,
        group: &GroupItem<P>,
        path: &str,
        claims_path: bool,
        ordering: &OrderingPreferences,
        visitor: &mut V,
    ) where
        V: ItemVisitor<P> + ?Sized,
    {
        visitor.begin_group(group, path);

        // Anonymous groups share their parent's path; only the named owner
        // of a path receives the items registered there.
        let contributed = claims_path
            .then(|| self.registered.get(path))
            .flatten()
            .into_iter()
            .flatten();
        let children: Vec<&Item<P>> = group.children().iter().chain(contributed).collect();
        let children = ordering.arrange(path, children, |item| item.name());

        for child in children {
            match child {
                Item::Leaf(leaf) => visitor.visit(leaf, path),
                Item::Group(inner) => {
                    let child_path = inner.child_path(path);
                    let claims = !inner.name().is_empty();
                    self.visit_group(inner, &child_path, claims, ordering, visitor);
                }
            }
        }

        visitor.end_group(group, path);
    }

    /// Registration paths that no group in the tree resolves to. Items at
    /// these paths are never visited.
    pub fn unresolved_paths(&self) -> Vec<&str> {
        let mut collector = PathCollector::default();
        self.visit(&OrderingPreferences::new(), &mut collector);
        self.registered
            .keys()
            .filter(|path| !collector.paths.contains(path.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl<P> fmt::Debug for ItemRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemRegistry")
            .field("root", &self.root.children())
            .field("registered", &self.registered)
            .finish()
    }
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<String>,
}

impl<P> ItemVisitor<P> for PathCollector {
    fn begin_group(&mut self, group: &GroupItem<P>, path: &str) {
        if group.name().is_empty() {
            return;
        }
        self.paths.insert(path.to_string());
    }

    fn visit(&mut self, _leaf: &LeafItem<P>, _path: &str) {}

    fn end_group(&mut self, _group: &GroupItem<P>, _path: &str) {}
}
