//! Separator and grouping decisions during a registry walk.
//!
//! [`SeparatorTracker`] owns the per-scope stacks that decide when a visual
//! separator is due. [`SeparatingVisitor`] wraps a [`MenuVisitor`] and turns
//! the raw walk of [`ItemRegistry::visit`](super::ItemRegistry::visit) into
//! begin/end/leaf/separator events.
//!
//! All mutable state lives in the tracker of one walk. A nested rebuild
//! triggered from inside a callback gets a fresh tracker, so the stacks of
//! the outer walk are never disturbed.

use horizon_menus_core::logging::targets;

use super::item::{GroupItem, LeafItem, Properties};
use super::item_registry::ItemVisitor;

// ============================================================================
// SeparatorTracker
// ============================================================================

/// Per-scope "separator requested" and "nothing placed yet" stacks.
#[derive(Debug, Default, Clone)]
pub struct SeparatorTracker {
    need_separator: Vec<bool>,
    first_item: Vec<bool>,
}

impl SeparatorTracker {
    /// Create a tracker with no open scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.need_separator.len()
    }

    /// Decide what happens before a group begins.
    ///
    /// Returns `(begin, separate)`: whether the group's own begin hook runs,
    /// and whether a separator must be emitted first.
    pub fn should_begin_group(&mut self, properties: Properties) -> (bool, bool) {
        match properties {
            Properties::Inline => (false, false),
            Properties::Section => {
                self.request_separator();
                (true, false)
            }
            Properties::Whole | Properties::Extension => (true, self.should_do_separator()),
            Properties::None => (true, false),
        }
    }

    /// Open a new scope for menus and extensions.
    pub fn after_begin_group(&mut self, properties: Properties) {
        match properties {
            Properties::Whole => {
                self.need_separator.push(false);
                self.first_item.push(true);
            }
            // An extension continues a menu that already has content.
            Properties::Extension => {
                self.need_separator.push(false);
                self.first_item.push(false);
            }
            Properties::Section | Properties::Inline | Properties::None => {}
        }
    }

    /// Decide what happens when a group ends. Returns whether the group's
    /// end hook runs.
    pub fn should_end_group(&mut self, properties: Properties) -> bool {
        match properties {
            Properties::Inline => false,
            Properties::Section => {
                self.request_separator();
                true
            }
            Properties::Whole | Properties::Extension => {
                self.first_item.pop();
                self.need_separator.pop();
                true
            }
            Properties::None => true,
        }
    }

    /// Whether a separator is due before the next element of the current
    /// scope. Consumes the request and the first-item marker.
    pub fn should_do_separator(&mut self) -> bool {
        match (self.need_separator.last_mut(), self.first_item.last_mut()) {
            (Some(need), Some(first)) => {
                let separate = *need && !*first;
                *need = false;
                *first = false;
                separate
            }
            _ => false,
        }
    }

    fn request_separator(&mut self) {
        if let Some(need) = self.need_separator.last_mut() {
            *need = true;
        }
    }
}

// ============================================================================
// MenuVisitor
// ============================================================================

/// Receiver of the events produced by a [`SeparatingVisitor`].
pub trait MenuVisitor<P> {
    /// A group's pre-visit. Not called for inline groups.
    fn begin_group(&mut self, group: &GroupItem<P>, path: &str);

    /// A leaf.
    fn visit(&mut self, leaf: &LeafItem<P>, path: &str);

    /// A group's post-visit. Not called for inline groups.
    fn end_group(&mut self, group: &GroupItem<P>, path: &str);

    /// A separator is due.
    fn do_separator(&mut self);
}

/// Adapts a [`MenuVisitor`] to a raw registry walk, inserting separators.
#[derive(Debug)]
pub struct SeparatingVisitor<V> {
    inner: V,
    tracker: SeparatorTracker,
}

impl<V> SeparatingVisitor<V> {
    /// Wrap `inner` with a fresh tracker.
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            tracker: SeparatorTracker::new(),
        }
    }

    /// The wrapped visitor.
    pub fn inner(&self) -> &V {
        &self.inner
    }

    /// The tracker's current state.
    pub fn tracker(&self) -> &SeparatorTracker {
        &self.tracker
    }

    /// Unwrap the inner visitor.
    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<P, V: MenuVisitor<P>> ItemVisitor<P> for SeparatingVisitor<V> {
    fn begin_group(&mut self, group: &GroupItem<P>, path: &str) {
        let properties = group.properties();
        let (begin, separate) = self.tracker.should_begin_group(properties);
        if separate {
            self.inner.do_separator();
        }
        if begin {
            self.inner.begin_group(group, path);
        }
        self.tracker.after_begin_group(properties);
    }

    fn visit(&mut self, leaf: &LeafItem<P>, path: &str) {
        if self.tracker.should_do_separator() {
            self.inner.do_separator();
        }
        self.inner.visit(leaf, path);
    }

    fn end_group(&mut self, group: &GroupItem<P>, path: &str) {
        if self.tracker.should_end_group(group.properties()) {
            self.inner.end_group(group, path);
        }
        tracing::trace!(
            target: targets::VISITOR,
            group = group.name(),
            depth = self.tracker.depth(),
            "group ended"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ALWAYS_ENABLED_FLAG;
    use crate::registry::{CommandItem, Item, ItemRegistry, OrderingPreferences};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl MenuVisitor<()> for Recorder {
        fn begin_group(&mut self, group: &GroupItem<()>, _path: &str) {
            self.events.push(format!("begin {}", group.name()));
        }

        fn visit(&mut self, leaf: &LeafItem<()>, _path: &str) {
            self.events.push(leaf.name().to_string());
        }

        fn end_group(&mut self, group: &GroupItem<()>, _path: &str) {
            self.events.push(format!("end {}", group.name()));
        }

        fn do_separator(&mut self) {
            self.events.push("-".to_string());
        }
    }

    fn command(name: &str) -> Item<()> {
        Item::command(CommandItem::new(name, name, |_, _| {}, ALWAYS_ENABLED_FLAG))
    }

    fn walk(items: Vec<Item<()>>) -> Vec<String> {
        let registry = ItemRegistry::new(items);
        let mut visitor = SeparatingVisitor::new(Recorder::default());
        registry.visit(&OrderingPreferences::new(), &mut visitor);
        assert_eq!(visitor.tracker().depth(), 0);
        visitor.into_inner().events
    }

    #[test]
    fn test_balanced_walk_restores_depth() {
        let mut tracker = SeparatorTracker::new();
        for properties in [Properties::Whole, Properties::Extension, Properties::Whole] {
            tracker.should_begin_group(properties);
            tracker.after_begin_group(properties);
        }
        assert_eq!(tracker.depth(), 3);
        for properties in [Properties::Whole, Properties::Extension, Properties::Whole] {
            assert!(tracker.should_end_group(properties));
        }
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_no_separator_before_first_item() {
        let mut tracker = SeparatorTracker::new();
        tracker.after_begin_group(Properties::Whole);
        tracker.should_begin_group(Properties::Section);
        tracker.should_end_group(Properties::Section);
        assert!(!tracker.should_do_separator());
        // The request was consumed along with the first-item marker.
        assert!(!tracker.should_do_separator());
    }

    #[test]
    fn test_extension_is_never_first() {
        let mut tracker = SeparatorTracker::new();
        tracker.after_begin_group(Properties::Extension);
        tracker.should_begin_group(Properties::Section);
        assert!(tracker.should_do_separator());
    }

    #[test]
    fn test_inline_does_not_open_scope() {
        let mut tracker = SeparatorTracker::new();
        assert_eq!(tracker.should_begin_group(Properties::Inline), (false, false));
        tracker.after_begin_group(Properties::Inline);
        assert_eq!(tracker.depth(), 0);
        assert!(!tracker.should_end_group(Properties::Inline));
    }

    #[test]
    fn test_sections_are_separated() {
        let events = walk(vec![Item::menu(
            "File",
            "&File",
            vec![
                Item::section("Basic", vec![command("New"), command("Open")]),
                Item::section("Exit", vec![command("Exit")]),
            ],
        )]);
        assert_eq!(
            events,
            vec![
                "begin File",
                "begin Basic",
                "New",
                "Open",
                "end Basic",
                "begin Exit",
                "-",
                "Exit",
                "end Exit",
                "end File",
            ]
        );
    }

    #[test]
    fn test_trailing_section_emits_nothing() {
        let events = walk(vec![Item::menu(
            "Edit",
            "&Edit",
            vec![command("Undo"), Item::section("Empty", vec![])],
        )]);
        assert!(!events.iter().any(|event| event == "-"));
    }

    #[test]
    fn test_separator_scope_does_not_leak_across_menus() {
        let events = walk(vec![
            Item::menu("File", "&File", vec![Item::section("Basic", vec![command("New")])]),
            Item::menu("Edit", "&Edit", vec![command("Undo")]),
        ]);
        assert_eq!(
            events,
            vec![
                "begin File",
                "begin Basic",
                "New",
                "end Basic",
                "end File",
                "begin Edit",
                "Undo",
                "end Edit",
            ]
        );
    }

    #[test]
    fn test_submenu_after_section_gets_separator() {
        let events = walk(vec![Item::menu(
            "View",
            "&View",
            vec![
                Item::section("Zoom", vec![command("ZoomIn")]),
                Item::menu("Windows", "&Windows", vec![command("UndoHistory")]),
            ],
        )]);
        let windows = events.iter().position(|event| event == "begin Windows").unwrap();
        assert_eq!(events[windows - 1], "-");
    }
}
