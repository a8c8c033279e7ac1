//! Turns registry visitor events into menu builder calls.

use horizon_menus_core::logging::targets;

use super::builder::MenuBuilder;
use crate::registry::{GroupItem, GroupKind, LeafItem, MenuVisitor};

/// Drives a [`MenuBuilder`] from a separating registry walk.
///
/// Conditional groups evaluate their condition exactly once, on entry; the
/// result is remembered for the matching exit.
pub struct MenuItemVisitor<'a, P, B: ?Sized> {
    project: &'a P,
    builder: &'a mut B,
    conditions: Vec<bool>,
}

impl<'a, P, B> MenuItemVisitor<'a, P, B>
where
    B: MenuBuilder<P> + ?Sized,
{
    /// Create a visitor feeding `builder`.
    pub fn new(project: &'a P, builder: &'a mut B) -> Self {
        Self {
            project,
            builder,
            conditions: Vec::new(),
        }
    }

    /// Number of conditional groups currently open.
    pub fn open_conditions(&self) -> usize {
        self.conditions.len()
    }
}

impl<P, B> MenuVisitor<P> for MenuItemVisitor<'_, P, B>
where
    B: MenuBuilder<P> + ?Sized,
{
    fn begin_group(&mut self, group: &GroupItem<P>, _path: &str) {
        match group.kind() {
            GroupKind::Menu { title } => self.builder.begin_menu(title),
            GroupKind::Conditional(condition) => {
                let visible = condition();
                if !visible {
                    self.builder.begin_occult_commands();
                }
                self.conditions.push(visible);
            }
            GroupKind::Section | GroupKind::Inline | GroupKind::Extension => {}
        }
    }

    fn visit(&mut self, leaf: &LeafItem<P>, path: &str) {
        if self.builder.current_menu().is_none() {
            tracing::error!(
                target: targets::BUILDER,
                item = leaf.name(),
                path,
                "menu item registered outside any menu"
            );
            debug_assert!(false, "menu item '{}' at '{path}' is outside any menu", leaf.name());
            return;
        }
        match leaf {
            LeafItem::Command(command) => self.builder.add_item(self.project, command),
            LeafItem::CommandGroup(list) => self.builder.add_item_list(list),
            LeafItem::Special(special) => {
                if let Some(menu) = self.builder.current_menu() {
                    special.invoke(self.project, menu);
                }
            }
        }
    }

    fn end_group(&mut self, group: &GroupItem<P>, _path: &str) {
        match group.kind() {
            GroupKind::Menu { .. } => self.builder.end_menu(),
            GroupKind::Conditional(_) => {
                if self.conditions.pop() == Some(false) {
                    self.builder.end_occult_commands();
                }
            }
            GroupKind::Section | GroupKind::Inline | GroupKind::Extension => {}
        }
    }

    fn do_separator(&mut self) {
        self.builder.add_separator();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ALWAYS_ENABLED_FLAG;
    use crate::menu::{CommandManager, MenuCommand};
    use crate::registry::{
        CommandItem, Item, ItemRegistry, OrderingPreferences, SeparatingVisitor,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn command(name: &str) -> Item<()> {
        Item::command(CommandItem::new(name, name, |_, _| {}, ALWAYS_ENABLED_FLAG))
    }

    fn build(registry: &ItemRegistry<()>) -> CommandManager<()> {
        let mut manager = CommandManager::new();
        manager.add_menu_bar("appmenu");
        {
            let mut visitor = SeparatingVisitor::new(MenuItemVisitor::new(&(), &mut manager));
            registry.visit(&OrderingPreferences::new(), &mut visitor);
            assert_eq!(visitor.inner().open_conditions(), 0);
        }
        manager
    }

    #[test]
    fn test_builds_menus_with_separators() {
        let registry = ItemRegistry::new(vec![Item::menu(
            "File",
            "&File",
            vec![
                Item::section("Basic", vec![command("New"), command("Open")]),
                Item::section("Exit", vec![command("Exit")]),
            ],
        )]);
        let manager = build(&registry);
        let menu_bar = manager.menu_bar().unwrap();
        assert_eq!(menu_bar.menus()[0].layout(), vec!["New", "Open", "-", "Exit"]);
    }

    #[test]
    fn test_condition_evaluated_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let registry = ItemRegistry::new(vec![Item::menu(
            "Tools",
            "&Tools",
            vec![
                command("Macros"),
                Item::conditional(
                    "Experimental",
                    move || {
                        counted.fetch_add(1, Ordering::SeqCst);
                        false
                    },
                    vec![command("Benchmark")],
                ),
            ],
        )]);
        let manager = build(&registry);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let benchmark = manager.entry("Benchmark").unwrap();
        assert!(benchmark.is_occult());
        assert!(!benchmark.is_enabled());
    }

    #[test]
    fn test_special_item_receives_current_menu() {
        let registry = ItemRegistry::new(vec![Item::menu(
            "File",
            "&File",
            vec![Item::special("Recent", |_, menu| {
                menu.add_command(MenuCommand::new("RecentFile1", "1 song.aup3"));
            })],
        )]);
        let manager = build(&registry);
        assert_eq!(manager.menu_bar().unwrap().menus()[0].layout(), vec!["RecentFile1"]);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_leaf_outside_menu_is_skipped() {
        let registry = ItemRegistry::new(vec![command("Stray")]);
        let manager = build(&registry);
        assert!(manager.entry("Stray").is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside any menu")]
    fn test_leaf_outside_menu_asserts() {
        let registry = ItemRegistry::new(vec![command("Stray")]);
        build(&registry);
    }
}
