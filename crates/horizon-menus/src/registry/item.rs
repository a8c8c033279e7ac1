//! The registry item tree.
//!
//! Menus are declared as a tree of [`Item`]s. Leaves are commands, command
//! lists and special items; groups are menus, sections, inline groups,
//! extension groups and conditional groups. The set of kinds is closed, so
//! every consumer matches exhaustively instead of down-casting.
//!
//! # Example
//!
//! ```
//! use horizon_menus::registry::{CommandItem, Item};
//! use horizon_menus::ALWAYS_ENABLED_FLAG;
//!
//! struct Project;
//!
//! let file_menu: Item<Project> = Item::menu("File", "&File", vec![
//!     Item::section("Basic", vec![
//!         Item::command(CommandItem::new("New", "&New", |_, _| {}, ALWAYS_ENABLED_FLAG)),
//!         Item::command(CommandItem::new("Open", "&Open...", |_, _| {}, ALWAYS_ENABLED_FLAG)),
//!     ]),
//!     Item::section("Exit", vec![
//!         Item::command(CommandItem::new("Exit", "E&xit", |_, _| {}, ALWAYS_ENABLED_FLAG)),
//!     ]),
//! ]);
//! assert_eq!(file_menu.name(), "File");
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::flags::CommandFlag;
use crate::menu::Menu;

// ============================================================================
// Properties
// ============================================================================

/// How a group behaves with respect to separators and menu scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Properties {
    /// An ordinary menu: opens a separator scope whose first item is never
    /// preceded by a separator.
    Whole,
    /// Continues a menu contributed elsewhere: opens a scope, but does not
    /// count as the start of the logical menu.
    Extension,
    /// Requests separators before and after its contents, without opening a
    /// scope.
    Section,
    /// No boundary behavior at all; children share the parent's scope.
    Inline,
    /// No separator behavior.
    #[default]
    None,
}

// ============================================================================
// Command callbacks
// ============================================================================

/// Object a command callback is dispatched on.
pub type CommandHandler = dyn Any + Send + Sync;

/// Locates the handler object for a command within a project.
pub type CommandHandlerFinder<P> = Arc<dyn Fn(&P) -> Arc<CommandHandler> + Send + Sync>;

/// Invocation details passed to a command callback.
#[derive(Debug)]
pub struct CommandContext<'a, P> {
    /// The project the command runs against.
    pub project: &'a P,
    /// Identifier of the invoked command.
    pub command: &'a str,
    /// Position within a command list, `None` for single commands.
    pub index: Option<usize>,
}

/// The callback run when a command is invoked.
pub type CommandFunctor<P> =
    Arc<dyn for<'a> Fn(&CommandHandler, &CommandContext<'a, P>) + Send + Sync>;

/// Reports the checked state of a checkable command.
pub type CheckPredicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;

/// Per-command configuration.
pub struct CommandOptions<P> {
    accel: Option<String>,
    checker: Option<CheckPredicate<P>>,
    use_strict_flags: bool,
    global: bool,
    long_name: Option<String>,
}

impl<P> Default for CommandOptions<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for CommandOptions<P> {
    fn clone(&self) -> Self {
        Self {
            accel: self.accel.clone(),
            checker: self.checker.clone(),
            use_strict_flags: self.use_strict_flags,
            global: self.global,
            long_name: self.long_name.clone(),
        }
    }
}

impl<P> CommandOptions<P> {
    /// Default options: no accelerator, not checkable, lax flags.
    pub fn new() -> Self {
        Self {
            accel: None,
            checker: None,
            use_strict_flags: false,
            global: false,
            long_name: None,
        }
    }

    /// Set the accelerator hint.
    pub fn with_accel(mut self, accel: impl Into<String>) -> Self {
        self.accel = Some(accel.into());
        self
    }

    /// Make the command checkable, reporting its state through `checker`.
    pub fn with_checker<F>(mut self, checker: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.checker = Some(Arc::new(checker));
        self
    }

    /// Always judge this command against the real flags, never against the
    /// speculative set that assumes enablers will run.
    pub fn use_strict_flags(mut self) -> Self {
        self.use_strict_flags = true;
        self
    }

    /// Mark the command as available regardless of which window is focused.
    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Set a longer name used where the menu label is ambiguous.
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    /// The accelerator hint.
    pub fn accel(&self) -> Option<&str> {
        self.accel.as_deref()
    }

    /// Whether the command shows a check mark.
    pub fn is_checkable(&self) -> bool {
        self.checker.is_some()
    }

    /// Evaluate the checked state, if checkable.
    pub fn checked(&self, project: &P) -> Option<bool> {
        self.checker.as_ref().map(|checker| checker(project))
    }

    /// Whether strict flags apply.
    pub fn uses_strict_flags(&self) -> bool {
        self.use_strict_flags
    }

    /// Whether the command is global.
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// The long name, if any.
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }
}

impl<P> fmt::Debug for CommandOptions<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOptions")
            .field("accel", &self.accel)
            .field("checkable", &self.is_checkable())
            .field("use_strict_flags", &self.use_strict_flags)
            .field("global", &self.global)
            .field("long_name", &self.long_name)
            .finish()
    }
}

// ============================================================================
// Leaf items
// ============================================================================

/// A single invocable command.
pub struct CommandItem<P> {
    /// Stable identifier, unique within the registry tree.
    pub name: String,
    /// Menu label.
    pub label: String,
    /// Handler lookup; `None` dispatches on the project itself.
    pub finder: Option<CommandHandlerFinder<P>>,
    /// Callback run on invocation.
    pub callback: CommandFunctor<P>,
    /// Flags that must hold for the command to be enabled.
    pub flags: CommandFlag,
    /// Accelerator, checkability and flag strictness.
    pub options: CommandOptions<P>,
}

impl<P> CommandItem<P> {
    /// Create a command with default options.
    pub fn new<F>(
        name: impl Into<String>,
        label: impl Into<String>,
        callback: F,
        flags: CommandFlag,
    ) -> Self
    where
        F: for<'a> Fn(&CommandHandler, &CommandContext<'a, P>) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            label: label.into(),
            finder: None,
            callback: Arc::new(callback),
            flags,
            options: CommandOptions::new(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: CommandOptions<P>) -> Self {
        self.options = options;
        self
    }

    /// Set the handler lookup.
    pub fn with_finder<F>(mut self, finder: F) -> Self
    where
        F: Fn(&P) -> Arc<CommandHandler> + Send + Sync + 'static,
    {
        self.finder = Some(Arc::new(finder));
        self
    }
}

/// Internal name and label of one member of a command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSymbol {
    /// Identifier of the generated command.
    pub internal: String,
    /// Its menu label.
    pub label: String,
}

impl ItemSymbol {
    /// Create a symbol.
    pub fn new(internal: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            internal: internal.into(),
            label: label.into(),
        }
    }
}

/// A family of commands sharing one callback, e.g. one per installed effect.
pub struct CommandGroupItem<P> {
    /// Identifier of the list as a whole.
    pub name: String,
    /// The generated commands, in menu order.
    pub items: Vec<ItemSymbol>,
    /// Handler lookup; `None` dispatches on the project itself.
    pub finder: Option<CommandHandlerFinder<P>>,
    /// Shared callback; receives the member's index.
    pub callback: CommandFunctor<P>,
    /// Flags every member requires.
    pub flags: CommandFlag,
    /// Whether the members are effects.
    pub is_effect: bool,
}

impl<P> CommandGroupItem<P> {
    /// Create a command list.
    pub fn new<F>(
        name: impl Into<String>,
        items: Vec<ItemSymbol>,
        callback: F,
        flags: CommandFlag,
        is_effect: bool,
    ) -> Self
    where
        F: for<'a> Fn(&CommandHandler, &CommandContext<'a, P>) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            items,
            finder: None,
            callback: Arc::new(callback),
            flags,
            is_effect,
        }
    }

    /// Set the handler lookup.
    pub fn with_finder<F>(mut self, finder: F) -> Self
    where
        F: Fn(&P) -> Arc<CommandHandler> + Send + Sync + 'static,
    {
        self.finder = Some(Arc::new(finder));
        self
    }
}

/// Function run by a [`SpecialItem`] against the menu being built.
pub type SpecialFn<P> = Arc<dyn Fn(&P, &mut Menu) + Send + Sync>;

/// Escape hatch for entries that don't fit the declarative shape.
pub struct SpecialItem<P> {
    /// Identifier of the special item.
    pub name: String,
    /// Called with the project and the currently open menu.
    pub func: SpecialFn<P>,
}

impl<P> SpecialItem<P> {
    /// Create a special item.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&P, &mut Menu) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Run the function against `menu`.
    pub fn invoke(&self, project: &P, menu: &mut Menu) {
        (self.func)(project, menu)
    }
}

/// A leaf of the item tree.
pub enum LeafItem<P> {
    /// A single command.
    Command(CommandItem<P>),
    /// A list of commands sharing a callback.
    CommandGroup(CommandGroupItem<P>),
    /// A custom function.
    Special(SpecialItem<P>),
}

impl<P> LeafItem<P> {
    /// The leaf's identifier.
    pub fn name(&self) -> &str {
        match self {
            LeafItem::Command(item) => &item.name,
            LeafItem::CommandGroup(item) => &item.name,
            LeafItem::Special(item) => &item.name,
        }
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Zero-argument predicate guarding a conditional group.
pub type Condition = Arc<dyn Fn() -> bool + Send + Sync>;

/// What kind of group a [`GroupItem`] is.
#[derive(Clone)]
pub enum GroupKind {
    /// A titled menu or submenu.
    Menu {
        /// Title shown in the menu bar or parent menu.
        title: String,
    },
    /// A section: separated from its neighbours when non-empty.
    Section,
    /// A plain grouping with no visual effect.
    Inline,
    /// Content extending a menu begun elsewhere.
    Extension,
    /// Children shown only while the condition holds.
    Conditional(Condition),
}

impl GroupKind {
    /// The separator behavior of this kind.
    pub fn properties(&self) -> Properties {
        match self {
            GroupKind::Menu { .. } => Properties::Whole,
            GroupKind::Section => Properties::Section,
            GroupKind::Inline => Properties::Inline,
            GroupKind::Extension => Properties::Extension,
            GroupKind::Conditional(_) => Properties::None,
        }
    }
}

impl fmt::Debug for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Menu { title } => f.debug_struct("Menu").field("title", title).finish(),
            GroupKind::Section => write!(f, "Section"),
            GroupKind::Inline => write!(f, "Inline"),
            GroupKind::Extension => write!(f, "Extension"),
            GroupKind::Conditional(_) => write!(f, "Conditional"),
        }
    }
}

/// A named group of items.
pub struct GroupItem<P> {
    name: String,
    kind: GroupKind,
    children: Vec<Item<P>>,
}

impl<P> GroupItem<P> {
    /// Create a group.
    pub fn new(name: impl Into<String>, kind: GroupKind, children: Vec<Item<P>>) -> Self {
        Self {
            name: name.into(),
            kind,
            children,
        }
    }

    /// The group's name; empty for anonymous groups, which do not extend the
    /// registry path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group's kind.
    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    /// The group's separator behavior.
    pub fn properties(&self) -> Properties {
        self.kind.properties()
    }

    /// Statically declared children.
    pub fn children(&self) -> &[Item<P>] {
        &self.children
    }

    /// The menu title, for menu groups.
    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            GroupKind::Menu { title } => Some(title),
            _ => None,
        }
    }

    /// Path of this group's children given the parent's path.
    pub fn child_path(&self, parent_path: &str) -> String {
        match (parent_path.is_empty(), self.name.is_empty()) {
            (_, true) => parent_path.to_string(),
            (true, false) => self.name.clone(),
            (false, false) => format!("{parent_path}/{}", self.name),
        }
    }
}

// ============================================================================
// Item
// ============================================================================

/// A node of the registry tree.
pub enum Item<P> {
    /// A leaf.
    Leaf(LeafItem<P>),
    /// A group of further items.
    Group(GroupItem<P>),
}

impl<P> Item<P> {
    /// The node's identifier.
    pub fn name(&self) -> &str {
        match self {
            Item::Leaf(leaf) => leaf.name(),
            Item::Group(group) => group.name(),
        }
    }

    /// A command leaf.
    pub fn command(item: CommandItem<P>) -> Self {
        Item::Leaf(LeafItem::Command(item))
    }

    /// A command list leaf.
    pub fn command_group(item: CommandGroupItem<P>) -> Self {
        Item::Leaf(LeafItem::CommandGroup(item))
    }

    /// A special leaf.
    pub fn special<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&P, &mut Menu) + Send + Sync + 'static,
    {
        Item::Leaf(LeafItem::Special(SpecialItem::new(name, func)))
    }

    /// A titled menu.
    pub fn menu(name: impl Into<String>, title: impl Into<String>, children: Vec<Item<P>>) -> Self {
        Item::Group(GroupItem::new(
            name,
            GroupKind::Menu {
                title: title.into(),
            },
            children,
        ))
    }

    /// A section.
    pub fn section(name: impl Into<String>, children: Vec<Item<P>>) -> Self {
        Item::Group(GroupItem::new(name, GroupKind::Section, children))
    }

    /// An inline group.
    pub fn items(name: impl Into<String>, children: Vec<Item<P>>) -> Self {
        Item::Group(GroupItem::new(name, GroupKind::Inline, children))
    }

    /// An extension group.
    pub fn extension(name: impl Into<String>, children: Vec<Item<P>>) -> Self {
        Item::Group(GroupItem::new(name, GroupKind::Extension, children))
    }

    /// A conditional group.
    pub fn conditional<F>(name: impl Into<String>, condition: F, children: Vec<Item<P>>) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Item::Group(GroupItem::new(
            name,
            GroupKind::Conditional(Arc::new(condition)),
            children,
        ))
    }
}

impl<P> fmt::Debug for Item<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Leaf(LeafItem::Command(item)) => write!(f, "Command({})", item.name),
            Item::Leaf(LeafItem::CommandGroup(item)) => {
                write!(f, "CommandGroup({}, {} items)", item.name, item.items.len())
            }
            Item::Leaf(LeafItem::Special(item)) => write!(f, "Special({})", item.name),
            Item::Group(group) => f
                .debug_struct("Group")
                .field("name", &group.name)
                .field("kind", &group.kind)
                .field("children", &group.children)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ALWAYS_ENABLED_FLAG;

    #[test]
    fn test_group_properties() {
        let menu = Item::<()>::menu("Edit", "&Edit", vec![]);
        let Item::Group(menu) = menu else {
            panic!("menu should be a group");
        };
        assert_eq!(menu.properties(), Properties::Whole);
        assert_eq!(menu.title(), Some("&Edit"));
        assert_eq!(GroupKind::Section.properties(), Properties::Section);
        assert_eq!(GroupKind::Inline.properties(), Properties::Inline);
        assert_eq!(GroupKind::Extension.properties(), Properties::Extension);
        assert_eq!(
            GroupKind::Conditional(Arc::new(|| true)).properties(),
            Properties::None
        );
    }

    #[test]
    fn test_child_path() {
        let named = GroupItem::<()>::new("Windows", GroupKind::Section, vec![]);
        let anonymous = GroupItem::<()>::new("", GroupKind::Inline, vec![]);
        assert_eq!(named.child_path(""), "Windows");
        assert_eq!(named.child_path("View"), "View/Windows");
        assert_eq!(anonymous.child_path("View"), "View");
    }

    #[test]
    fn test_command_options() {
        let options = CommandOptions::<bool>::new()
            .with_accel("Ctrl+Z")
            .with_checker(|on: &bool| *on)
            .use_strict_flags()
            .with_long_name("Undo last edit");
        assert_eq!(options.accel(), Some("Ctrl+Z"));
        assert!(options.is_checkable());
        assert_eq!(options.checked(&true), Some(true));
        assert!(options.uses_strict_flags());
        assert!(!options.is_global());
        assert_eq!(options.long_name(), Some("Undo last edit"));
        assert_eq!(CommandOptions::<bool>::new().checked(&true), None);
    }

    #[test]
    fn test_item_names() {
        let command = Item::<()>::command(CommandItem::new("Undo", "&Undo", |_, _| {}, ALWAYS_ENABLED_FLAG));
        let list = Item::<()>::command_group(CommandGroupItem::new(
            "Effects",
            vec![ItemSymbol::new("Amplify", "&Amplify...")],
            |_, _| {},
            ALWAYS_ENABLED_FLAG,
            true,
        ));
        let special = Item::<()>::special("Recent", |_, _| {});
        assert_eq!(command.name(), "Undo");
        assert_eq!(list.name(), "Effects");
        assert_eq!(special.name(), "Recent");
    }
}
