//! In-memory command table and menu bar.
//!
//! [`CommandManager`] records every command the registry walk adds, keeps
//! the resulting [`MenuBar`], and applies enable/disable decisions from the
//! flag engine in one batch.

use std::collections::HashMap;
use std::fmt;

use horizon_menus_core::logging::targets;

use super::builder::MenuBuilder;
use super::model::{Menu, MenuBar, MenuCommand};
use crate::flags::CommandFlag;
use crate::registry::{
    CommandContext, CommandFunctor, CommandGroupItem, CommandHandler, CommandHandlerFinder,
    CommandItem, CommandOptions,
};

// ============================================================================
// CommandEntry
// ============================================================================

/// Position of a command within a command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMembership {
    /// Name of the list.
    pub list: String,
    /// Index within the list.
    pub index: usize,
    /// Whether the list holds effects.
    pub is_effect: bool,
}

/// One registered command.
pub struct CommandEntry<P> {
    id: String,
    label: String,
    flags: CommandFlag,
    enabled: bool,
    occult: bool,
    options: CommandOptions<P>,
    membership: Option<ListMembership>,
    finder: Option<CommandHandlerFinder<P>>,
    callback: CommandFunctor<P>,
}

impl<P> Clone for CommandEntry<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            flags: self.flags,
            enabled: self.enabled,
            occult: self.occult,
            options: self.options.clone(),
            membership: self.membership.clone(),
            finder: self.finder.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<P> CommandEntry<P> {
    /// The command identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Flags required for the command to be enabled.
    pub fn flags(&self) -> CommandFlag {
        self.flags
    }

    /// Whether the command is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the command was added inside a false conditional group.
    pub fn is_occult(&self) -> bool {
        self.occult
    }

    /// The command's options.
    pub fn options(&self) -> &CommandOptions<P> {
        &self.options
    }

    /// List membership, for commands generated from a command list.
    pub fn membership(&self) -> Option<&ListMembership> {
        self.membership.as_ref()
    }

    /// Run the command's callback.
    ///
    /// The handler is located with the command's finder; without one the
    /// project itself is the handler.
    pub fn invoke(&self, project: &P)
    where
        P: Send + Sync + 'static,
    {
        let context = CommandContext {
            project,
            command: &self.id,
            index: self.membership.as_ref().map(|membership| membership.index),
        };
        match &self.finder {
            Some(finder) => {
                let handler = finder(project);
                (self.callback)(handler.as_ref(), &context);
            }
            None => (self.callback)(project as &CommandHandler, &context),
        }
    }
}

impl<P> fmt::Debug for CommandEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("flags", &self.flags)
            .field("enabled", &self.enabled)
            .field("occult", &self.occult)
            .field("membership", &self.membership)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// CommandManager
// ============================================================================

/// Command table plus the menu bar under construction.
pub struct CommandManager<P> {
    menu_bar: Option<MenuBar>,
    menu_stack: Vec<Menu>,
    hiding_level: usize,
    entries: Vec<CommandEntry<P>>,
    by_id: HashMap<String, usize>,
}

impl<P> Default for CommandManager<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> CommandManager<P> {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            menu_bar: None,
            menu_stack: Vec::new(),
            hiding_level: 0,
            entries: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Start a new, empty menu bar. Top-level menus closed from now on are
    /// appended to it.
    pub fn add_menu_bar(&mut self, name: impl Into<String>) -> &mut MenuBar {
        self.menu_bar.insert(MenuBar::new(name))
    }

    /// The menu bar, once one was added.
    pub fn menu_bar(&self) -> Option<&MenuBar> {
        self.menu_bar.as_ref()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no command is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Commands in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry<P>> {
        self.entries.iter()
    }

    /// The command registered as `id`.
    pub fn entry(&self, id: &str) -> Option<&CommandEntry<P>> {
        self.by_id.get(id).map(|&index| &self.entries[index])
    }

    /// Whether `id` is registered and enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.entry(id).is_some_and(CommandEntry::is_enabled)
    }

    /// Change the label of `id`, in the table and in the menu bar. Returns
    /// whether the label changed.
    pub fn modify(&mut self, id: &str, label: impl Into<String>) -> bool {
        let label = label.into();
        let Some(&index) = self.by_id.get(id) else {
            tracing::trace!(target: targets::BUILDER, id, "modify of unknown command ignored");
            return false;
        };
        let entry = &mut self.entries[index];
        if entry.label == label {
            return false;
        }
        entry.label = label.clone();
        if let Some(command) = self
            .menu_bar
            .as_mut()
            .and_then(|menu_bar| menu_bar.find_command_mut(id))
        {
            command.label = label;
        }
        true
    }

    /// Enable or disable `id`. Occult commands stay disabled. Returns whether
    /// the state changed.
    pub fn enable(&mut self, id: &str, enabled: bool) -> bool {
        let Some(&index) = self.by_id.get(id) else {
            tracing::trace!(target: targets::BUILDER, id, "enable of unknown command ignored");
            return false;
        };
        let entry = &mut self.entries[index];
        let enabled = enabled && !entry.occult;
        if entry.enabled == enabled {
            return false;
        }
        entry.enabled = enabled;
        true
    }

    fn register_entry(&mut self, entry: CommandEntry<P>, command: MenuCommand) {
        if self.by_id.contains_key(&entry.id) {
            tracing::error!(target: targets::BUILDER, id = %entry.id, "duplicate command identifier");
            debug_assert!(false, "duplicate command identifier '{}'", entry.id);
            return;
        }
        let Some(menu) = self.menu_stack.last_mut() else {
            tracing::error!(target: targets::BUILDER, id = %entry.id, "command added outside any menu");
            debug_assert!(false, "command '{}' added outside any menu", entry.id);
            return;
        };
        menu.add_command(command);
        self.by_id.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
    }

    fn is_hiding(&self) -> bool {
        self.hiding_level > 0
    }
}

impl<P> MenuBuilder<P> for CommandManager<P> {
    fn begin_menu(&mut self, title: &str) {
        let mut menu = Menu::new(title);
        menu.set_occult(self.is_hiding());
        self.menu_stack.push(menu);
    }

    fn end_menu(&mut self) {
        let Some(menu) = self.menu_stack.pop() else {
            tracing::error!(target: targets::BUILDER, "end_menu without an open menu");
            debug_assert!(false, "end_menu without an open menu");
            return;
        };
        if let Some(parent) = self.menu_stack.last_mut() {
            parent.add_submenu(menu);
        } else if let Some(menu_bar) = self.menu_bar.as_mut() {
            menu_bar.add_menu(menu);
        } else {
            tracing::error!(target: targets::BUILDER, title = menu.title(), "menu closed with no menu bar");
            debug_assert!(false, "menu closed with no menu bar");
        }
    }

    fn begin_occult_commands(&mut self) {
        self.hiding_level += 1;
    }

    fn end_occult_commands(&mut self) {
        self.hiding_level = self.hiding_level.saturating_sub(1);
    }

    fn add_item(&mut self, project: &P, item: &CommandItem<P>) {
        let occult = self.is_hiding();
        let command = MenuCommand {
            id: item.name.clone(),
            label: item.label.clone(),
            accel: item.options.accel().map(str::to_string),
            checked: item.options.checked(project),
            occult,
        };
        let entry = CommandEntry {
            id: item.name.clone(),
            label: item.label.clone(),
            flags: item.flags,
            enabled: !occult,
            occult,
            options: item.options.clone(),
            membership: None,
            finder: item.finder.clone(),
            callback: item.callback.clone(),
        };
        self.register_entry(entry, command);
    }

    fn add_item_list(&mut self, item: &CommandGroupItem<P>) {
        let occult = self.is_hiding();
        for (index, symbol) in item.items.iter().enumerate() {
            let command = MenuCommand {
                occult,
                ..MenuCommand::new(symbol.internal.clone(), symbol.label.clone())
            };
            let entry = CommandEntry {
                id: symbol.internal.clone(),
                label: symbol.label.clone(),
                flags: item.flags,
                enabled: !occult,
                occult,
                options: CommandOptions::new(),
                membership: Some(ListMembership {
                    list: item.name.clone(),
                    index,
                    is_effect: item.is_effect,
                }),
                finder: item.finder.clone(),
                callback: item.callback.clone(),
            };
            self.register_entry(entry, command);
        }
    }

    fn add_separator(&mut self) {
        if self.is_hiding() {
            return;
        }
        if let Some(menu) = self.menu_stack.last_mut() {
            menu.add_separator();
        }
    }

    fn current_menu(&mut self) -> Option<&mut Menu> {
        self.menu_stack.last_mut()
    }

    fn enable_using_flags(&mut self, lax: CommandFlag, strict: CommandFlag) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            if entry.occult || entry.flags.none() {
                continue;
            }
            let available = if entry.options.uses_strict_flags() {
                strict
            } else {
                lax
            };
            let enabled = available.contains(entry.flags);
            if entry.enabled != enabled {
                entry.enabled = enabled;
                changed += 1;
            }
        }
        tracing::trace!(target: targets::BUILDER, changed, "applied command flags");
        changed
    }

    fn purge_data(&mut self) {
        tracing::debug!(target: targets::BUILDER, commands = self.entries.len(), "purging command data");
        self.menu_bar = None;
        self.menu_stack.clear();
        self.hiding_level = 0;
        self.entries.clear();
        self.by_id.clear();
    }
}

impl<P> fmt::Debug for CommandManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("menu_bar", &self.menu_bar)
            .field("open_menus", &self.menu_stack.len())
            .field("hiding_level", &self.hiding_level)
            .field("entries", &self.entries)
            .finish()
    }
}
