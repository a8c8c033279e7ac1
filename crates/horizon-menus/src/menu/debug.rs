//! Text dumps of a built menu bar.
//!
//! ```
//! use horizon_menus::menu::{Menu, MenuBar, MenuCommand, MenuTreeDebug};
//! use horizon_menus_core::{TreeFormatOptions, TreeStyle};
//!
//! let mut edit = Menu::new("&Edit");
//! edit.add_command(MenuCommand::new("Undo", "&Undo"));
//! let mut menu_bar = MenuBar::new("appmenu");
//! menu_bar.add_menu(edit);
//!
//! let debug = MenuTreeDebug::with_options(TreeFormatOptions {
//!     style: TreeStyle::Ascii,
//!     ..Default::default()
//! });
//! let text = debug.format_menu_bar(&menu_bar).unwrap();
//! assert!(text.contains("`-- Undo [Undo]"));
//! ```

use std::fmt::Write;

use horizon_menus_core::{Result as CoreResult, TreeFormatOptions};

use super::command_manager::CommandManager;
use super::model::{Menu, MenuBar, MenuEntry};

/// Renders menu bars as indented trees.
#[derive(Debug, Clone, Default)]
pub struct MenuTreeDebug {
    options: TreeFormatOptions,
}

impl MenuTreeDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a menu bar's structure.
    pub fn format_menu_bar(&self, menu_bar: &MenuBar) -> CoreResult<String> {
        self.format(menu_bar, &|_| None)
    }

    /// Format the manager's menu bar, annotated with each command's state
    /// when [`TreeFormatOptions::show_state`] is set.
    pub fn format_commands<P>(&self, commands: &CommandManager<P>) -> CoreResult<String> {
        let Some(menu_bar) = commands.menu_bar() else {
            return Ok("MenuBar (none)\n".to_string());
        };
        self.format(menu_bar, &|id| {
            commands.entry(id).map(|entry| {
                let state = if entry.is_occult() {
                    "occult"
                } else if entry.is_enabled() {
                    "enabled"
                } else {
                    "disabled"
                };
                format!("{state}, requires {:?}", entry.flags())
            })
        })
    }

    fn format(
        &self,
        menu_bar: &MenuBar,
        state_of: &dyn Fn(&str) -> Option<String>,
    ) -> CoreResult<String> {
        let mut output = String::new();
        writeln!(
            output,
            "MenuBar '{}' ({} menus):",
            menu_bar.name(),
            menu_bar.menus().len()
        )?;
        let count = menu_bar.menus().len();
        for (i, menu) in menu_bar.menus().iter().enumerate() {
            self.format_menu_into(menu, 1, i + 1 == count, state_of, &mut output)?;
        }
        Ok(output)
    }

    fn format_menu_into(
        &self,
        menu: &Menu,
        depth: usize,
        is_last: bool,
        state_of: &dyn Fn(&str) -> Option<String>,
        output: &mut String,
    ) -> CoreResult<()> {
        if !self.options.within_depth(depth) {
            return Ok(());
        }
        output.push_str(&self.options.prefix(depth, is_last));
        output.push_str(&menu.display_title());
        if self.options.show_state && menu.is_occult() {
            output.push_str(" (occult)");
        }
        output.push('\n');

        let count = menu.len();
        for (i, entry) in menu.entries().iter().enumerate() {
            let child_is_last = i + 1 == count;
            match entry {
                MenuEntry::Submenu(submenu) => {
                    self.format_menu_into(submenu, depth + 1, child_is_last, state_of, output)?;
                }
                MenuEntry::Separator => {
                    if self.options.within_depth(depth + 1) {
                        writeln!(output, "{}----", self.options.prefix(depth + 1, child_is_last))?;
                    }
                }
                MenuEntry::Command(command) => {
                    if !self.options.within_depth(depth + 1) {
                        continue;
                    }
                    output.push_str(&self.options.prefix(depth + 1, child_is_last));
                    output.push_str(&command.display_text());
                    if self.options.show_ids {
                        write!(output, " [{}]", command.id)?;
                    }
                    if let Some(accel) = &command.accel {
                        write!(output, " <{accel}>")?;
                    }
                    if self.options.show_state {
                        if let Some(state) = state_of(&command.id) {
                            write!(output, " ({state})")?;
                        }
                    }
                    output.push('\n');
                }
            }
        }
        Ok(())
    }
}
