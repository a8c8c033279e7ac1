//! The event contract between the registry walk and a menu toolkit.

use crate::flags::CommandFlag;
use crate::registry::{CommandGroupItem, CommandItem};

use super::model::Menu;

/// Consumer of menu-construction events.
///
/// [`CommandManager`](super::CommandManager) is the in-memory implementation;
/// a toolkit adapter either wraps it or implements this trait directly.
/// Events arrive balanced: every `begin_menu` has a matching `end_menu` and
/// every `begin_occult_commands` a matching `end_occult_commands`.
pub trait MenuBuilder<P> {
    /// Open a (sub)menu with the given title.
    fn begin_menu(&mut self, title: &str);

    /// Close the innermost open menu.
    fn end_menu(&mut self);

    /// Start a region whose commands are registered but hidden and disabled.
    /// Regions nest.
    fn begin_occult_commands(&mut self);

    /// End the innermost occult region.
    fn end_occult_commands(&mut self);

    /// Add a single command to the open menu.
    fn add_item(&mut self, project: &P, item: &CommandItem<P>);

    /// Add every member of a command list to the open menu.
    fn add_item_list(&mut self, item: &CommandGroupItem<P>);

    /// Add a separator to the open menu.
    fn add_separator(&mut self);

    /// The innermost open menu, if any.
    fn current_menu(&mut self) -> Option<&mut Menu>;

    /// Enable or disable every command from the current flags. `lax` applies
    /// to ordinary commands, `strict` to commands that opted into strict
    /// flags. Returns how many commands changed state.
    fn enable_using_flags(&mut self, lax: CommandFlag, strict: CommandFlag) -> usize;

    /// Forget all commands and menus before a rebuild.
    fn purge_data(&mut self);
}
