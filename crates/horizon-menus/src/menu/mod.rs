//! Menu construction.
//!
//! - [`MenuBuilder`]: the event contract a toolkit adapter honors.
//! - [`CommandManager`]: in-memory builder and command table.
//! - [`MenuItemVisitor`]: feeds a builder from a registry walk.
//! - [`MenuBar`], [`Menu`], [`MenuEntry`]: the toolkit-independent result.
//! - [`MenuTreeDebug`]: text dumps for logs and tests.

mod builder;
mod command_manager;
mod creator;
mod debug;
mod model;

pub use builder::MenuBuilder;
pub use command_manager::{CommandEntry, CommandManager, ListMembership};
pub use creator::MenuItemVisitor;
pub use debug::MenuTreeDebug;
pub use model::{strip_mnemonic, Menu, MenuBar, MenuCommand, MenuEntry};
