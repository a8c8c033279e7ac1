//! Registry-driven menus for Horizon applications.
//!
//! This crate builds a project's menu bar from a declarative item tree and
//! decides which commands are usable:
//!
//! - **Item Registry**: A static tree of menus, sections and commands, plus
//!   items contributed at paths by other modules
//! - **Ordering**: Per-path order overrides read from preferences
//! - **Separators**: Section and group boundaries become separators without
//!   doubles, leading or trailing ones
//! - **Command Flags**: Named preconditions, evaluated once per update and
//!   compared against each command's requirements
//! - **Recovery**: Enablers that make a missing precondition hold (select
//!   all, stop playback) before a command runs
//! - **Explanations**: The most relevant message when a command is refused
//! - **Undo/Redo**: Labels that follow the undo history
//!
//! The central type is [`MenuManager`]; see its module for an example.
//!
//! # Flags
//!
//! A command requiring [`ALWAYS_ENABLED_FLAG`] is always usable. Flags that
//! are cheap to test can be marked quick; the others are only recomputed
//! while the project window is active.

pub mod flags;
pub mod manager;
pub mod menu;
pub mod prefs;
pub mod registry;
pub mod undo;

mod error;

pub use error::{Error, Result};
pub use flags::{CommandFlag, CommandFlagOptions, CommandFlagRegistry, ALWAYS_ENABLED_FLAG};
pub use manager::{MenuManager, MenuManagerBuilder};
pub use prefs::{MenuPreferences, WhatIfNoSelection};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::flags::{
        CommandFlag, CommandFlagOptions, CommandFlagRegistry, EnablerRegistry, MenuItemEnabler,
        ALWAYS_ENABLED_FLAG,
    };
    pub use crate::manager::{
        DisallowedExplanation, ErrorDialog, MenuManager, MenuManagerBuilder, ProjectWindow,
        STANDARD_MENU_ORDERING,
    };
    pub use crate::menu::{CommandManager, Menu, MenuBar, MenuBuilder, MenuEntry, MenuTreeDebug};
    pub use crate::prefs::{MenuPreferences, WhatIfNoSelection};
    pub use crate::registry::{
        CommandContext, CommandGroupItem, CommandItem, CommandOptions, GroupKind, Item,
        ItemRegistry, MenuVisitor, OrderingPreferences, Properties, SpecialItem,
    };
    pub use crate::undo::{UndoHistory, UndoMenuUpdater, UndoRedoMessage, UndoRedoMessageType};
    pub use crate::{Error, Result};
}
