//! Undo and Redo menu labels.
//!
//! The Undo and Redo commands are relabelled from the undo history ("&Undo
//! Amplify") and enabled from its availability whenever the history reports
//! a change that moves the current state.

use std::sync::{Arc, Weak};

use horizon_menus_core::logging::targets;
use horizon_menus_core::{ConnectionGuard, Signal};

use crate::manager::MenuManager;

/// Identifier of the Undo command.
pub const UNDO_COMMAND: &str = "Undo";

/// Identifier of the Redo command.
pub const REDO_COMMAND: &str = "Redo";

/// Kinds of undo history change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoRedoMessageType {
    /// A new state was pushed.
    Pushed,
    /// The current state was modified in place.
    Modified,
    /// The current state's description changed.
    Renamed,
    /// The current state moved backwards or forwards.
    UndoOrRedo,
    /// The history was cleared.
    Reset,
    /// States were discarded.
    Purge,
    /// A batch of purges begins.
    BeginPurge,
    /// A batch of purges ended.
    EndPurge,
}

impl UndoRedoMessageType {
    /// Whether this change can alter the Undo/Redo labels.
    pub fn affects_menus(self) -> bool {
        matches!(
            self,
            Self::Pushed | Self::Renamed | Self::UndoOrRedo | Self::Reset
        )
    }
}

/// A change notification from the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRedoMessage {
    /// What happened.
    pub kind: UndoRedoMessageType,
}

impl UndoRedoMessage {
    /// Create a message.
    pub fn new(kind: UndoRedoMessageType) -> Self {
        Self { kind }
    }
}

/// Read access to a project's undo history.
pub trait UndoHistory: Send + Sync {
    /// Whether there is a state to undo to.
    fn undo_available(&self) -> bool;

    /// Whether there is a state to redo to.
    fn redo_available(&self) -> bool;

    /// Index of the current state.
    fn current_state(&self) -> usize;

    /// Short description of the state at `index`.
    fn short_description(&self, index: usize) -> Option<String>;

    /// Change notifications.
    fn messages(&self) -> &Signal<UndoRedoMessage>;
}

fn label(verb: &str, description: Option<String>) -> String {
    match description {
        Some(description) if !description.is_empty() => format!("&{verb} {description}"),
        _ => format!("&{verb}"),
    }
}

/// Relabel and enable the Undo and Redo commands from `history`.
///
/// Undo names the current state, the one undoing would leave; Redo names
/// the state after it.
pub fn modify_undo_menu_items<P, H>(manager: &MenuManager<P>, history: &H)
where
    P: Send + Sync + 'static,
    H: UndoHistory + ?Sized,
{
    let current = history.current_state();

    let undo_available = history.undo_available();
    let undo_label = if undo_available {
        label("Undo", history.short_description(current))
    } else {
        label("Undo", None)
    };
    manager.modify_command(UNDO_COMMAND, undo_label);
    manager.enable_command(UNDO_COMMAND, undo_available);

    let redo_available = history.redo_available();
    let redo_label = if redo_available {
        label("Redo", history.short_description(current + 1))
    } else {
        label("Redo", None)
    };
    manager.modify_command(REDO_COMMAND, redo_label);
    manager.enable_command(REDO_COMMAND, redo_available);

    tracing::trace!(
        target: targets::UNDO,
        current,
        undo_available,
        redo_available,
        "undo menu items updated"
    );
}

/// React to a history change. Returns whether the message was handled.
pub fn on_undo_redo<P, H>(manager: &MenuManager<P>, history: &H, message: UndoRedoMessage) -> bool
where
    P: Send + Sync + 'static,
    H: UndoHistory + ?Sized,
{
    if !message.kind.affects_menus() {
        return false;
    }
    modify_undo_menu_items(manager, history);
    manager.update_menus(true);
    true
}

/// Keeps a manager's Undo/Redo items in sync with a history.
///
/// Holds only weak references; dropping the updater disconnects it.
pub struct UndoMenuUpdater {
    connection: ConnectionGuard<UndoRedoMessage>,
}

impl UndoMenuUpdater {
    /// Subscribe `manager` to `history`'s change notifications.
    pub fn attach<P, H>(manager: &Arc<MenuManager<P>>, history: &Arc<H>) -> Self
    where
        P: Send + Sync + 'static,
        H: UndoHistory + 'static,
    {
        let weak_manager: Weak<MenuManager<P>> = Arc::downgrade(manager);
        let weak_history: Weak<H> = Arc::downgrade(history);
        let connection = history.messages().connect_scoped(move |message: &UndoRedoMessage| {
            let (Some(manager), Some(history)) = (weak_manager.upgrade(), weak_history.upgrade())
            else {
                return;
            };
            on_undo_redo(manager.as_ref(), history.as_ref(), *message);
        });
        Self { connection }
    }
}

impl std::fmt::Debug for UndoMenuUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoMenuUpdater")
            .field("connected", &self.connection.is_connected())
            .finish()
    }
}
