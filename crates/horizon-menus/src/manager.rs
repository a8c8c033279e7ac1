//! Per-project menu state and the command-flag engine.
//!
//! A [`MenuManager`] owns one project's command table and menu bar. It
//! builds them from the shared [`ItemRegistry`], recomputes the
//! [`CommandFlag`] set from the registered predicates, pushes enable state
//! to every command, runs recovery enablers before a gated command executes,
//! and explains refusals to the user.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! use horizon_menus::prelude::*;
//!
//! struct Project {
//!     has_tracks: AtomicBool,
//! }
//!
//! let mut flags = CommandFlagRegistry::<Project>::new();
//! let tracks_exist = flags
//!     .register(
//!         "TracksExist",
//!         |project: &Project| project.has_tracks.load(Ordering::SeqCst),
//!         CommandFlagOptions::new(),
//!     )
//!     .unwrap();
//!
//! let items = ItemRegistry::new(vec![Item::menu("Tracks", "&Tracks", vec![
//!     Item::command(CommandItem::new("MixAndRender", "Mi&x and Render", |_, _| {}, tracks_exist)),
//! ])]);
//!
//! let project = Arc::new(Project { has_tracks: AtomicBool::new(false) });
//! let manager = MenuManager::builder(project.clone())
//!     .with_items(items)
//!     .with_flags(flags)
//!     .build();
//! manager.create_menus_and_commands();
//!
//! manager.update_menus(false);
//! assert!(!manager.commands().is_enabled("MixAndRender"));
//!
//! project.has_tracks.store(true, Ordering::SeqCst);
//! manager.update_menus(false);
//! assert!(manager.commands().is_enabled("MixAndRender"));
//! ```

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};

use horizon_menus_core::logging::{span_names, targets};
use horizon_menus_core::{PerfSpan, Signal};

use crate::flags::{CommandFlag, CommandFlagRegistry, EnablerRegistry};
use crate::menu::{strip_mnemonic, CommandManager, MenuBuilder, MenuItemVisitor};
use crate::prefs::{MenuPreferences, WhatIfNoSelection};
use crate::registry::{ItemRegistry, MenuVisitor, OrderingPreferences, SeparatingVisitor};

/// Name of the menu bar every project gets.
pub const APP_MENU_BAR: &str = "appmenu";

/// Title of the refusal dialog when no flag supplies one.
pub const DEFAULT_DISALLOWED_TITLE: &str = "Disallowed";

/// Refusal message when no missing flag supplies one.
pub const DEFAULT_DISALLOWED_MESSAGE: &str = "There was a problem with your last action. If you think\nthis is a bug, please tell us exactly where it occurred.";

/// Conventional top-level and submenu orderings, suitable for
/// [`MenuManagerBuilder::with_default_ordering`].
pub const STANDARD_MENU_ORDERING: &[(&str, &str)] = &[
    (
        "",
        "File,Edit,Select,View,Transport,Tracks,Generate,Effect,Analyze,Tools,Window,Optional,Help",
    ),
    ("/View/Windows", "UndoHistory,Karaoke,MixerBoard"),
    ("/Analyze/Analyzers/Windows", "ContrastAnalyser,PlotSpectrum"),
    ("/Transport/Basic", "Play,Record,Scrubbing,Cursor"),
    (
        "/Tracks/Add/Add",
        "NewMonoTrack,NewStereoTrack,NewLabelTrack,NewTimeTrack",
    ),
];

// ============================================================================
// Collaborators
// ============================================================================

/// The window a project's menus are attached to.
pub trait ProjectWindow: Send + Sync {
    /// Whether the window currently has focus.
    fn is_active(&self) -> bool;
}

impl<F> ProjectWindow for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_active(&self) -> bool {
        self()
    }
}

/// Presentation of the "why disallowed" dialog.
pub trait ErrorDialog: Send + Sync {
    /// Show a dialog with a title, a message and an optional help reference.
    fn show_error_dialog(&self, title: &str, message: &str, help_page: Option<&str>);
}

/// Dialog stand-in that only logs.
struct LogDialog;

impl ErrorDialog for LogDialog {
    fn show_error_dialog(&self, title: &str, message: &str, help_page: Option<&str>) {
        tracing::warn!(target: targets::FLAGS, title, message, help_page, "command disallowed");
    }
}

/// What the refusal dialog says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisallowedExplanation {
    /// Dialog title.
    pub title: String,
    /// Dialog body.
    pub message: String,
    /// Help reference, if the explaining flag has one.
    pub help_page: Option<String>,
}

// ============================================================================
// MenuManagerBuilder
// ============================================================================

/// Builder for [`MenuManager`].
pub struct MenuManagerBuilder<P> {
    project: Arc<P>,
    window: Arc<dyn ProjectWindow>,
    dialogs: Arc<dyn ErrorDialog>,
    items: Arc<ItemRegistry<P>>,
    flags: Arc<CommandFlagRegistry<P>>,
    enablers: Arc<EnablerRegistry<P>>,
    preferences: MenuPreferences,
    default_ordering: Vec<(String, String)>,
}

impl<P: Send + Sync + 'static> MenuManagerBuilder<P> {
    fn new(project: Arc<P>) -> Self {
        Self {
            project,
            window: Arc::new(|| true),
            dialogs: Arc::new(LogDialog),
            items: Arc::new(ItemRegistry::default()),
            flags: Arc::new(CommandFlagRegistry::new()),
            enablers: Arc::new(EnablerRegistry::new()),
            preferences: MenuPreferences::default(),
            default_ordering: Vec::new(),
        }
    }

    /// Set the menu item tree. Registries may be shared between projects.
    pub fn with_items(mut self, items: impl Into<Arc<ItemRegistry<P>>>) -> Self {
        self.items = items.into();
        self
    }

    /// Set the command flag table.
    pub fn with_flags(mut self, flags: impl Into<Arc<CommandFlagRegistry<P>>>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Set the recovery enablers.
    pub fn with_enablers(mut self, enablers: impl Into<Arc<EnablerRegistry<P>>>) -> Self {
        self.enablers = enablers.into();
        self
    }

    /// Set the window used for focus checks. Defaults to always active.
    pub fn with_window(mut self, window: Arc<dyn ProjectWindow>) -> Self {
        self.window = window;
        self
    }

    /// Set the refusal dialog. Defaults to logging at warn level.
    pub fn with_dialogs(mut self, dialogs: Arc<dyn ErrorDialog>) -> Self {
        self.dialogs = dialogs;
        self
    }

    /// Set the initial preferences.
    pub fn with_preferences(mut self, preferences: MenuPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Orderings applied wherever the preferences give none.
    pub fn with_default_ordering<'a, I>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.default_ordering = defaults
            .into_iter()
            .map(|(path, order)| (path.to_string(), order.to_string()))
            .collect();
        self
    }

    /// Build the manager. Menus are not created until
    /// [`MenuManager::create_menus_and_commands`] is called.
    pub fn build(self) -> Arc<MenuManager<P>> {
        let manager = MenuManager {
            project: self.project,
            window: self.window,
            dialogs: self.dialogs,
            items: self.items,
            flags: self.flags,
            enablers: self.enablers,
            default_ordering: self.default_ordering,
            ordering: RwLock::new(OrderingPreferences::new()),
            commands: RwLock::new(CommandManager::new()),
            what_if_no_selection: RwLock::new(WhatIfNoSelection::default()),
            stop_if_was_paused: true,
            flag_cache: Mutex::new(CommandFlag::empty()),
            last_published: Mutex::new(None),
            menus_updated: Signal::new(),
            command_changed: Signal::new(),
        };
        manager.update_prefs(&self.preferences);
        Arc::new(manager)
    }
}

// ============================================================================
// MenuManager
// ============================================================================

/// Menu state of one project.
///
/// Registry callbacks (conditions, special items, checkers) run while the
/// command table is locked for writing and must not call back into the
/// manager. Flag predicates and enablers run with no lock held.
///
/// # Signals
///
/// - [`menus_updated`](MenuManager::menus_updated): after each enable push
/// - [`command_changed`](MenuManager::command_changed): after a command's
///   label or enabled state changed through the manager
pub struct MenuManager<P> {
    project: Arc<P>,
    window: Arc<dyn ProjectWindow>,
    dialogs: Arc<dyn ErrorDialog>,
    items: Arc<ItemRegistry<P>>,
    flags: Arc<CommandFlagRegistry<P>>,
    enablers: Arc<EnablerRegistry<P>>,
    default_ordering: Vec<(String, String)>,
    ordering: RwLock<OrderingPreferences>,
    commands: RwLock<CommandManager<P>>,
    what_if_no_selection: RwLock<WhatIfNoSelection>,
    stop_if_was_paused: bool,
    /// Result of the last flag computation, reused for non-quick bits while
    /// the window is inactive.
    flag_cache: Mutex<CommandFlag>,
    /// Flags last pushed to the commands; `None` until the first push after
    /// a (re)build.
    last_published: Mutex<Option<CommandFlag>>,

    /// Emitted after enable states were pushed to the commands.
    pub menus_updated: Signal<()>,

    /// Emitted with the command id after a label or enabled state changed.
    pub command_changed: Signal<String>,
}

impl<P: Send + Sync + 'static> MenuManager<P> {
    /// Start building a manager for `project`.
    pub fn builder(project: Arc<P>) -> MenuManagerBuilder<P> {
        MenuManagerBuilder::new(project)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The project.
    pub fn project(&self) -> &Arc<P> {
        &self.project
    }

    /// Read access to the command table and menu bar.
    pub fn commands(&self) -> RwLockReadGuard<'_, CommandManager<P>> {
        self.commands.read()
    }

    /// The command flag table.
    pub fn flag_registry(&self) -> &CommandFlagRegistry<P> {
        &self.flags
    }

    /// The recovery enablers.
    pub fn enablers(&self) -> &EnablerRegistry<P> {
        &self.enablers
    }

    /// The item tree.
    pub fn items(&self) -> &ItemRegistry<P> {
        &self.items
    }

    /// A snapshot of the effective ordering overrides.
    pub fn ordering(&self) -> OrderingPreferences {
        self.ordering.read().clone()
    }

    /// The current selection policy.
    pub fn what_if_no_selection(&self) -> WhatIfNoSelection {
        *self.what_if_no_selection.read()
    }

    /// Whether a paused transport is stopped before commands that need it
    /// stopped. Always true.
    pub fn stop_if_was_paused(&self) -> bool {
        self.stop_if_was_paused
    }

    /// The flags from the most recent computation.
    pub fn cached_flags(&self) -> CommandFlag {
        *self.flag_cache.lock()
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Apply new preferences: the selection policy and the ordering
    /// overrides, with the default orderings filling any gaps. Takes effect
    /// for ordering on the next rebuild.
    pub fn update_prefs(&self, preferences: &MenuPreferences) {
        let policy = preferences.what_if_no_selection();
        *self.what_if_no_selection.write() = policy;

        let mut ordering = preferences.ordering.clone();
        ordering.initialize_defaults(
            self.default_ordering
                .iter()
                .map(|(path, order)| (path.as_str(), order.as_str())),
        );
        *self.ordering.write() = ordering;

        tracing::debug!(target: targets::PREFS, ?policy, "menu preferences updated");
    }

    // ========================================================================
    // Menu construction
    // ========================================================================

    /// Build the menu bar and command table from the item tree.
    #[tracing::instrument(skip_all, target = "horizon_menus::builder", level = "debug")]
    pub fn create_menus_and_commands(&self) {
        let _perf = PerfSpan::new(span_names::MENU_BUILD);

        for path in self.items.unresolved_paths() {
            tracing::warn!(
                target: targets::REGISTRY,
                path,
                "menu items registered at a path no group resolves to"
            );
        }

        let ordering = self.ordering();
        let command_count = {
            let mut commands = self.commands.write();
            commands.add_menu_bar(APP_MENU_BAR);
            let mut visitor =
                SeparatingVisitor::new(MenuItemVisitor::new(self.project.as_ref(), &mut *commands));
            self.items.visit(&ordering, &mut visitor);
            drop(visitor);
            commands.len()
        };

        *self.last_published.lock() = None;
        tracing::debug!(target: targets::BUILDER, commands = command_count, "menus created");
    }

    /// Discard the menu bar and command table, then build them again.
    pub fn rebuild_menu_bar(&self) {
        self.commands.write().purge_data();
        self.create_menus_and_commands();
    }

    /// Rebuild the menus of every given project.
    pub fn rebuild_all_menu_bars<'a, I>(managers: I)
    where
        I: IntoIterator<Item = &'a MenuManager<P>>,
    {
        for manager in managers {
            manager.rebuild_menu_bar();
        }
    }

    /// Walk the item tree with the current ordering, feeding `visitor` with
    /// separator-aware events. Returns the visitor.
    pub fn visit<V: MenuVisitor<P>>(&self, visitor: V) -> V {
        let ordering = self.ordering();
        let mut separating = SeparatingVisitor::new(visitor);
        self.items.visit(&ordering, &mut separating);
        separating.into_inner()
    }

    // ========================================================================
    // Flag evaluation
    // ========================================================================

    /// Evaluate the command flags.
    ///
    /// Quick-test flags are always evaluated. When `check_active` is set and
    /// the window is not active, every other flag keeps its value from the
    /// previous computation.
    #[tracing::instrument(skip_all, target = "horizon_menus::flags", level = "trace")]
    pub fn get_update_flags(&self, check_active: bool) -> CommandFlag {
        let project = self.project.as_ref();
        let quick = self.flags.quick_mask();

        let mut flags = CommandFlag::empty();
        for (index, flag) in self.flags.iter().enumerate() {
            if quick.test(index) && flag.holds(project) {
                flags.set(index, true);
            }
        }

        if check_active && !self.window.is_active() {
            flags |= self.cached_flags() & !quick;
        } else {
            for (index, flag) in self.flags.iter().enumerate() {
                if !quick.test(index) && flag.holds(project) {
                    flags.set(index, true);
                }
            }
        }

        *self.flag_cache.lock() = flags;
        flags
    }

    /// Recompute the flags and push enable state to every command.
    ///
    /// Returns `false` without touching any command when the flags equal the
    /// last pushed value.
    #[tracing::instrument(skip_all, target = "horizon_menus::flags", level = "trace")]
    pub fn update_menus(&self, check_active: bool) -> bool {
        let flags = self.get_update_flags(check_active);
        {
            let mut last = self.last_published.lock();
            if *last == Some(flags) {
                return false;
            }
            *last = Some(flags);
        }

        // Commands that one recovery step would make usable show enabled.
        let speculative = self.enablers.speculative_flags(self.project.as_ref(), flags);
        let (lax, strict) = if self.what_if_no_selection().uses_speculative_flags() {
            (speculative, flags)
        } else {
            (flags, flags)
        };

        let changed = self.commands.write().enable_using_flags(lax, strict);
        tracing::debug!(
            target: targets::FLAGS,
            flags = ?self.flags.describe(flags),
            changed,
            "menus updated"
        );
        self.menus_updated.emit(());
        true
    }

    // ========================================================================
    // Admissibility and recovery
    // ========================================================================

    /// Try to make `required` hold, running enablers in registration order.
    ///
    /// An empty `flags` is recomputed first. Each enabler whose precondition
    /// holds and which can supply a missing bit runs once; flags are
    /// recomputed after every run. The scan is a single pass: an enabler
    /// whose precondition only becomes true through a later enabler is not
    /// revisited.
    #[tracing::instrument(skip_all, target = "horizon_menus::flags", level = "debug")]
    pub fn try_to_make_action_allowed(&self, flags: &mut CommandFlag, required: CommandFlag) -> bool {
        if flags.none() {
            *flags = self.get_update_flags(false);
        }

        for (position, enabler) in self.enablers.iter().enumerate() {
            if flags.contains(required) {
                break;
            }
            if enabler.can_supply(*flags, required) {
                let _perf = PerfSpan::new(span_names::RECOVERY);
                tracing::debug!(
                    target: targets::FLAGS,
                    enabler = position,
                    missing = ?self.flags.describe(required.missing_from(*flags)),
                    "running recovery enabler"
                );
                enabler.try_enable(self.project.as_ref(), required);
                *flags = self.get_update_flags(false);
            }
        }

        flags.contains(required)
    }

    /// Recover if possible, otherwise explain the refusal. Returns whether
    /// the action may proceed. Enablers may have changed project state even
    /// when this returns `true`.
    pub fn report_if_action_not_allowed(
        &self,
        name: &str,
        flags: &mut CommandFlag,
        required: CommandFlag,
    ) -> bool {
        if self.try_to_make_action_allowed(flags, required) {
            return true;
        }
        self.tell_user_why_disallowed(name, *flags & required, required);
        false
    }

    /// Choose the refusal explanation for a command named `name`.
    ///
    /// Missing flags are consulted by descending priority, registration
    /// order breaking ties. The first with a message wins. Without one, the
    /// generic message is used unless a consulted flag suppresses it, in
    /// which case there is nothing to show.
    pub fn explain_disallowed(
        &self,
        name: &str,
        got: CommandFlag,
        required: CommandFlag,
    ) -> Option<DisallowedExplanation> {
        let missing = required.missing_from(got);
        let mut candidates: Vec<_> = self
            .flags
            .iter()
            .enumerate()
            .filter(|(index, _)| missing.test(*index))
            .map(|(_, flag)| flag.options())
            .collect();
        candidates.sort_by_key(|options| Reverse(options.priority()));

        let mut enable_default_message = true;
        for options in candidates {
            if let Some(message) = options.format_message(name) {
                let title = if options.title().is_empty() {
                    DEFAULT_DISALLOWED_TITLE
                } else {
                    options.title()
                };
                let help_page = Some(options.help_page())
                    .filter(|page| !page.is_empty())
                    .map(str::to_string);
                return Some(DisallowedExplanation {
                    title: title.to_string(),
                    message,
                    help_page,
                });
            }
            enable_default_message &= options.enable_default_message();
        }

        enable_default_message.then(|| DisallowedExplanation {
            title: DEFAULT_DISALLOWED_TITLE.to_string(),
            message: DEFAULT_DISALLOWED_MESSAGE.to_string(),
            help_page: None,
        })
    }

    /// Show the refusal dialog, if there is anything to show. Returns
    /// whether a dialog was shown.
    pub fn tell_user_why_disallowed(
        &self,
        name: &str,
        got: CommandFlag,
        required: CommandFlag,
    ) -> bool {
        match self.explain_disallowed(name, got, required) {
            Some(explanation) => {
                self.dialogs.show_error_dialog(
                    &explanation.title,
                    &explanation.message,
                    explanation.help_page.as_deref(),
                );
                true
            }
            None => {
                tracing::debug!(target: targets::FLAGS, command = name, "refusal dialog suppressed");
                false
            }
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Relabel a command. Emits [`command_changed`](Self::command_changed)
    /// when the label changed.
    pub fn modify_command(&self, id: &str, label: impl Into<String>) -> bool {
        let changed = self.commands.write().modify(id, label);
        if changed {
            self.command_changed.emit(id.to_string());
        }
        changed
    }

    /// Enable or disable a command. Emits
    /// [`command_changed`](Self::command_changed) when the state changed.
    pub fn enable_command(&self, id: &str, enabled: bool) -> bool {
        let changed = self.commands.write().enable(id, enabled);
        if changed {
            self.command_changed.emit(id.to_string());
        }
        changed
    }

    /// Invoke a command by id, gated on its required flags.
    ///
    /// Unknown, occult and disabled commands are not run. Commands with
    /// required flags go through
    /// [`report_if_action_not_allowed`](Self::report_if_action_not_allowed)
    /// first. Returns whether the callback ran.
    pub fn handle_command(&self, id: &str) -> bool {
        let Some(entry) = self.commands.read().entry(id).cloned() else {
            tracing::warn!(target: targets::BUILDER, id, "unknown command");
            return false;
        };
        if entry.is_occult() || !entry.is_enabled() {
            tracing::debug!(target: targets::BUILDER, id, "command not available");
            return false;
        }

        let required = entry.flags();
        if required.any() {
            let name = entry
                .options()
                .long_name()
                .map(str::to_string)
                .unwrap_or_else(|| strip_mnemonic(entry.label()));
            let mut flags = CommandFlag::empty();
            if !self.report_if_action_not_allowed(&name, &mut flags, required) {
                return false;
            }
        }

        entry.invoke(self.project.as_ref());
        true
    }
}

impl<P> fmt::Debug for MenuManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuManager")
            .field("flags", &*self.flags)
            .field("enablers", &self.enablers.len())
            .field("what_if_no_selection", &*self.what_if_no_selection.read())
            .field("stop_if_was_paused", &self.stop_if_was_paused)
            .field("last_published", &*self.last_published.lock())
            .finish_non_exhaustive()
    }
}
