//! Registration of named command flags.
//!
//! Every flag pairs a predicate over the project with [`CommandFlagOptions`]:
//! whether the predicate is cheap enough to run while the window is inactive,
//! and what to tell the user when a command is refused because the flag is
//! missing.

use std::fmt;
use std::sync::Arc;

use horizon_menus_core::logging::targets;

use super::command_flag::{CommandFlag, COMMAND_FLAG_CAPACITY};
use crate::error::{Error, Result};

/// Predicate deciding whether a flag currently holds for a project.
pub type FlagPredicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;

/// Builds the user-facing refusal message from the refused command's name.
pub type MessageFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Evaluation and explanation metadata for one flag.
#[derive(Clone)]
pub struct CommandFlagOptions {
    message: Option<MessageFormatter>,
    title: String,
    help_page: String,
    priority: u32,
    quick_test: bool,
    enable_default_message: bool,
}

impl Default for CommandFlagOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFlagOptions {
    /// Options with no message, priority zero, full (non-quick) evaluation and
    /// the generic fallback message allowed.
    pub fn new() -> Self {
        Self {
            message: None,
            title: String::new(),
            help_page: String::new(),
            priority: 0,
            quick_test: false,
            enable_default_message: true,
        }
    }

    /// Set the refusal message. The formatter receives the command's name.
    pub fn with_message<F>(mut self, message: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.message = Some(Arc::new(message));
        self
    }

    /// Set the dialog title used together with the message.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the help reference shown alongside the message.
    pub fn with_help_page(mut self, help_page: impl Into<String>) -> Self {
        self.help_page = help_page.into();
        self
    }

    /// Set the explanation priority. Higher priorities are consulted first.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark the predicate as cheap: it is evaluated even while the window is
    /// inactive.
    pub fn quick_test(mut self) -> Self {
        self.quick_test = true;
        self
    }

    /// Suppress the generic "there was a problem" dialog when this flag is
    /// missing and no other missing flag supplies a message.
    pub fn disable_default_message(mut self) -> Self {
        self.enable_default_message = false;
        self
    }

    /// The refusal message formatter, if any.
    pub fn message(&self) -> Option<&MessageFormatter> {
        self.message.as_ref()
    }

    /// Format the refusal message for `command_name`.
    pub fn format_message(&self, command_name: &str) -> Option<String> {
        self.message.as_ref().map(|message| message(command_name))
    }

    /// Dialog title; empty means "use the default title".
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Help reference; empty means none.
    pub fn help_page(&self) -> &str {
        &self.help_page
    }

    /// Explanation priority.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Whether the predicate is evaluated while the window is inactive.
    pub fn is_quick_test(&self) -> bool {
        self.quick_test
    }

    /// Whether the generic fallback message may be shown.
    pub fn enable_default_message(&self) -> bool {
        self.enable_default_message
    }
}

impl fmt::Debug for CommandFlagOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFlagOptions")
            .field("has_message", &self.message.is_some())
            .field("title", &self.title)
            .field("help_page", &self.help_page)
            .field("priority", &self.priority)
            .field("quick_test", &self.quick_test)
            .field("enable_default_message", &self.enable_default_message)
            .finish()
    }
}

/// A flag as stored in the registry.
pub struct RegisteredFlag<P> {
    name: String,
    predicate: FlagPredicate<P>,
    options: CommandFlagOptions,
}

impl<P> RegisteredFlag<P> {
    /// The flag's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flag's options.
    pub fn options(&self) -> &CommandFlagOptions {
        &self.options
    }

    /// Evaluate the predicate.
    pub fn holds(&self, project: &P) -> bool {
        (self.predicate)(project)
    }
}

/// Ordered table of every command flag known to the process.
///
/// Built once at startup by calling each feature's registration function in a
/// fixed order; the bit index of a flag is its registration position.
pub struct CommandFlagRegistry<P> {
    flags: Vec<RegisteredFlag<P>>,
    quick_mask: CommandFlag,
}

impl<P> Default for CommandFlagRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> CommandFlagRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            flags: Vec::new(),
            quick_mask: CommandFlag::empty(),
        }
    }

    /// Register a flag, returning the single-bit set that stands for it.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        predicate: F,
        options: CommandFlagOptions,
    ) -> Result<CommandFlag>
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        if self.flags.iter().any(|flag| flag.name == name) {
            return Err(Error::DuplicateFlagName(name));
        }
        let index = self.flags.len();
        if index >= COMMAND_FLAG_CAPACITY {
            return Err(Error::FlagCapacityExceeded {
                name,
                capacity: COMMAND_FLAG_CAPACITY,
            });
        }

        let flag = CommandFlag::single(index);
        if options.is_quick_test() {
            self.quick_mask |= flag;
        }
        tracing::debug!(
            target: targets::FLAGS,
            name = %name,
            index,
            quick = options.is_quick_test(),
            priority = options.priority(),
            "registered command flag"
        );
        self.flags.push(RegisteredFlag {
            name,
            predicate: Arc::new(predicate),
            options,
        });
        Ok(flag)
    }

    /// Number of registered flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Registered flags in bit order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredFlag<P>> {
        self.flags.iter()
    }

    /// The flag registered under `name`. Intended for diagnostics and tests.
    pub fn flag(&self, name: &str) -> Option<CommandFlag> {
        self.flags
            .iter()
            .position(|flag| flag.name == name)
            .map(CommandFlag::single)
    }

    /// Name of the flag at bit `index`.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.flags.get(index).map(|flag| flag.name.as_str())
    }

    /// Options of the flag at bit `index`.
    pub fn options_of(&self, index: usize) -> Option<&CommandFlagOptions> {
        self.flags.get(index).map(|flag| &flag.options)
    }

    /// All bits whose predicates are quick tests.
    pub fn quick_mask(&self) -> CommandFlag {
        self.quick_mask
    }

    /// Names of the set bits of `flags`, for logging.
    pub fn describe(&self, flags: CommandFlag) -> Vec<&str> {
        flags.iter().filter_map(|index| self.name_of(index)).collect()
    }
}

impl<P> fmt::Debug for CommandFlagRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFlagRegistry")
            .field("flags", &self.flags.iter().map(|flag| &flag.name).collect::<Vec<_>>())
            .field("quick_mask", &self.quick_mask)
            .finish()
    }
}
