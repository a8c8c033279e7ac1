//! Command flags: preconditions, their registry, and recovery enablers.
//!
//! The evaluation and admissibility algorithms that consume these tables
//! live on [`MenuManager`](crate::MenuManager).

mod command_flag;
mod enabler;
mod registry;

pub use command_flag::{CommandFlag, ALWAYS_ENABLED_FLAG, COMMAND_FLAG_CAPACITY};
pub use enabler::{ApplicablePredicate, EnablerRegistry, MenuItemEnabler, TryEnableFn};
pub use registry::{
    CommandFlagOptions, CommandFlagRegistry, FlagPredicate, MessageFormatter, RegisteredFlag,
};
