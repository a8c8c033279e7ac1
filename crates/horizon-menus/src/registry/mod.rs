//! Declarative menu registry.
//!
//! - [`Item`] and friends: the closed set of item kinds.
//! - [`ItemRegistry`]: static tree plus path-registered contributions.
//! - [`OrderingPreferences`]: per-path order overrides.
//! - [`SeparatorTracker`] and [`SeparatingVisitor`]: separator placement
//!   during a walk.

mod item;
mod item_registry;
mod ordering;
mod visitor;

pub use item::{
    CheckPredicate, CommandContext, CommandFunctor, CommandGroupItem, CommandHandler,
    CommandHandlerFinder, CommandItem, CommandOptions, Condition, GroupItem, GroupKind, Item,
    ItemSymbol, LeafItem, Properties, SpecialFn, SpecialItem,
};
pub use item_registry::{ItemRegistry, ItemVisitor, MENU_PATH_START};
pub use ordering::{normalize_path, OrderingPreferences};
pub use visitor::{MenuVisitor, SeparatingVisitor, SeparatorTracker};
