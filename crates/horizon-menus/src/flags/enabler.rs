//! Recovery rules that can make a refused command admissible.
//!
//! An enabler says: "when `actual_flags` already hold and the rule is
//! applicable, running `try_enable` can make `possible_flags` true". The
//! classic example selects every track when a command needs a selection and
//! nothing is selected.

use std::fmt;
use std::sync::Arc;

use super::command_flag::CommandFlag;

/// Gate deciding whether an enabler may be offered for a project at all.
pub type ApplicablePredicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;

/// Side-effecting recovery action. Receives the flags the command requires.
pub type TryEnableFn<P> = Arc<dyn Fn(&P, CommandFlag) + Send + Sync>;

/// One registered recovery rule.
pub struct MenuItemEnabler<P> {
    actual_flags: CommandFlag,
    possible_flags: CommandFlag,
    applicable: ApplicablePredicate<P>,
    try_enable: TryEnableFn<P>,
}

impl<P> MenuItemEnabler<P> {
    /// Create an enabler from its precondition, the flags it can supply, its
    /// applicability gate and its action.
    pub fn new<A, T>(
        actual_flags: CommandFlag,
        possible_flags: CommandFlag,
        applicable: A,
        try_enable: T,
    ) -> Self
    where
        A: Fn(&P) -> bool + Send + Sync + 'static,
        T: Fn(&P, CommandFlag) + Send + Sync + 'static,
    {
        Self {
            actual_flags,
            possible_flags,
            applicable: Arc::new(applicable),
            try_enable: Arc::new(try_enable),
        }
    }

    /// Flags that must already hold before this enabler is tried.
    pub fn actual_flags(&self) -> CommandFlag {
        self.actual_flags
    }

    /// Flags this enabler can make true.
    pub fn possible_flags(&self) -> CommandFlag {
        self.possible_flags
    }

    /// Evaluate the applicability gate.
    pub fn is_applicable(&self, project: &P) -> bool {
        (self.applicable)(project)
    }

    /// Whether the precondition is met by `flags`.
    pub fn precondition_met(&self, flags: CommandFlag) -> bool {
        flags.contains(self.actual_flags)
    }

    /// Whether running this enabler could supply a bit of `required` that is
    /// missing from `flags`, given that its precondition holds.
    pub fn can_supply(&self, flags: CommandFlag, required: CommandFlag) -> bool {
        self.precondition_met(flags) && required.missing_from(flags).intersects(self.possible_flags)
    }

    /// Run the recovery action.
    pub fn try_enable(&self, project: &P, required: CommandFlag) {
        (self.try_enable)(project, required)
    }
}

impl<P> fmt::Debug for MenuItemEnabler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItemEnabler")
            .field("actual_flags", &self.actual_flags)
            .field("possible_flags", &self.possible_flags)
            .finish_non_exhaustive()
    }
}

/// Enablers in the order they are tried.
pub struct EnablerRegistry<P> {
    enablers: Vec<MenuItemEnabler<P>>,
}

impl<P> Default for EnablerRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EnablerRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            enablers: Vec::new(),
        }
    }

    /// Append an enabler. Registration order is trial order.
    pub fn register(&mut self, enabler: MenuItemEnabler<P>) {
        self.enablers.push(enabler);
    }

    /// Enablers in trial order.
    pub fn iter(&self) -> impl Iterator<Item = &MenuItemEnabler<P>> {
        self.enablers.iter()
    }

    /// Number of registered enablers.
    pub fn len(&self) -> usize {
        self.enablers.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.enablers.is_empty()
    }

    /// The speculative flag set: `flags` plus everything an applicable enabler
    /// whose precondition holds could supply.
    pub fn speculative_flags(&self, project: &P, flags: CommandFlag) -> CommandFlag {
        self.enablers
            .iter()
            .filter(|enabler| enabler.is_applicable(project) && enabler.precondition_met(flags))
            .fold(flags, |acc, enabler| acc | enabler.possible_flags)
    }
}

impl<P> fmt::Debug for EnablerRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.enablers.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(indices: &[usize]) -> CommandFlag {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_can_supply_requires_precondition() {
        let enabler =
            MenuItemEnabler::<()>::new(bits(&[0]), bits(&[1]), |_| true, |_, _| {});

        assert!(enabler.can_supply(bits(&[0]), bits(&[1])));
        assert!(!enabler.can_supply(bits(&[]), bits(&[1])));
        // Nothing missing that the enabler could supply.
        assert!(!enabler.can_supply(bits(&[0, 1]), bits(&[1])));
        assert!(!enabler.can_supply(bits(&[0]), bits(&[2])));
    }

    #[test]
    fn test_speculative_flags() {
        let mut registry = EnablerRegistry::<bool>::new();
        registry.register(MenuItemEnabler::new(
            bits(&[0]),
            bits(&[1, 2]),
            |_| true,
            |_, _| {},
        ));
        registry.register(MenuItemEnabler::new(
            bits(&[3]),
            bits(&[4]),
            |_| true,
            |_, _| {},
        ));
        registry.register(MenuItemEnabler::new(
            bits(&[]),
            bits(&[5]),
            |applicable: &bool| *applicable,
            |_, _| {},
        ));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.speculative_flags(&false, bits(&[0])), bits(&[0, 1, 2]));
        assert_eq!(registry.speculative_flags(&true, bits(&[0])), bits(&[0, 1, 2, 5]));
        assert_eq!(registry.speculative_flags(&false, bits(&[3])), bits(&[3, 4]));
    }
}
