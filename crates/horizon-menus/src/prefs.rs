//! Menu preferences.
//!
//! Preferences are plain data loaded from TOML:
//!
//! ```toml
//! [gui]
//! select_all_on_none = true
//!
//! [ordering]
//! "" = "File,Edit,Select,View"
//! "/View/Windows" = "UndoHistory,Karaoke"
//! ```
//!
//! Missing tables and keys fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use horizon_menus_core::logging::targets;

use crate::error::{Error, Result};
use crate::registry::OrderingPreferences;

/// What to do when a command needs a selection and there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum WhatIfNoSelection {
    /// Show such commands disabled.
    #[default]
    GreyOut = 0,
    /// Select everything automatically, then run the command.
    AutoSelect = 1,
    /// Keep such commands enabled and explain the refusal when invoked.
    Warn = 2,
}

impl WhatIfNoSelection {
    /// Derive the policy from the two preference switches.
    ///
    /// Without `select_all_on_none` commands are greyed out. With it they
    /// auto-select, or only warn when `never_auto_select` is also set.
    pub fn from_preferences(select_all_on_none: bool, never_auto_select: bool) -> Self {
        match (select_all_on_none, never_auto_select) {
            (false, _) => Self::GreyOut,
            (true, false) => Self::AutoSelect,
            (true, true) => Self::Warn,
        }
    }

    /// Whether commands are shown enabled on the promise of an enabler.
    pub fn uses_speculative_flags(self) -> bool {
        self != Self::GreyOut
    }
}

/// The `[gui]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiPreferences {
    /// Select everything when a command needs a selection and there is none.
    pub select_all_on_none: bool,
    /// Warn instead of auto-selecting when `select_all_on_none` is set.
    pub never_auto_select: bool,
}

/// All preferences the menu subsystem reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuPreferences {
    /// Selection policy switches.
    pub gui: GuiPreferences,
    /// Ordering overrides by registry path.
    pub ordering: OrderingPreferences,
}

impl MenuPreferences {
    /// Parse preferences from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load preferences from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| Error::config_read(path, err))?;
        let preferences = Self::from_toml_str(&text)?;
        tracing::debug!(
            target: targets::PREFS,
            path = %path.display(),
            orderings = preferences.ordering.len(),
            "loaded menu preferences"
        );
        Ok(preferences)
    }

    /// Serialize preferences as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The selection policy these preferences select.
    pub fn what_if_no_selection(&self) -> WhatIfNoSelection {
        WhatIfNoSelection::from_preferences(self.gui.select_all_on_none, self.gui.never_auto_select)
    }
}
