//! Logging and debugging facilities for Horizon Menus.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Shared options for rendering trees (menu bars, registries) as text
//! - Performance tracing hooks for profiling menu rebuilds
//!
//! # Tracing Integration
//!
//! Horizon Menus uses the `tracing` crate for instrumentation. To see logs,
//! you need to install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_menus::flags=debug")
//!         .init();
//! }
//! ```

/// Span names used throughout Horizon Menus for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Full menu bar construction.
    pub const MENU_BUILD: &str = "horizon_menus::menu_build";
    /// Recovery through enablers before a gated command runs.
    pub const RECOVERY: &str = "horizon_menus::recovery";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "horizon_menus_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_menus_core::signal";
    /// Item registry and ordering target.
    pub const REGISTRY: &str = "horizon_menus::registry";
    /// Separator/grouping visitor target.
    pub const VISITOR: &str = "horizon_menus::visitor";
    /// Menu builder (command manager) target.
    pub const BUILDER: &str = "horizon_menus::builder";
    /// Command flag engine target.
    pub const FLAGS: &str = "horizon_menus::flags";
    /// Undo menu presentation target.
    pub const UNDO: &str = "horizon_menus::undo";
    /// Preferences loading target.
    pub const PREFS: &str = "horizon_menus::prefs";
    /// Performance spans target.
    pub const PERF: &str = "horizon_menus::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show identifiers next to labels.
    pub show_ids: bool,
    /// Whether to show per-node state (enabled, occult, required flags).
    pub show_state: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_state: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_state: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_state: false,
            ..Default::default()
        }
    }

    /// Whether a node at `depth` should be rendered.
    pub fn within_depth(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth <= max)
    }

    /// Build the prefix string for a tree node.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations such as a full menu
/// bar rebuild.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_menus::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are wrappers around the `tracing` crate macros with consistent
/// target naming.
#[macro_export]
macro_rules! menus_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_menus_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! menus_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_menus_core", $($arg)*)
    };
}
