//! End-to-end tests for menu construction and command admissibility.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use horizon_menus::manager::DEFAULT_DISALLOWED_MESSAGE;
use horizon_menus::prelude::*;
use horizon_menus::registry::{CommandHandler, ItemSymbol};
use horizon_menus_core::{TreeFormatOptions, TreeStyle};

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Default)]
struct Project {
    selected: AtomicBool,
    playing: AtomicBool,
    focused_track: AtomicBool,
    selection_checks: AtomicUsize,
    select_all_runs: AtomicUsize,
    experimental: AtomicBool,
}

#[derive(Default)]
struct RecordingDialog {
    shown: Mutex<Vec<(String, String, Option<String>)>>,
}

impl ErrorDialog for RecordingDialog {
    fn show_error_dialog(&self, title: &str, message: &str, help_page: Option<&str>) {
        self.shown
            .lock()
            .push((title.to_string(), message.to_string(), help_page.map(str::to_string)));
    }
}

struct Flags {
    registry: CommandFlagRegistry<Project>,
    selected: CommandFlag,
    stopped: CommandFlag,
    focused: CommandFlag,
}

fn flags() -> Flags {
    let mut registry = CommandFlagRegistry::<Project>::new();
    let selected = registry
        .register(
            "TimeSelected",
            |project: &Project| {
                project.selection_checks.fetch_add(1, Ordering::SeqCst);
                project.selected.load(Ordering::SeqCst)
            },
            CommandFlagOptions::new()
                .with_message(|name| format!("Select some audio for {name} to use."))
                .with_title("No Audio Selected")
                .with_help_page("Selecting_Audio")
                .with_priority(3),
        )
        .unwrap();
    let stopped = registry
        .register(
            "AudioIONotBusy",
            |project: &Project| !project.playing.load(Ordering::SeqCst),
            CommandFlagOptions::new().quick_test().with_priority(5),
        )
        .unwrap();
    let focused = registry
        .register(
            "TrackPanelHasFocus",
            |project: &Project| project.focused_track.load(Ordering::SeqCst),
            CommandFlagOptions::new().disable_default_message(),
        )
        .unwrap();
    Flags {
        registry,
        selected,
        stopped,
        focused,
    }
}

fn select_all_enabler(stopped: CommandFlag, selected: CommandFlag) -> EnablerRegistry<Project> {
    let mut enablers = EnablerRegistry::new();
    enablers.register(MenuItemEnabler::new(
        stopped,
        selected,
        |_: &Project| true,
        |project: &Project, _| {
            project.select_all_runs.fetch_add(1, Ordering::SeqCst);
            project.selected.store(true, Ordering::SeqCst);
        },
    ));
    enablers
}

fn noop(_: &CommandHandler, _: &CommandContext<'_, Project>) {}

fn items(flags: &Flags, project: &Arc<Project>) -> ItemRegistry<Project> {
    let experimental = project.clone();
    let mut registry = ItemRegistry::new(vec![
        Item::menu(
            "File",
            "&File",
            vec![
                Item::section("Basic", vec![
                    Item::command(CommandItem::new("New", "&New", noop, ALWAYS_ENABLED_FLAG)),
                    Item::command(CommandItem::new("Open", "&Open...", noop, ALWAYS_ENABLED_FLAG)),
                ]),
                Item::section("Empty", vec![]),
                Item::section("Exit", vec![Item::command(CommandItem::new(
                    "Exit",
                    "E&xit",
                    noop,
                    ALWAYS_ENABLED_FLAG,
                ))]),
            ],
        ),
        Item::menu(
            "Edit",
            "&Edit",
            vec![
                Item::section("UndoRedo", vec![
                    Item::command(CommandItem::new("Undo", "&Undo", noop, ALWAYS_ENABLED_FLAG)),
                    Item::command(CommandItem::new("Redo", "&Redo", noop, ALWAYS_ENABLED_FLAG)),
                ]),
                Item::section("Basic", vec![
                    Item::command(CommandItem::new(
                        "Cut",
                        "Cu&t",
                        noop,
                        flags.selected | flags.stopped,
                    )),
                    Item::command(
                        CommandItem::new("Delete", "&Delete", noop, flags.selected)
                            .with_options(CommandOptions::new().use_strict_flags()),
                    ),
                    Item::command(
                        CommandItem::new(
                            "TrackMenu",
                            "Track &Menu",
                            noop,
                            flags.focused | flags.selected,
                        )
                        .with_options(CommandOptions::new().with_long_name("Open Track Menu")),
                    ),
                ]),
            ],
        ),
        Item::menu(
            "Tools",
            "&Tools",
            vec![
                Item::command(CommandItem::new("Macros", "&Macros...", noop, ALWAYS_ENABLED_FLAG)),
                Item::conditional(
                    "Experimental",
                    move || experimental.experimental.load(Ordering::SeqCst),
                    vec![Item::command(CommandItem::new(
                        "Benchmark",
                        "&Benchmark...",
                        noop,
                        ALWAYS_ENABLED_FLAG,
                    ))],
                ),
            ],
        ),
    ]);
    registry.register(
        "Tools",
        Item::extension("Effects", vec![Item::command_group(CommandGroupItem::new(
            "ToolEffects",
            vec![
                ItemSymbol::new("Amplify", "&Amplify..."),
                ItemSymbol::new("Echo", "&Echo..."),
            ],
            noop,
            flags.selected,
            true,
        ))]),
    );
    registry
}

struct Harness {
    project: Arc<Project>,
    manager: Arc<MenuManager<Project>>,
    dialogs: Arc<RecordingDialog>,
    active: Arc<AtomicBool>,
    flags: (CommandFlag, CommandFlag, CommandFlag),
}

fn harness(preferences: MenuPreferences) -> Harness {
    init_logging();
    let project = Arc::new(Project::default());
    let flags = flags();
    let handles = (flags.selected, flags.stopped, flags.focused);
    let items = items(&flags, &project);
    let dialogs = Arc::new(RecordingDialog::default());
    let active = Arc::new(AtomicBool::new(true));
    let window_active = active.clone();

    let manager = MenuManager::builder(project.clone())
        .with_items(items)
        .with_enablers(select_all_enabler(flags.stopped, flags.selected))
        .with_flags(flags.registry)
        .with_window(Arc::new(move || window_active.load(Ordering::SeqCst)))
        .with_dialogs(dialogs.clone())
        .with_preferences(preferences)
        .with_default_ordering([("", "File,Edit,Tools")])
        .build();
    manager.create_menus_and_commands();

    Harness {
        project,
        manager,
        dialogs,
        active,
        flags: handles,
    }
}

fn auto_select() -> MenuPreferences {
    MenuPreferences::from_toml_str("[gui]\nselect_all_on_none = true").unwrap()
}

#[test]
fn test_menu_bar_follows_default_ordering() {
    let h = harness(MenuPreferences::default());
    let commands = h.manager.commands();
    let menu_bar = commands.menu_bar().unwrap();
    assert_eq!(menu_bar.name(), "appmenu");
    assert_eq!(menu_bar.titles(), vec!["&File", "&Edit", "&Tools"]);
}

#[test]
fn test_preference_ordering_overrides_default() {
    let preferences = MenuPreferences::from_toml_str(
        r#"
        [ordering]
        "" = "Edit,File"
        "/Edit/Basic" = "Delete"
        "#,
    )
    .unwrap();
    let h = harness(preferences);
    let commands = h.manager.commands();
    let menu_bar = commands.menu_bar().unwrap();
    assert_eq!(menu_bar.titles(), vec!["&Edit", "&File", "&Tools"]);
    assert_eq!(
        menu_bar.menu("&Edit").unwrap().layout(),
        vec!["Undo", "Redo", "-", "Delete", "Cut", "TrackMenu"]
    );
}

#[test]
fn test_sections_separate_without_doubles() {
    let h = harness(MenuPreferences::default());
    let commands = h.manager.commands();
    let file = commands.menu_bar().unwrap().menu("&File").unwrap();
    // The empty section contributes nothing, not even a second separator.
    assert_eq!(file.layout(), vec!["New", "Open", "-", "Exit"]);
    assert!(!file.entries().first().unwrap().is_separator());
    assert!(!file.entries().last().unwrap().is_separator());
}

#[test]
fn test_extension_contributes_command_list() {
    let h = harness(MenuPreferences::default());
    let commands = h.manager.commands();
    let tools = commands.menu_bar().unwrap().menu("&Tools").unwrap();
    assert_eq!(tools.layout(), vec!["Macros", "Amplify", "Echo"]);

    let echo = commands.entry("Echo").unwrap();
    let membership = echo.membership().unwrap();
    assert_eq!(membership.list, "ToolEffects");
    assert_eq!(membership.index, 1);
    assert!(membership.is_effect);
}

#[test]
fn test_false_conditional_registers_occult_command() {
    let h = harness(MenuPreferences::default());
    {
        let commands = h.manager.commands();
        let benchmark = commands.entry("Benchmark").unwrap();
        assert!(benchmark.is_occult());
        assert!(!benchmark.is_enabled());
    }
    assert!(!h.manager.handle_command("Benchmark"));

    h.project.experimental.store(true, Ordering::SeqCst);
    h.manager.rebuild_menu_bar();
    let commands = h.manager.commands();
    assert!(!commands.entry("Benchmark").unwrap().is_occult());
    assert_eq!(
        commands.menu_bar().unwrap().menu("&Tools").unwrap().layout(),
        vec!["Macros", "Benchmark", "Amplify", "Echo"]
    );
}

#[test]
fn test_update_menus_is_idempotent() {
    let h = harness(auto_select());
    let updates = Arc::new(AtomicUsize::new(0));
    let counter = updates.clone();
    h.manager.menus_updated.connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(h.manager.update_menus(true));
    let enabled: Vec<bool> = h.manager.commands().entries().map(|e| e.is_enabled()).collect();

    assert!(!h.manager.update_menus(true));
    let again: Vec<bool> = h.manager.commands().entries().map(|e| e.is_enabled()).collect();
    assert_eq!(enabled, again);
    assert_eq!(updates.load(Ordering::SeqCst), 1);
}

#[test]
fn test_policy_decides_speculative_enabling() {
    let h = harness(auto_select());
    h.manager.update_menus(false);
    {
        let commands = h.manager.commands();
        assert!(commands.is_enabled("Cut"));
        assert!(commands.is_enabled("Amplify"));
        assert!(!commands.is_enabled("Delete"));
    }

    let grey = MenuPreferences::from_toml_str("[gui]\nnever_auto_select = true").unwrap();
    let h = harness(grey);
    assert_eq!(h.manager.what_if_no_selection(), WhatIfNoSelection::GreyOut);
    h.manager.update_menus(false);
    let commands = h.manager.commands();
    assert!(!commands.is_enabled("Cut"));
    assert!(!commands.is_enabled("Amplify"));
}

#[test]
fn test_select_all_off_greys_out_despite_applicable_enabler() {
    let off = MenuPreferences::from_toml_str("[gui]\nselect_all_on_none = false").unwrap();
    let h = harness(off);
    let (selected, stopped, _) = h.flags;
    assert_eq!(h.manager.what_if_no_selection(), WhatIfNoSelection::GreyOut);

    // The enabler could supply the selection, but only the real flags count.
    let flags = h.manager.get_update_flags(false);
    assert!(flags.contains(stopped));
    assert!(!flags.contains(selected));

    assert!(h.manager.update_menus(false));
    let commands = h.manager.commands();
    assert!(!commands.is_enabled("Cut"));
    assert!(!commands.is_enabled("Amplify"));
    assert!(!commands.is_enabled("Delete"));
}

#[test]
fn test_inactive_window_reuses_slow_flags() {
    let h = harness(MenuPreferences::default());
    let (selected, stopped, _) = h.flags;

    let flags = h.manager.get_update_flags(true);
    assert!(!flags.contains(selected));
    assert!(flags.contains(stopped));
    let checks = h.project.selection_checks.load(Ordering::SeqCst);

    h.active.store(false, Ordering::SeqCst);
    h.project.selected.store(true, Ordering::SeqCst);
    h.project.playing.store(true, Ordering::SeqCst);

    let flags = h.manager.get_update_flags(true);
    // The quick flag is fresh, the slow one keeps its cached value.
    assert!(!flags.contains(stopped));
    assert!(!flags.contains(selected));
    assert_eq!(h.project.selection_checks.load(Ordering::SeqCst), checks);

    // Without the focus check everything is evaluated.
    let flags = h.manager.get_update_flags(false);
    assert!(flags.contains(selected));
    assert!(!flags.contains(stopped));
}

#[test]
fn test_enabler_runs_exactly_once() {
    let h = harness(auto_select());
    let (selected, stopped, _) = h.flags;

    let mut flags = CommandFlag::empty();
    assert!(h.manager.try_to_make_action_allowed(&mut flags, selected | stopped));
    assert_eq!(h.project.select_all_runs.load(Ordering::SeqCst), 1);
    assert!(flags.contains(selected | stopped));

    // Already satisfied: nothing runs.
    assert!(h.manager.try_to_make_action_allowed(&mut flags, selected));
    assert_eq!(h.project.select_all_runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handle_command_recovers_before_running() {
    let h = harness(auto_select());
    h.manager.update_menus(false);

    assert!(h.manager.handle_command("Amplify"));
    assert_eq!(h.project.select_all_runs.load(Ordering::SeqCst), 1);
    assert!(h.dialogs.shown.lock().is_empty());
}

#[test]
fn test_highest_priority_message_explains_refusal() {
    let h = harness(MenuPreferences::default());
    let (selected, stopped, _) = h.flags;
    h.project.playing.store(true, Ordering::SeqCst);

    // The stopped flag outranks the selection flag but has no message.
    let mut flags = CommandFlag::empty();
    assert!(!h.manager.report_if_action_not_allowed("Cut", &mut flags, selected | stopped));
    assert_eq!(h.project.select_all_runs.load(Ordering::SeqCst), 0);
    assert_eq!(
        *h.dialogs.shown.lock(),
        vec![(
            "No Audio Selected".to_string(),
            "Select some audio for Cut to use.".to_string(),
            Some("Selecting_Audio".to_string()),
        )]
    );
}

#[test]
fn test_generic_message_and_suppression() {
    let h = harness(MenuPreferences::default());
    let (_, stopped, focused) = h.flags;
    h.project.playing.store(true, Ordering::SeqCst);

    assert!(h.manager.tell_user_why_disallowed("Play", CommandFlag::empty(), stopped));
    assert_eq!(h.dialogs.shown.lock()[0].1, DEFAULT_DISALLOWED_MESSAGE);

    // A missing flag that disables the generic message silences the dialog.
    assert!(!h.manager.tell_user_why_disallowed("TrackMenu", CommandFlag::empty(), focused | stopped));
    assert_eq!(h.dialogs.shown.lock().len(), 1);
}

#[test]
fn test_refusal_uses_long_name() {
    let h = harness(auto_select());
    h.project.focused_track.store(true, Ordering::SeqCst);
    h.manager.update_menus(false);
    h.project.playing.store(true, Ordering::SeqCst);

    assert!(!h.manager.handle_command("TrackMenu"));
    let shown = h.dialogs.shown.lock();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].1, "Select some audio for Open Track Menu to use.");
}

#[test]
fn test_debug_dump_of_built_menus() {
    let h = harness(auto_select());
    h.manager.update_menus(false);
    let debug = MenuTreeDebug::with_options(TreeFormatOptions {
        style: TreeStyle::Ascii,
        show_state: true,
        ..Default::default()
    });
    let text = debug.format_commands(&*h.manager.commands()).unwrap();
    assert!(text.starts_with("MenuBar 'appmenu' (3 menus):"), "{text}");
    assert!(text.contains("Benchmark... [Benchmark] (occult"), "{text}");
    assert!(text.contains("Cut [Cut] (enabled"), "{text}");
}

#[test]
fn test_preferences_file_drives_policy_and_order() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[gui]\nselect_all_on_none = true\n\n[ordering]\n\"\" = \"Tools\"").unwrap();
    let preferences = MenuPreferences::load(file.path()).unwrap();

    let h = harness(preferences);
    assert_eq!(h.manager.what_if_no_selection(), WhatIfNoSelection::AutoSelect);
    let commands = h.manager.commands();
    assert_eq!(commands.menu_bar().unwrap().titles(), vec!["&Tools", "&File", "&Edit"]);
}

#[test]
fn test_rebuild_all_menu_bars_resets_published_flags() {
    let first = harness(auto_select());
    let second = harness(auto_select());
    assert!(first.manager.update_menus(false));
    assert!(second.manager.update_menus(false));

    MenuManager::rebuild_all_menu_bars([&*first.manager, &*second.manager]);
    assert!(first.manager.update_menus(false));
    assert!(second.manager.update_menus(false));
    assert_eq!(first.manager.commands().len(), second.manager.commands().len());
}

#[derive(Default)]
struct Outline {
    lines: Vec<String>,
}

impl MenuVisitor<Project> for Outline {
    fn begin_group(&mut self, group: &horizon_menus::registry::GroupItem<Project>, _path: &str) {
        if let Some(title) = group.title() {
            self.lines.push(format!("[{title}]"));
        }
    }

    fn visit(&mut self, leaf: &horizon_menus::registry::LeafItem<Project>, path: &str) {
        self.lines.push(format!("{path}/{}", leaf.name()));
    }

    fn end_group(&mut self, _group: &horizon_menus::registry::GroupItem<Project>, _path: &str) {}

    fn do_separator(&mut self) {
        self.lines.push("-".to_string());
    }
}

#[test]
fn test_custom_visitor_sees_separated_walk() {
    let h = harness(MenuPreferences::default());
    let outline = h.manager.visit(Outline::default());
    assert_eq!(
        &outline.lines[..5],
        &["[&File]", "File/Basic/New", "File/Basic/Open", "-", "File/Exit/Exit"]
    );
    assert!(outline.lines.contains(&"Tools/Effects/ToolEffects".to_string()));
}
