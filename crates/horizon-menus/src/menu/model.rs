//! Toolkit-independent menu structure.
//!
//! [`CommandManager`](super::CommandManager) produces a [`MenuBar`] from the
//! visitor's events; a toolkit adapter turns it into native menus. Labels
//! keep their `&` mnemonic markers, `&&` being a literal ampersand.

// ============================================================================
// MenuCommand
// ============================================================================

/// A command as it appears in a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCommand {
    /// Command identifier, unique within the menu bar.
    pub id: String,
    /// Label, possibly with a `&` mnemonic marker.
    pub label: String,
    /// Accelerator hint, e.g. `"Ctrl+Z"`.
    pub accel: Option<String>,
    /// Checked state for checkable commands, `None` otherwise.
    pub checked: Option<bool>,
    /// Hidden because the command was added inside a conditional group whose
    /// condition was false.
    pub occult: bool,
}

impl MenuCommand {
    /// Create a plain command entry.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            accel: None,
            checked: None,
            occult: false,
        }
    }

    /// The label with mnemonic markers removed.
    pub fn display_text(&self) -> String {
        strip_mnemonic(&self.label)
    }
}

// ============================================================================
// MenuEntry
// ============================================================================

/// One row of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// An invocable command.
    Command(MenuCommand),
    /// A visual separator.
    Separator,
    /// A nested menu.
    Submenu(Menu),
}

impl MenuEntry {
    /// Check if this entry is a separator.
    pub fn is_separator(&self) -> bool {
        matches!(self, MenuEntry::Separator)
    }

    /// The command, if this entry is one.
    pub fn as_command(&self) -> Option<&MenuCommand> {
        match self {
            MenuEntry::Command(command) => Some(command),
            _ => None,
        }
    }

    /// The submenu, if this entry is one.
    pub fn as_submenu(&self) -> Option<&Menu> {
        match self {
            MenuEntry::Submenu(menu) => Some(menu),
            _ => None,
        }
    }
}

// ============================================================================
// Menu
// ============================================================================

/// A titled, ordered list of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    title: String,
    entries: Vec<MenuEntry>,
    occult: bool,
}

impl Menu {
    /// Create an empty menu.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
            occult: false,
        }
    }

    /// The menu title (may contain `&`).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The title with mnemonic markers removed.
    pub fn display_title(&self) -> String {
        strip_mnemonic(&self.title)
    }

    /// Whether the whole menu sits inside a false conditional group.
    pub fn is_occult(&self) -> bool {
        self.occult
    }

    pub(crate) fn set_occult(&mut self, occult: bool) {
        self.occult = occult;
    }

    /// All entries, in order.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Number of entries, separators included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the menu has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a command.
    pub fn add_command(&mut self, command: MenuCommand) {
        self.entries.push(MenuEntry::Command(command));
    }

    /// Append a separator.
    pub fn add_separator(&mut self) {
        self.entries.push(MenuEntry::Separator);
    }

    /// Append a submenu.
    pub fn add_submenu(&mut self, menu: Menu) {
        self.entries.push(MenuEntry::Submenu(menu));
    }

    /// Find a command by id, searching submenus too.
    pub fn find_command(&self, id: &str) -> Option<&MenuCommand> {
        self.entries.iter().find_map(|entry| match entry {
            MenuEntry::Command(command) if command.id == id => Some(command),
            MenuEntry::Submenu(menu) => menu.find_command(id),
            _ => None,
        })
    }

    /// Mutable variant of [`find_command`](Self::find_command).
    pub fn find_command_mut(&mut self, id: &str) -> Option<&mut MenuCommand> {
        self.entries.iter_mut().find_map(|entry| match entry {
            MenuEntry::Command(command) if command.id == id => Some(command),
            MenuEntry::Submenu(menu) => menu.find_command_mut(id),
            _ => None,
        })
    }

    /// Find a direct submenu by title.
    pub fn submenu(&self, title: &str) -> Option<&Menu> {
        self.entries
            .iter()
            .filter_map(MenuEntry::as_submenu)
            .find(|menu| menu.title == title)
    }

    /// Compact one-token-per-entry rendering: command ids, `-` for
    /// separators, `Title[...]` for submenus. Occult commands are skipped.
    pub fn layout(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Command(command) if command.occult => None,
                MenuEntry::Command(command) => Some(command.id.clone()),
                MenuEntry::Separator => Some("-".to_string()),
                MenuEntry::Submenu(menu) => {
                    Some(format!("{}[{}]", menu.title, menu.layout().join(",")))
                }
            })
            .collect()
    }
}

// ============================================================================
// MenuBar
// ============================================================================

/// The top-level list of menus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuBar {
    name: String,
    menus: Vec<Menu>,
}

impl MenuBar {
    /// Create an empty menu bar.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            menus: Vec::new(),
        }
    }

    /// The menu bar's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All menus, left to right.
    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    /// Mutable access to the menus.
    pub fn menus_mut(&mut self) -> &mut [Menu] {
        &mut self.menus
    }

    /// Titles of all menus, left to right.
    pub fn titles(&self) -> Vec<&str> {
        self.menus.iter().map(Menu::title).collect()
    }

    /// The menu with the given title.
    pub fn menu(&self, title: &str) -> Option<&Menu> {
        self.menus.iter().find(|menu| menu.title == title)
    }

    /// Append a menu.
    pub fn add_menu(&mut self, menu: Menu) {
        self.menus.push(menu);
    }

    /// Find a command anywhere in the bar.
    pub fn find_command(&self, id: &str) -> Option<&MenuCommand> {
        self.menus.iter().find_map(|menu| menu.find_command(id))
    }

    /// Mutable variant of [`find_command`](Self::find_command).
    pub fn find_command_mut(&mut self, id: &str) -> Option<&mut MenuCommand> {
        self.menus.iter_mut().find_map(|menu| menu.find_command_mut(id))
    }
}

/// Remove `&` mnemonic markers from a label; `&&` becomes a literal `&`.
pub fn strip_mnemonic(text: &str) -> String {
    let mut display_text = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            display_text.push(ch);
            continue;
        }
        match chars.peek() {
            Some('&') => {
                display_text.push('&');
                chars.next();
            }
            Some(next) if next.is_alphanumeric() => {}
            _ => display_text.push(ch),
        }
    }
    display_text
}
