//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Keys typed while the impersonation search box is focused go to the query
//! and never reach the keymap.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions that can be bound to key combinations.
///
/// The same action can be bound to several keys (e.g. `j` and Down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Focus the impersonation search box.
    StartSearch,
    /// Stop acting as the impersonated user.
    StopImpersonating,
    /// Open the billing modal for the impersonated account.
    OpenBilling,
    /// Open the complimentary plan picker.
    AddSubscription,
    /// Re-read the session from the backend.
    Reload,
    /// Display the keybindings reference.
    OpenHelp,
    MoveUp,
    MoveDown,
    /// Tick or untick the charge under the cursor.
    ToggleSelection,
    /// Accept the highlighted entry or dialog button.
    Confirm,
    /// Close the current dialog.
    Cancel,
    /// Ask to refund the selected charges.
    Refund,
    /// Ask to cancel the subscription.
    CancelSubscription,
    /// Switch between the buttons of a confirmation dialog.
    SwitchButton,
}

/// Mapping from `(KeyModifiers, KeyCode)` to [`KeyAction`].
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: std::collections::HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = std::collections::HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('x')), KeyAction::StopImpersonating);
        bindings.insert((M::NONE, Char('b')), KeyAction::OpenBilling);
        bindings.insert((M::NONE, Char('a')), KeyAction::AddSubscription);
        bindings.insert((M::CONTROL, Char('r')), KeyAction::Reload);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Enter), KeyAction::Confirm);
        bindings.insert((M::NONE, Esc), KeyAction::Cancel);
        bindings.insert((M::NONE, Char(' ')), KeyAction::ToggleSelection);
        bindings.insert((M::NONE, Char('f')), KeyAction::Refund);
        bindings.insert((M::NONE, Char('c')), KeyAction::CancelSubscription);
        bindings.insert((M::NONE, Tab), KeyAction::SwitchButton);
        bindings.insert((M::NONE, Left), KeyAction::SwitchButton);
        bindings.insert((M::NONE, Right), KeyAction::SwitchButton);
        // Navigation
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);

        Self { bindings }
    }

    /// Load a keymap from `path`, from the per-user config directory, or write defaults to `path`.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::app::config_file_read_path("keybinds.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let km = Self::default();
        let _ = km.write_file(path);
        km
    }

    /// Start from defaults and apply every `<Action> = <Key>` line of the file.
    ///
    /// The legacy `<Key> = <Action>` order is accepted too.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
            if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
        }
        map
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# impersonate-admin keybindings\n");
        buf.push_str("# Format: <Action> = <Key>\n");
        buf.push_str("# Keys: q, Ctrl+r, Enter, Esc, Tab, Space, Up, Down, Left, Right, /, ?\n\n");

        let mut rows: Vec<(String, &'static str)> = self
            .bindings
            .iter()
            .map(|((m, c), a)| (Self::format_key(*m, *c), format_action(*a)))
            .collect();
        rows.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(&b.0)));
        for (k, a) in rows {
            let _ = writeln!(&mut buf, "{} = {}", a, k);
        }

        std::fs::write(path, buf)
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        if let Some(action) = self.bindings.get(&(key.modifiers, key.code)) {
            return Some(*action);
        }
        // Some terminals report Shift for symbols like '?'
        match key.code {
            KeyCode::Char(_) if key.modifiers == KeyModifiers::SHIFT => self
                .bindings
                .get(&(KeyModifiers::NONE, key.code))
                .copied(),
            _ => None,
        }
    }

    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Human-readable key label such as `Ctrl+r` or `Space`.
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Delete => "Delete".to_string(),
            Char(' ') => "Space".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(raw: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = raw.trim();
    let mut rest = s;
    let mut mods = KeyModifiers::NONE;
    if let Some(after) = s.strip_prefix("Ctrl+") {
        mods |= KeyModifiers::CONTROL;
        rest = after;
    }
    let code = match rest {
        "Enter" => Enter,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Space" => Char(' '),
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        "Delete" => Delete,
        _ => {
            let chars: Vec<char> = rest.chars().collect();
            if chars.len() == 1 {
                Char(chars[0])
            } else {
                return None;
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    match s.trim() {
        "Quit" => Some(KeyAction::Quit),
        "StartSearch" => Some(KeyAction::StartSearch),
        "StopImpersonating" => Some(KeyAction::StopImpersonating),
        "OpenBilling" => Some(KeyAction::OpenBilling),
        "AddSubscription" => Some(KeyAction::AddSubscription),
        "Reload" => Some(KeyAction::Reload),
        "OpenHelp" => Some(KeyAction::OpenHelp),
        "MoveUp" => Some(KeyAction::MoveUp),
        "MoveDown" => Some(KeyAction::MoveDown),
        "ToggleSelection" => Some(KeyAction::ToggleSelection),
        "Confirm" => Some(KeyAction::Confirm),
        "Cancel" => Some(KeyAction::Cancel),
        "Refund" => Some(KeyAction::Refund),
        "CancelSubscription" => Some(KeyAction::CancelSubscription),
        "SwitchButton" => Some(KeyAction::SwitchButton),
        _ => None,
    }
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::StopImpersonating => "StopImpersonating",
        KeyAction::OpenBilling => "OpenBilling",
        KeyAction::AddSubscription => "AddSubscription",
        KeyAction::Reload => "Reload",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::ToggleSelection => "ToggleSelection",
        KeyAction::Confirm => "Confirm",
        KeyAction::Cancel => "Cancel",
        KeyAction::Refund => "Refund",
        KeyAction::CancelSubscription => "CancelSubscription",
        KeyAction::SwitchButton => "SwitchButton",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_both_orders_and_ctrl() {
        let km = Keymap::parse("Refund = Ctrl+f\nSpace = Confirm\n");
        let ev = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL);
        assert_eq!(km.resolve(&ev), Some(KeyAction::Refund));
        let ev = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(km.resolve(&ev), Some(KeyAction::Confirm));
    }

    #[test]
    fn written_file_parses_back_to_same_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybinds.conf");
        let path = path.to_string_lossy().to_string();
        let km = Keymap::default();
        km.write_file(&path).unwrap();
        let back = Keymap::from_file(&path).unwrap();
        let mut a = km.all_bindings();
        let mut b = back.all_bindings();
        a.sort_by_key(|((m, c), _)| Keymap::format_key(*m, *c));
        b.sort_by_key(|((m, c), _)| Keymap::format_key(*m, *c));
        assert_eq!(a, b);
    }
}
