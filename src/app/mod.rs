//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the console, the theme, config
//! file resolution, and re-exports the event loop as `run`.
//!
pub mod config;
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::path::PathBuf;
use std::time::Instant;

use crate::api::SessionSnapshot;
use crate::billing::ChargesPanel;
use crate::search::ImpersonationSearch;
use crate::session::SharedCookies;
use self::config::AppConfig;
use self::keymap::Keymap;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Keys edit the impersonation query.
    Search,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub danger: Color,
    pub success: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            danger: Color::Red,
            success: Color::Green,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            danger: Color::Rgb(0xf3, 0x8b, 0xa8),       // red
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "danger" => theme.danger = color,
                    "success" => theme.success = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        None
    }

    /// Persist the theme in key=value format. Only RGB and `reset` round-trip.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# impersonate-admin theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::White => "#FFFFFF".to_string(),
                _ => "reset".to_string(),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };

        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("danger", self.danger);
        kv("success", self.success);

        std::fs::write(path, buf)
    }

    /// Load `path` if present, otherwise write the default theme there and return it.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        if let Some(existing) = config_file_read_path("theme.conf") {
            return Self::from_file(&existing).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// Per-user config directory, e.g. `~/.config/impersonate-admin`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("impersonate-admin"))
}

/// Existing config file named `name` in the per-user config directory.
pub fn config_file_read_path(name: &str) -> Option<String> {
    let p = config_dir()?.join(name);
    p.exists().then(|| p.to_string_lossy().to_string())
}

/// Where a missing config file named `name` should be created.
///
/// Falls back to the working directory when the config directory cannot be created.
pub fn config_file_write_path(name: &str) -> String {
    if let Some(dir) = config_dir() {
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir.join(name).to_string_lossy().to_string();
        }
    }
    name.to_string()
}

/// Backend-changing actions that wait behind a Yes/No dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    RefundSelected,
    CancelSubscription,
    AddSubscription { plan: String },
}

impl PendingAction {
    pub fn title(&self) -> &'static str {
        match self {
            PendingAction::RefundSelected => "Confirm Refund",
            PendingAction::CancelSubscription => "Cancel Subscription?",
            PendingAction::AddSubscription { .. } => "Add Subscription",
        }
    }

    /// Labels for the confirm and decline buttons.
    pub fn buttons(&self) -> (&'static str, &'static str) {
        match self {
            PendingAction::RefundSelected => ("Yes, refund", "No, cancel"),
            PendingAction::CancelSubscription => ("Yes, cancel subscription", "No, go back"),
            PendingAction::AddSubscription { .. } => ("Add", "Cancel"),
        }
    }
}

/// Dialogs drawn over the main screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Charges table for the impersonated account.
    Billing,
    /// Complimentary plan picker.
    AddSubscription { selected: usize },
    /// `selected == 0` is the confirm button.
    Confirm {
        action: PendingAction,
        message: String,
        selected: usize,
    },
    Info { message: String },
    Help,
}

pub struct AppState {
    pub started_at: Instant,
    pub config: AppConfig,
    pub theme: Theme,
    pub keymap: Keymap,
    pub cookies: SharedCookies,
    pub session: SessionSnapshot,
    pub search: ImpersonationSearch,
    /// Present while the billing modal (or a dialog above it) is open.
    pub billing: Option<ChargesPanel>,
    pub input_mode: InputMode,
    pub modal: Option<ModalState>,
    /// One-line feedback shown in the status bar.
    pub status: Option<String>,
    /// Number of session reloads performed.
    pub reloads: u64,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: AppConfig, theme: Theme, keymap: Keymap, cookies: SharedCookies) -> Self {
        Self {
            started_at: Instant::now(),
            config,
            theme,
            keymap,
            cookies,
            session: SessionSnapshot::default(),
            search: ImpersonationSearch::default(),
            billing: None,
            input_mode: InputMode::Normal,
            modal: None,
            status: None,
            reloads: 0,
            should_quit: false,
        }
    }

    /// Complimentary plans are offered only to accounts on the free tier.
    pub fn can_add_subscription(&self) -> bool {
        self.session.impersonating && self.session.on_free_tier()
    }

    pub fn can_manage_billing(&self) -> bool {
        self.session.impersonating && self.config.billing_enabled
    }

    pub fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    /// Close the top dialog, falling back to the billing modal when it is still open.
    pub fn close_modal(&mut self) {
        if self.billing.is_some() && self.modal != Some(ModalState::Billing) {
            self.modal = Some(ModalState::Billing);
            self.input_mode = InputMode::Modal;
            return;
        }
        if let Some(panel) = self.billing.as_mut() {
            panel.close();
        }
        self.billing = None;
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn show_info(&mut self, message: impl Into<String>) {
        self.open_modal(ModalState::Info {
            message: message.into(),
        });
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
