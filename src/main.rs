//! impersonate-admin binary entry point.
//!
//! Parses the command line, sets up file logging, builds the backend client,
//! and runs the TUI with the terminal in raw mode, restoring it on exit.
//!
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use impersonate_admin::api::HttpAdminApi;
use impersonate_admin::app::config::{AppConfig, ConfigOverrides};
use impersonate_admin::app::keymap::Keymap;
use impersonate_admin::app::{self, AppState, Theme, config_file_write_path};
use impersonate_admin::error::{Context, Result};
use impersonate_admin::session::CookieStore;

#[derive(Debug, Parser)]
#[command(name = "impersonate-admin", version, about)]
struct Cli {
    /// Path to config.conf (defaults to the per-user config directory)
    #[arg(long, env = "IMPERSONATE_ADMIN_CONFIG")]
    config: Option<String>,
    /// Backend base URL, e.g. https://api.example.com
    #[arg(long, env = "IMPERSONATE_ADMIN_BASE_URL")]
    base_url: Option<String>,
    /// Whether impersonation is kept server-side
    #[arg(long, env = "IMPERSONATE_ADMIN_SECURED")]
    secured: Option<bool>,
    /// Offer billing management while impersonating
    #[arg(long, env = "IMPERSONATE_ADMIN_BILLING_ENABLED")]
    billing_enabled: Option<bool>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Log file; the terminal itself is owned by the UI
    #[arg(long, env = "IMPERSONATE_ADMIN_LOG")]
    log_file: Option<String>,
}

fn init_logging(path: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_ctx(|| format!("open log file {path}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Relative paths in config.conf live next to the other config files.
fn resolve_config_relative(path: &str) -> String {
    if std::path::Path::new(path).is_absolute() {
        path.to_string()
    } else {
        config_file_write_path(path)
    }
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config_file_write_path("impersonate-admin.log"));
    init_logging(&log_path)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_write_path("config.conf"));
    let mut config = AppConfig::load_or_init(&config_path);
    config.apply_overrides(&ConfigOverrides {
        base_url: cli.base_url,
        secured: cli.secured,
        billing_enabled: cli.billing_enabled,
        timeout_secs: cli.timeout_secs,
    });
    tracing::info!(
        base_url = %config.base_url,
        secured = config.secured,
        billing_enabled = config.billing_enabled,
        "starting"
    );

    let cookies = CookieStore::load(resolve_config_relative(&config.cookie_file))?.shared();
    let api = HttpAdminApi::new(&config.base_url, config.timeout(), cookies.clone())
        .with_ctx(|| "configure backend client".to_string())?;
    let theme = Theme::load_or_init(&config_file_write_path("theme.conf"));
    let keymap = Keymap::load_or_init(&config_file_write_path("keybinds.conf"));
    let mut state = AppState::new(config, theme, keymap, cookies);

    let mut terminal = init_terminal().map_err(|e| format!("init terminal: {}", e))?;

    let res = app::run(&mut terminal, &mut state, &api);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
