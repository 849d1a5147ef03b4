//! Console configuration: parse/write `config.conf` and merge command-line overrides.
//!
//! The file uses the same `key = value` layout as `theme.conf` and
//! `keybinds.conf`. Lines starting with `#` are comments and unknown keys are
//! skipped, so an older file keeps loading after new keys are added.

use crate::billing::DEFAULT_PLANS;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for one backend deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend root that every request path is appended to.
    pub base_url: String,
    /// Whether the deployment keeps impersonation server-side. When `false`
    /// stopping impersonation only clears the local cookie.
    pub secured: bool,
    /// Offer the billing modal while impersonating.
    pub billing_enabled: bool,
    pub timeout_secs: u64,
    /// Plan keys known to the backend, in display order.
    pub plans: Vec<String>,
    /// File the cookie store persists to.
    pub cookie_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secured: true,
            billing_enabled: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            plans: DEFAULT_PLANS.iter().map(|p| p.to_string()).collect(),
            cookie_file: "cookies.conf".to_string(),
        }
    }
}

/// Values given on the command line; `None` keeps what the file says.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub secured: Option<bool>,
    pub billing_enabled: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Load from `path`, or from the per-user config directory, or write defaults to `path`.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::app::config_file_read_path("config.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let cfg = Self::default();
        if let Err(e) = cfg.write_file(path) {
            tracing::warn!(path, error = %e, "could not write default config");
        }
        cfg
    }

    /// Parse a config file, starting from defaults. `None` if unreadable.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
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

            match lhs {
                "base_url" => cfg.base_url = rhs.to_string(),
                "secured" => cfg.secured = parse_bool(rhs),
                "billing_enabled" => cfg.billing_enabled = parse_bool(rhs),
                "timeout_secs" => {
                    if let Ok(n) = rhs.parse::<u64>() {
                        cfg.timeout_secs = n.max(1);
                    }
                }
                "plans" => {
                    let plans: Vec<String> = rhs
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                    if !plans.is_empty() {
                        cfg.plans = plans;
                    }
                }
                "cookie_file" => cfg.cookie_file = rhs.to_string(),
                _ => {}
            }
        }
        cfg
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# impersonate-admin configuration\n");
        buf.push_str(
            "# secured = false clears impersonation locally instead of asking the backend\n\n",
        );
        let _ = writeln!(&mut buf, "base_url = {}", self.base_url);
        let _ = writeln!(&mut buf, "secured = {}", self.secured);
        let _ = writeln!(&mut buf, "billing_enabled = {}", self.billing_enabled);
        let _ = writeln!(&mut buf, "timeout_secs = {}", self.timeout_secs);
        let _ = writeln!(&mut buf, "plans = {}", self.plans.join(","));
        let _ = writeln!(&mut buf, "cookie_file = {}", self.cookie_file);
        std::fs::write(path, buf)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.base_url {
            self.base_url = url.clone();
        }
        if let Some(secured) = overrides.secured {
            self.secured = secured;
        }
        if let Some(enabled) = overrides.billing_enabled {
            self.billing_enabled = enabled;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = secs.max(1);
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_keys_and_ignores_rest() {
        let cfg = AppConfig::parse(
            "# comment\n\
             base_url = https://api.example.com\n\
             secured = no\n\
             billing_enabled = on\n\
             plans = FREE, PRO\n\
             mystery = 1\n\
             timeout_secs = 0\n",
        );
        assert_eq!(cfg.base_url, "https://api.example.com");
        assert!(!cfg.secured);
        assert!(cfg.billing_enabled);
        assert_eq!(cfg.plans, vec!["FREE", "PRO"]);
        assert_eq!(cfg.timeout_secs, 1);
    }

    #[test]
    fn overrides_win_over_file() {
        let mut cfg = AppConfig::parse("secured = true\n");
        cfg.apply_overrides(&ConfigOverrides {
            base_url: Some("http://127.0.0.1:9".into()),
            secured: Some(false),
            ..Default::default()
        });
        assert_eq!(cfg.base_url, "http://127.0.0.1:9");
        assert!(!cfg.secured);
        assert!(!cfg.billing_enabled);
    }
}
