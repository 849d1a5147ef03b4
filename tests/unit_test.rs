// Unit tests for impersonate-admin
// These exercise the public building blocks without a terminal or backend.

#[cfg(test)]
mod billing_tests {
    use impersonate_admin::api::Charge;
    use impersonate_admin::billing::{ChargesPanel, grantable_plans};

    fn charge(id: &str, refunded: bool) -> Charge {
        Charge {
            id: id.to_string(),
            amount: 1000,
            currency: "usd".to_string(),
            created: 1_700_000_000,
            status: "succeeded".to_string(),
            refunded,
            amount_refunded: 0,
            description: Some("Monthly".to_string()),
        }
    }

    fn panel(charges: Vec<Charge>) -> ChargesPanel {
        ChargesPanel {
            charges,
            ..ChargesPanel::default()
        }
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut p = panel(vec![charge("a", false), charge("b", false)]);
        assert!(p.toggle("a"));
        assert!(p.is_selected("a"));
        assert!(p.toggle("a"));
        assert!(!p.is_selected("a"));
    }

    #[test]
    fn test_toggle_refunded_is_locked() {
        let mut p = panel(vec![charge("a", true)]);
        assert!(!p.toggle("a"));
        assert!(p.selected.is_empty());
        assert!(p.is_checked(&p.charges[0]));
    }

    #[test]
    fn test_toggle_unknown_id_is_ignored() {
        let mut p = panel(vec![charge("a", false)]);
        assert!(!p.toggle("zzz"));
        assert!(p.selected.is_empty());
    }

    #[test]
    fn test_can_refund_requires_selection_and_idle() {
        let mut p = panel(vec![charge("a", false)]);
        assert!(!p.can_refund());
        p.toggle("a");
        assert!(p.can_refund());
        p.refunding = true;
        assert!(!p.can_refund());
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut p = panel(vec![charge("a", false), charge("b", false)]);
        p.move_up();
        assert_eq!(p.cursor, 0);
        p.move_down();
        p.move_down();
        assert_eq!(p.cursor, 1);
        assert!(p.toggle_cursor());
        assert!(p.is_selected("b"));
    }

    #[test]
    fn test_close_clears_selection() {
        let mut p = panel(vec![charge("a", false)]);
        p.toggle("a");
        p.close();
        assert!(p.selected.is_empty());
    }

    #[test]
    fn test_confirm_message_counts_selection() {
        let mut p = panel(vec![charge("a", false), charge("b", false)]);
        p.toggle("a");
        p.toggle("b");
        assert_eq!(
            p.refund_confirm_message(),
            "Are you sure you want to refund 2 charge(s)? This cannot be undone."
        );
    }

    #[test]
    fn test_grantable_plans_default_list() {
        let plans: Vec<String> = impersonate_admin::billing::DEFAULT_PLANS
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(grantable_plans(&plans), vec!["STANDARD", "TEAM", "PRO", "ULTIMATE"]);
    }
}

#[cfg(test)]
mod config_tests {
    use impersonate_admin::app::config::AppConfig;

    #[test]
    fn test_config_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.conf").to_string_lossy().to_string();
        let cfg = AppConfig {
            base_url: "https://api.example.com".into(),
            secured: false,
            billing_enabled: true,
            timeout_secs: 12,
            plans: vec!["FREE".into(), "PRO".into()],
            cookie_file: "/tmp/cookies.conf".into(),
        };
        cfg.write_file(&path).unwrap();
        assert_eq!(AppConfig::from_file(&path), Some(cfg));
    }

    #[test]
    fn test_config_load_or_init_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.conf");
        let path_str = path.to_string_lossy().to_string();
        let cfg = AppConfig::load_or_init(&path_str);
        // Either the defaults were written here, or a per-user config was found.
        if path.exists() {
            assert_eq!(cfg, AppConfig::default());
        }
    }

    #[test]
    fn test_config_missing_file() {
        assert_eq!(AppConfig::from_file("/nonexistent/impersonate-admin.conf"), None);
    }
}

#[cfg(test)]
mod session_tests {
    use impersonate_admin::session::{CookieStore, IMPERSONATE_COOKIE};

    #[test]
    fn test_cookie_store_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.conf");

        let mut store = CookieStore::load(&path).unwrap();
        assert_eq!(store.header_value(), None);
        store.set(IMPERSONATE_COOKIE, "org-1-aaaa").unwrap();
        store.set("auth", "token").unwrap();

        let reloaded = CookieStore::load(&path).unwrap();
        assert_eq!(reloaded.get(IMPERSONATE_COOKIE), Some("org-1-aaaa"));
        assert_eq!(reloaded.get("auth"), Some("token"));
    }

    #[test]
    fn test_cookie_expire_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.conf");
        let mut store = CookieStore::load(&path).unwrap();
        store.set(IMPERSONATE_COOKIE, "x").unwrap();
        store.expire(IMPERSONATE_COOKIE).unwrap();

        let reloaded = CookieStore::load(&path).unwrap();
        assert_eq!(reloaded.get(IMPERSONATE_COOKIE), None);
    }
}

#[cfg(test)]
mod theme_tests {
    use impersonate_admin::app::Theme;

    #[test]
    fn test_theme_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.conf").to_string_lossy().to_string();
        let t = Theme::mocha();
        t.write_file(&path).unwrap();
        let t2 = Theme::from_file(&path).unwrap();
        assert_eq!(format!("{:?}", t.text), format!("{:?}", t2.text));
        assert_eq!(format!("{:?}", t.danger), format!("{:?}", t2.danger));
        assert_eq!(format!("{:?}", t.header_bg), format!("{:?}", t2.header_bg));
    }

    #[test]
    fn test_theme_ignores_bad_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.conf");
        std::fs::write(&path, "text = nothex\ntitle = #010203\n").unwrap();
        let t = Theme::from_file(&path.to_string_lossy()).unwrap();
        assert_eq!(format!("{:?}", t.text), format!("{:?}", Theme::mocha().text));
        assert_eq!(format!("{:?}", t.title), "Rgb(1, 2, 3)");
    }
}
