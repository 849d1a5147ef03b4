//! Impersonation identity: the local cookie store and the stop action.
//!
//! The backend owns the "who am I acting as" state. On unsecured deployments
//! it is carried by a plain `impersonate` cookie the client controls, so
//! stopping there is purely local.
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use cookie::Cookie;
use tracing::info;

use crate::api::AdminApi;
use crate::error::{Context, Result, simple_error};

pub const IMPERSONATE_COOKIE: &str = "impersonate";

pub type SharedCookies = Arc<Mutex<CookieStore>>;

/// Cookies sent with every backend request, optionally persisted to a
/// `name = value` file.
#[derive(Clone, Debug, Default)]
pub struct CookieStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl CookieStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file yields an empty store bound to that path.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut entries = BTreeMap::new();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_ctx(|| format!("read cookie file {}", path.display()))?;
            for raw in contents.lines() {
                let line = raw.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let mut parts = line.splitn(2, '=');
                let k = parts.next().map(|s| s.trim()).unwrap_or("");
                let v = parts.next().map(|s| s.trim()).unwrap_or("");
                if !k.is_empty() && !v.is_empty() {
                    entries.insert(k.to_string(), v.to_string());
                }
            }
        }
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    pub fn shared(self) -> SharedCookies {
        Arc::new(Mutex::new(self))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Set a cookie; an empty value removes it.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            return self.expire(name);
        }
        self.entries.insert(name.to_string(), value.to_string());
        self.persist()
    }

    pub fn expire(&mut self, name: &str) -> Result<()> {
        if self.entries.remove(name).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Value for a `Cookie:` request header, if any cookie is held.
    pub fn header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        Some(pairs.join("; "))
    }

    /// Apply one `Set-Cookie` header value. Expired or emptied cookies are removed.
    pub fn absorb_set_cookie(&mut self, raw: &str) -> Result<()> {
        let parsed = Cookie::parse(raw)
            .map_err(|e| simple_error(format!("malformed Set-Cookie ({e}): {raw}")))?;
        let value = parsed.value().trim_matches('"');
        if is_expired(&parsed) || value.is_empty() {
            self.expire(parsed.name())
        } else {
            self.set(parsed.name(), value)
        }
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# impersonate-admin cookies\n");
        for (k, v) in &self.entries {
            let _ = writeln!(&mut buf, "{k} = {v}");
        }
        std::fs::write(path, buf).with_ctx(|| format!("write cookie file {}", path.display()))
    }
}

/// `Max-Age` wins over `Expires`, as user agents apply them.
fn is_expired(cookie: &Cookie<'_>) -> bool {
    if let Some(max_age) = cookie.max_age() {
        return max_age.whole_seconds() <= 0;
    }
    cookie
        .expires_datetime()
        .is_some_and(|at| at.unix_timestamp() <= Utc::now().timestamp())
}

/// Stop acting as another user.
///
/// Unsecured deployments only drop the local `impersonate` cookie; secured
/// ones ask the backend to clear it by posting an empty id.
pub fn stop_impersonating(
    api: &dyn AdminApi,
    secured: bool,
    cookies: &SharedCookies,
) -> Result<()> {
    if !secured {
        info!("clearing local impersonation cookie");
        let mut store = cookies
            .lock()
            .map_err(|_| simple_error("cookie store lock poisoned"))?;
        return store.expire(IMPERSONATE_COOKIE);
    }
    info!("asking backend to stop impersonation");
    api.set_impersonation("")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_joins_cookies_in_name_order() {
        let mut store = CookieStore::in_memory();
        store.set("impersonate", "u-42").unwrap();
        store.set("auth", "tok").unwrap();
        assert_eq!(store.header_value().as_deref(), Some("auth=tok; impersonate=u-42"));
    }

    #[test]
    fn set_cookie_with_negative_max_age_removes() {
        let mut store = CookieStore::in_memory();
        store.set("impersonate", "u-42").unwrap();
        store
            .absorb_set_cookie("impersonate=; Path=/; Max-Age=-10")
            .unwrap();
        assert_eq!(store.get("impersonate"), None);
        assert_eq!(store.header_value(), None);
    }

    #[test]
    fn set_cookie_with_past_expiry_removes() {
        let mut store = CookieStore::in_memory();
        store.set("impersonate", "u-42").unwrap();
        store
            .absorb_set_cookie("impersonate=u-42; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
            .unwrap();
        assert_eq!(store.get("impersonate"), None);
    }

    #[test]
    fn set_cookie_with_dashed_past_expiry_removes() {
        let mut store = CookieStore::in_memory();
        store.set("impersonate", "u-42").unwrap();
        store
            .absorb_set_cookie("impersonate=u-42; Path=/; Expires=Thu, 01-Jan-1970 00:00:00 GMT")
            .unwrap();
        assert_eq!(store.get("impersonate"), None);
    }

    #[test]
    fn set_cookie_with_future_expiry_is_kept() {
        let mut store = CookieStore::in_memory();
        store
            .absorb_set_cookie("auth=tok; Path=/; Expires=Fri, 01 Jan 2100 00:00:00 GMT")
            .unwrap();
        assert_eq!(store.get("auth"), Some("tok"));
    }

    #[test]
    fn positive_max_age_overrides_past_expiry() {
        let mut store = CookieStore::in_memory();
        store
            .absorb_set_cookie("auth=tok; Max-Age=3600; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
            .unwrap();
        assert_eq!(store.get("auth"), Some("tok"));
    }

    #[test]
    fn set_cookie_stores_value() {
        let mut store = CookieStore::in_memory();
        store
            .absorb_set_cookie("impersonate=u-7; Path=/; HttpOnly")
            .unwrap();
        assert_eq!(store.get("impersonate"), Some("u-7"));
    }

    #[test]
    fn malformed_set_cookie_is_rejected() {
        let mut store = CookieStore::in_memory();
        assert!(store.absorb_set_cookie("garbage").is_err());
    }
}
