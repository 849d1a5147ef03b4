//! Wire and display types exchanged with the backend.
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// A single payment transaction as reported by the billing provider.
///
/// Snapshots are never edited locally; a refund is reflected by fetching the
/// list again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    /// Amount in minor units (cents).
    pub amount: i64,
    pub currency: String,
    /// Creation time as epoch seconds.
    pub created: i64,
    pub status: String,
    pub refunded: bool,
    #[serde(default)]
    pub amount_refunded: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Charge {
    /// `$12.34 USD` style label. The dollar sign is fixed regardless of currency.
    pub fn amount_label(&self) -> String {
        let major = self.amount / 100;
        let minor = (self.amount % 100).abs();
        let sign = if self.amount < 0 && major == 0 { "-" } else { "" };
        format!(
            "${sign}{major}.{minor:02} {}",
            self.currency.to_uppercase()
        )
    }

    /// Creation date in the local timezone, or `-` for out-of-range timestamps.
    pub fn date_label(&self) -> String {
        match self.created_at() {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => "-".to_string(),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.created, 0).single()
    }

    pub fn status_label(&self) -> &'static str {
        if self.refunded { "Refunded" } else { "Paid" }
    }
}

/// Body of `POST /billing/refund-charges`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundChargesRequest<'a> {
    pub charge_ids: &'a [String],
}

/// Body of `POST /billing/add-subscription`.
#[derive(Debug, Serialize)]
pub struct AddSubscriptionRequest<'a> {
    pub subscription: &'a str,
}

/// Body of `POST /user/impersonate`. An empty id clears impersonation.
#[derive(Debug, Serialize)]
pub struct ImpersonateRequest<'a> {
    pub id: &'a str,
}

/// One row returned by `GET /user/impersonate?name=`.
#[derive(Clone, Debug, Deserialize)]
pub struct LookupEntry {
    pub id: String,
    pub user: LookupUser,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LookupUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A user the administrator can switch to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImpersonationCandidate {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl ImpersonationCandidate {
    /// `user:<tail> - <name> - <email>`, where tail is the last `-` segment of the id.
    pub fn label(&self) -> String {
        let tail = self.id.rsplit('-').next().unwrap_or(&self.id);
        format!("user:{tail} - {} - {}", self.name, self.email)
    }
}

impl From<LookupEntry> for ImpersonationCandidate {
    fn from(entry: LookupEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.user.name.unwrap_or_default(),
            email: entry.user.email.unwrap_or_default(),
        }
    }
}

/// What the backend says about the signed-in administrator's session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default, rename = "impersonate")]
    pub impersonating: bool,
    #[serde(default)]
    pub tier: Option<Tier>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Tier {
    #[serde(default)]
    pub current: Option<String>,
}

impl SessionSnapshot {
    pub fn current_tier(&self) -> Option<&str> {
        self.tier.as_ref().and_then(|t| t.current.as_deref())
    }

    /// Complimentary plans can only be granted to accounts on the free tier.
    pub fn on_free_tier(&self) -> bool {
        self.current_tier() == Some("FREE")
    }
}
