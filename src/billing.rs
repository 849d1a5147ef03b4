//! Billing management for the impersonated account.
//!
//! [`ChargesPanel`] holds the fetched charges and the refund selection.
//! Subscription actions are plain functions since they carry no local state
//! beyond a busy flag owned by the caller.
use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::api::{AdminApi, ApiError, Charge};

pub const DEFAULT_PLANS: &[&str] = &["FREE", "STANDARD", "TEAM", "PRO", "ULTIMATE"];

/// Plans that can be granted for free: every configured key not containing `FREE`.
pub fn grantable_plans(plans: &[String]) -> Vec<String> {
    plans
        .iter()
        .filter(|p| !p.contains("FREE"))
        .cloned()
        .collect()
}

/// How a confirmed refund ended, when the backend accepted it or nothing was sent.
#[derive(Debug)]
pub enum RefundOutcome {
    /// Nothing selected, or a refund already in flight.
    Skipped,
    Refunded,
    /// Refund accepted; the charge list on screen predates it.
    ListStale(ApiError),
}

#[derive(Debug, Default)]
pub struct ChargesPanel {
    pub charges: Vec<Charge>,
    pub selected: BTreeSet<String>,
    pub cursor: usize,
    /// Bumped on every successful fetch.
    pub revision: u64,
    pub loading: bool,
    pub refunding: bool,
    pub cancelling: bool,
}

/// Clears a busy flag when dropped, whichever way the request ends.
struct BusyGuard<'a>(&'a mut bool);

impl<'a> BusyGuard<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl ChargesPanel {
    /// Fetch the charge list for a freshly opened billing modal.
    pub fn open(api: &dyn AdminApi) -> Result<Self, ApiError> {
        let mut panel = Self::default();
        panel.refresh(api)?;
        Ok(panel)
    }

    pub fn refresh(&mut self, api: &dyn AdminApi) -> Result<(), ApiError> {
        let charges = {
            let _busy = BusyGuard::raise(&mut self.loading);
            api.list_charges()?
        };
        self.charges = charges;
        self.revision += 1;
        self.cursor = self.cursor.min(self.charges.len().saturating_sub(1));
        // Ids that vanished or got refunded elsewhere cannot stay selected.
        let refundable: BTreeSet<&str> = self
            .charges
            .iter()
            .filter(|c| !c.refunded)
            .map(|c| c.id.as_str())
            .collect();
        self.selected.retain(|id| refundable.contains(id.as_str()));
        Ok(())
    }

    pub fn is_selected(&self, charge_id: &str) -> bool {
        self.selected.contains(charge_id)
    }

    /// Whether a row renders with its checkbox ticked.
    pub fn is_checked(&self, charge: &Charge) -> bool {
        charge.refunded || self.is_selected(&charge.id)
    }

    /// Flip a charge in or out of the refund selection.
    ///
    /// Refunded and unknown charges are locked; returns whether anything changed.
    pub fn toggle(&mut self, charge_id: &str) -> bool {
        let Some(charge) = self.charges.iter().find(|c| c.id == charge_id) else {
            return false;
        };
        if charge.refunded {
            return false;
        }
        if !self.selected.remove(charge_id) {
            self.selected.insert(charge_id.to_string());
        }
        true
    }

    pub fn toggle_cursor(&mut self) -> bool {
        match self.charges.get(self.cursor).map(|c| c.id.clone()) {
            Some(id) => self.toggle(&id),
            None => false,
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.charges.len() {
            self.cursor += 1;
        }
    }

    pub fn can_refund(&self) -> bool {
        !self.selected.is_empty() && !self.refunding
    }

    pub fn refund_label(&self) -> String {
        if self.selected.is_empty() {
            "Refund Selected".to_string()
        } else {
            format!("Refund Selected ({})", self.selected.len())
        }
    }

    pub fn refund_confirm_message(&self) -> String {
        format!(
            "Are you sure you want to refund {} charge(s)? This cannot be undone.",
            self.selected.len()
        )
    }

    /// Refund every selected charge in one request, then clear the selection
    /// and fetch the list again. A rejected request keeps the selection.
    ///
    /// `Err` means the refund itself was rejected. A refund that went through
    /// but could not be followed by a fresh charge list is reported as
    /// [`RefundOutcome::ListStale`].
    pub fn refund_selected(&mut self, api: &dyn AdminApi) -> Result<RefundOutcome, ApiError> {
        if !self.can_refund() {
            return Ok(RefundOutcome::Skipped);
        }
        let ids: Vec<String> = self.selected.iter().cloned().collect();
        {
            let _busy = BusyGuard::raise(&mut self.refunding);
            info!(count = ids.len(), "refunding charges");
            api.refund_charges(&ids)?;
        }
        self.selected.clear();
        match self.refresh(api) {
            Ok(()) => Ok(RefundOutcome::Refunded),
            Err(e) => {
                warn!(error = %e, "charges reload after refund failed");
                Ok(RefundOutcome::ListStale(e))
            }
        }
    }

    /// Cancel the subscription. Returns `true` when the session must reload.
    ///
    /// Failures only reset the busy flag; the caller is not told why.
    pub fn cancel_subscription(&mut self, api: &dyn AdminApi) -> bool {
        self.cancelling = true;
        info!("cancelling subscription");
        match api.cancel_subscription() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "cancel subscription failed");
                self.cancelling = false;
                false
            }
        }
    }

    /// Drop all client-only state when the modal closes.
    pub fn close(&mut self) {
        self.selected.clear();
        self.cursor = 0;
    }
}

pub const CANCEL_SUBSCRIPTION_CONFIRM: &str = "This will immediately cancel the subscription. \
     The user will be downgraded to the FREE plan. This cannot be undone.";
pub const ADD_SUBSCRIPTION_CONFIRM: &str = "Are you sure you want to add a user subscription?";

/// Grant `plan` to the impersonated account.
pub fn add_subscription(api: &dyn AdminApi, plan: &str) -> Result<(), ApiError> {
    info!(plan, "adding subscription");
    api.add_subscription(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grantable_plans_skip_free_variants() {
        let plans: Vec<String> = ["FREE", "STANDARD", "PRO", "FREE_TRIAL"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(grantable_plans(&plans), vec!["STANDARD", "PRO"]);
    }

    #[test]
    fn busy_guard_resets_flag_on_drop() {
        let mut flag = false;
        {
            let _g = BusyGuard::raise(&mut flag);
        }
        assert!(!flag);
    }

    #[test]
    fn refund_label_counts_selection() {
        let mut panel = ChargesPanel::default();
        assert_eq!(panel.refund_label(), "Refund Selected");
        panel.selected.insert("a".into());
        panel.selected.insert("b".into());
        assert_eq!(panel.refund_label(), "Refund Selected (2)");
    }
}
