//! Impersonation lookup keyed on the query string.
//!
//! Results are fetched once per distinct query and kept until the query
//! changes again. An empty query never reaches the backend.
use std::collections::HashMap;

use tracing::{debug, info};

use crate::api::{AdminApi, ApiError, ImpersonationCandidate};

#[derive(Debug, Default)]
pub struct ImpersonationSearch {
    pub query: String,
    pub results: Vec<ImpersonationCandidate>,
    pub selected: usize,
    /// Query the current `results` belong to.
    fetched_for: Option<String>,
    cache: HashMap<String, Vec<ImpersonationCandidate>>,
}

impl ImpersonationSearch {
    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    /// Drop the query, and with it the result list.
    pub fn dismiss(&mut self) {
        self.query.clear();
        self.results.clear();
        self.selected = 0;
        self.fetched_for = None;
    }

    /// Whether the results on screen are stale for the current query.
    pub fn is_stale(&self) -> bool {
        self.fetched_for.as_deref() != Some(self.query.as_str())
    }

    /// Re-run the lookup if the query changed since the last one.
    pub fn refresh(&mut self, api: &dyn AdminApi) -> Result<(), ApiError> {
        if !self.is_stale() {
            return Ok(());
        }
        let key = self.query.clone();
        let results = if key.is_empty() {
            Vec::new()
        } else if let Some(hit) = self.cache.get(&key) {
            debug!(query = %key, "impersonation lookup served from cache");
            hit.clone()
        } else {
            let found = match api.search_users(&key) {
                Ok(found) => found,
                Err(e) => {
                    // Rows from an earlier query must not stay selectable.
                    self.results.clear();
                    self.selected = 0;
                    self.fetched_for = None;
                    return Err(e);
                }
            };
            debug!(query = %key, count = found.len(), "impersonation lookup");
            self.cache.insert(key.clone(), found.clone());
            found
        };
        self.results = results;
        self.selected = 0;
        self.fetched_for = Some(key);
        Ok(())
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn current(&self) -> Option<&ImpersonationCandidate> {
        self.results.get(self.selected)
    }

    /// Start impersonating the highlighted result. Returns the chosen id.
    pub fn select(&self, api: &dyn AdminApi) -> Result<Option<String>, ApiError> {
        let Some(candidate) = self.current() else {
            return Ok(None);
        };
        info!(user = %candidate.id, "switching impersonation");
        api.set_impersonation(&candidate.id)?;
        Ok(Some(candidate.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Charge, SessionSnapshot};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct LookupOnly {
        queries: RefCell<Vec<String>>,
        down: Cell<bool>,
    }

    impl AdminApi for LookupOnly {
        fn session(&self) -> Result<SessionSnapshot, ApiError> {
            Ok(SessionSnapshot::default())
        }
        fn list_charges(&self) -> Result<Vec<Charge>, ApiError> {
            Ok(Vec::new())
        }
        fn refund_charges(&self, _: &[String]) -> Result<(), ApiError> {
            Ok(())
        }
        fn cancel_subscription(&self) -> Result<(), ApiError> {
            Ok(())
        }
        fn add_subscription(&self, _: &str) -> Result<(), ApiError> {
            Ok(())
        }
        fn search_users(&self, name: &str) -> Result<Vec<ImpersonationCandidate>, ApiError> {
            self.queries.borrow_mut().push(name.to_string());
            if self.down.get() {
                return Err(ApiError::Request {
                    path: "/user/impersonate".to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(vec![ImpersonationCandidate {
                id: format!("id-{name}"),
                name: name.to_string(),
                email: format!("{name}@example.com"),
            }])
        }
        fn set_impersonation(&self, _: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[test]
    fn empty_query_yields_nothing_without_lookup() {
        let api = LookupOnly::default();
        let mut search = ImpersonationSearch::default();
        search.refresh(&api).unwrap();
        assert!(search.results.is_empty());
        assert!(api.queries.borrow().is_empty());
    }

    #[test]
    fn same_query_is_fetched_once() {
        let api = LookupOnly::default();
        let mut search = ImpersonationSearch::default();
        search.push_char('a');
        search.refresh(&api).unwrap();
        search.refresh(&api).unwrap();
        search.push_char('b');
        search.refresh(&api).unwrap();
        search.pop_char();
        search.refresh(&api).unwrap();
        assert_eq!(*api.queries.borrow(), vec!["a".to_string(), "ab".to_string()]);
        assert_eq!(search.results[0].name, "a");
    }

    #[test]
    fn clearing_query_empties_results() {
        let api = LookupOnly::default();
        let mut search = ImpersonationSearch::default();
        search.push_char('z');
        search.refresh(&api).unwrap();
        assert_eq!(search.results.len(), 1);
        search.pop_char();
        search.refresh(&api).unwrap();
        assert!(search.results.is_empty());
    }

    #[test]
    fn failed_lookup_drops_results_of_previous_query() {
        let api = LookupOnly::default();
        let mut search = ImpersonationSearch::default();
        search.push_char('a');
        search.refresh(&api).unwrap();
        assert_eq!(search.current().map(|c| c.id.as_str()), Some("id-a"));

        api.down.set(true);
        search.push_char('b');
        assert!(search.refresh(&api).is_err());
        assert_eq!(search.query, "ab");
        assert!(search.results.is_empty());
        assert!(search.current().is_none());
        assert!(search.is_stale());
        assert_eq!(search.select(&api).unwrap(), None);
    }
}
