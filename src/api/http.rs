//! [`AdminApi`] over a blocking `reqwest` client.
//!
//! Cookies from the shared [`CookieStore`](crate::session::CookieStore) are sent
//! with every request and any `Set-Cookie` the backend returns is written back.
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{
    AddSubscriptionRequest, ImpersonateRequest, LookupEntry, RefundChargesRequest,
};
use super::{
    ADD_SUBSCRIPTION_PATH, AdminApi, ApiError, CANCEL_SUBSCRIPTION_PATH, CHARGES_PATH, Charge,
    IMPERSONATE_PATH, ImpersonationCandidate, REFUND_CHARGES_PATH, SELF_PATH, SessionSnapshot,
};
use crate::session::SharedCookies;

pub struct HttpAdminApi {
    base_url: String,
    http: Client,
    cookies: SharedCookies,
}

impl HttpAdminApi {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        cookies: SharedCookies,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request {
                path: base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            base_url,
            http,
            cookies,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let header = self.cookies.lock().ok().and_then(|c| c.header_value());
        let request = match header {
            Some(value) => request.header(COOKIE, value),
            None => request,
        };
        debug!(path, "backend request");
        let response = request.send().map_err(|e| ApiError::Request {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        self.absorb_cookies(&response);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(path, status = status.as_u16(), "backend rejected request");
            return Err(ApiError::Http {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        debug!(path, status = status.as_u16(), "backend response");
        Ok(response)
    }

    fn absorb_cookies(&self, response: &Response) {
        let Ok(mut store) = self.cookies.lock() else {
            return;
        };
        for value in response.headers().get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                if let Err(e) = store.absorb_set_cookie(raw) {
                    warn!(error = %e, "could not persist cookie");
                }
            }
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(path, request)?;
        let bytes = response.bytes().map_err(|e| ApiError::Request {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// POST and discard the response body; only the status decides success.
    fn post<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<(), ApiError> {
        let mut request = self.http.post(self.endpoint(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(path, request)?;
        // Drain for connection reuse; the content is never interpreted.
        if let Err(e) = response.bytes() {
            debug!(path, error = %e, "response body unreadable, ignored");
        }
        Ok(())
    }
}

impl AdminApi for HttpAdminApi {
    fn session(&self) -> Result<SessionSnapshot, ApiError> {
        self.get_json(SELF_PATH, self.http.get(self.endpoint(SELF_PATH)))
    }

    fn list_charges(&self) -> Result<Vec<Charge>, ApiError> {
        self.get_json(CHARGES_PATH, self.http.get(self.endpoint(CHARGES_PATH)))
    }

    fn refund_charges(&self, charge_ids: &[String]) -> Result<(), ApiError> {
        self.post(REFUND_CHARGES_PATH, Some(&RefundChargesRequest { charge_ids }))
    }

    fn cancel_subscription(&self) -> Result<(), ApiError> {
        self.post::<()>(CANCEL_SUBSCRIPTION_PATH, None)
    }

    fn add_subscription(&self, plan: &str) -> Result<(), ApiError> {
        self.post(
            ADD_SUBSCRIPTION_PATH,
            Some(&AddSubscriptionRequest { subscription: plan }),
        )
    }

    fn search_users(&self, name: &str) -> Result<Vec<ImpersonationCandidate>, ApiError> {
        let request = self
            .http
            .get(self.endpoint(IMPERSONATE_PATH))
            .query(&[("name", name)]);
        let entries: Vec<LookupEntry> = self.get_json(IMPERSONATE_PATH, request)?;
        Ok(entries.into_iter().map(ImpersonationCandidate::from).collect())
    }

    fn set_impersonation(&self, user_id: &str) -> Result<(), ApiError> {
        self.post(IMPERSONATE_PATH, Some(&ImpersonateRequest { id: user_id }))
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
