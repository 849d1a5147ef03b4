//! Backend access: the [`AdminApi`] seam and its HTTP implementation.
//!
//! Every backend interaction the console performs goes through [`AdminApi`],
//! so screens can be driven in tests by an in-memory implementation.
pub mod http;
pub mod models;

use thiserror::Error;

pub use http::HttpAdminApi;
pub use models::{Charge, ImpersonationCandidate, SessionSnapshot};

pub const CHARGES_PATH: &str = "/billing/charges";
pub const REFUND_CHARGES_PATH: &str = "/billing/refund-charges";
pub const CANCEL_SUBSCRIPTION_PATH: &str = "/billing/cancel-subscription";
pub const ADD_SUBSCRIPTION_PATH: &str = "/billing/add-subscription";
pub const IMPERSONATE_PATH: &str = "/user/impersonate";
pub const SELF_PATH: &str = "/user/self";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend base url is missing")]
    BaseUrlMissing,
    #[error("request to {path} failed: {message}")]
    Request { path: String, message: String },
    #[error("{path} returned HTTP {status}: {body}")]
    Http {
        path: String,
        status: u16,
        body: String,
    },
    #[error("could not decode response from {path}: {message}")]
    Decode { path: String, message: String },
}

/// Operations the admin console performs against the backend.
pub trait AdminApi {
    /// `GET /user/self`
    fn session(&self) -> Result<SessionSnapshot, ApiError>;

    /// `GET /billing/charges`
    fn list_charges(&self) -> Result<Vec<Charge>, ApiError>;

    /// `POST /billing/refund-charges` with every id in one request.
    fn refund_charges(&self, charge_ids: &[String]) -> Result<(), ApiError>;

    /// `POST /billing/cancel-subscription`
    fn cancel_subscription(&self) -> Result<(), ApiError>;

    /// `POST /billing/add-subscription`
    fn add_subscription(&self, plan: &str) -> Result<(), ApiError>;

    /// `GET /user/impersonate?name=`
    fn search_users(&self, name: &str) -> Result<Vec<ImpersonationCandidate>, ApiError>;

    /// `POST /user/impersonate`. An empty `user_id` stops impersonating.
    fn set_impersonation(&self, user_id: &str) -> Result<(), ApiError>;
}
