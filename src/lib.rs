//! Library crate for impersonate-admin.
//!
//! This crate exposes the building blocks of the TUI:
//! - Backend client and wire types (`api`)
//! - Application state, config and update loop (`app`)
//! - Charges, refunds and subscription actions (`billing`)
//! - Error and result types (`error`)
//! - Impersonation lookup (`search`)
//! - Cookie store and stopping impersonation (`session`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `impersonate-admin` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod billing;
pub mod error;
pub mod search;
pub mod session;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
