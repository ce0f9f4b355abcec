//! Core library for the RPL portal client.
//!
//! - `api`: backend contract (`Gateway`) and its HTTP implementation
//! - `enrollment`: cascading RTO/offer/stream selection, submission, unit preview
//! - `students`: listing queries, search filters and pagination
//! - `auth`: persisted sessions and keychain credentials
//! - `dashboard`: role to dashboard dispatch

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod enrollment;
pub mod models;
pub mod students;
pub mod utils;

pub use api::{ApiClient, ApiError, Gateway};
pub use auth::{CredentialStore, Session, SessionData};
pub use config::Config;
pub use dashboard::{dashboards_for, Dashboard};
