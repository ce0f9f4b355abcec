//! Backend access for the portal.
//!
//! `Gateway` is the contract the rest of the crate programs against;
//! `ApiClient` implements it over HTTP against a PostgREST data API and a
//! GoTrue auth API. Requests carry the project's anon key and, once signed
//! in, the user's bearer token.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::Gateway;

#[cfg(test)]
pub use gateway::MockGateway;
