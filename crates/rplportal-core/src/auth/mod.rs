//! Authentication: persisted backend sessions and keychain credentials.
//!
//! - `Session`: access token plus expiry, persisted as `session.json`
//! - `CredentialStore`: password storage in the OS keychain via keyring

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
