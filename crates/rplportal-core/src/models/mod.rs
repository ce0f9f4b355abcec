//! Data models for portal entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Organization`: RTO reference data
//! - `Offer`, `OfferStream`, `OfferUnit`: the qualification catalogue an RTO delivers
//! - `Profile`, `UserRole`: signed-in users and invitation metadata
//! - `NewEnrollment`, `StudentSummary`: enrollment records and listing rows
//! - `AssessorAssignment`, `StudentAssignment`: admin RTO assignment rows

pub mod assignment;
pub mod offer;
pub mod organization;
pub mod profile;
pub mod student;

pub use assignment::{AssessorAssignment, Assignable, AssignedProfile, StudentAssignment};
pub use offer::{Offer, OfferStream, OfferUnit, QualificationRef, UnitRef};
pub use organization::{Organization, OrganizationRef};
pub use profile::{InviteMetadata, InvitedUser, NewProfile, Profile, UserRole};
pub use student::{NewEnrollment, StudentStatus, StudentSummary, ENDORSE_PROGRESS_THRESHOLD};
