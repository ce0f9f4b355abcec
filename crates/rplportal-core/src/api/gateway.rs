use async_trait::async_trait;

use super::ApiError;
use crate::auth::SessionData;
use crate::models::{
    AssessorAssignment, InviteMetadata, InvitedUser, NewEnrollment, NewProfile, Offer,
    OfferStream, OfferUnit, Organization, Profile, StudentAssignment, StudentStatus,
    StudentSummary,
};
use crate::students::{StudentPage, StudentQuery};

/// Contract with the remote backend.
///
/// Every operation is a single remote call. Nothing here retries; callers
/// decide how a failure is reported.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Password sign-in against the auth service.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionData, ApiError>;

    /// Revoke the current access token.
    async fn sign_out(&self) -> Result<(), ApiError>;

    /// Profile row for an auth user. No row is `Ok(None)`.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, ApiError>;

    /// All RTOs ordered by trading name.
    async fn list_organizations(&self) -> Result<Vec<Organization>, ApiError>;

    /// Active offers of one RTO ordered by id, qualification and RTO expanded.
    async fn list_active_offers(&self, org_id: &str) -> Result<Vec<Offer>, ApiError>;

    /// Streams of one offer ordered by name.
    async fn list_offer_streams(&self, offer_id: &str) -> Result<Vec<OfferStream>, ApiError>;

    /// Units of one offer ordered by unit type, unit expanded.
    async fn list_offer_units(&self, offer_id: &str) -> Result<Vec<OfferUnit>, ApiError>;

    /// Whether the enrollment table has a `stream_id` column.
    async fn supports_enrollment_streams(&self) -> bool;

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, ApiError>;

    /// Invite a new user by email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AlreadyRegistered`] when the email already belongs
    /// to a user.
    async fn invite_user(
        &self,
        email: &str,
        metadata: &InviteMetadata,
    ) -> Result<InvitedUser, ApiError>;

    /// Insert or update a profile keyed by id.
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<(), ApiError>;

    async fn insert_enrollment(&self, enrollment: &NewEnrollment) -> Result<(), ApiError>;

    /// One page of the portfolio listing with the exact total.
    async fn list_students(&self, query: &StudentQuery) -> Result<StudentPage, ApiError>;

    /// Enrollments at one RTO in a given status (assessor queue).
    async fn list_students_for_organization(
        &self,
        org_id: &str,
        status: StudentStatus,
    ) -> Result<Vec<StudentSummary>, ApiError>;

    /// A student's own enrollments.
    async fn list_enrollments_for_profile(
        &self,
        profile_id: &str,
    ) -> Result<Vec<StudentSummary>, ApiError>;

    /// Mark an enrollment endorsed.
    async fn endorse_student(&self, student_id: &str) -> Result<(), ApiError>;

    async fn list_assessors(&self) -> Result<Vec<AssessorAssignment>, ApiError>;

    async fn list_student_assignments(&self) -> Result<Vec<StudentAssignment>, ApiError>;

    /// Set or clear (`None`) the RTO of an assessor profile.
    async fn assign_assessor_organization(
        &self,
        profile_id: &str,
        org_id: Option<String>,
    ) -> Result<(), ApiError>;

    /// Set or clear (`None`) the RTO of an enrollment.
    async fn assign_student_organization(
        &self,
        student_id: &str,
        org_id: Option<String>,
    ) -> Result<(), ApiError>;
}
