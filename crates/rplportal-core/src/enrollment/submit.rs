//! Enrollment submission: validate locally, resolve or invite the student,
//! then insert the enrollment row.
//!
//! The identity step and the insert are separate remote writes. If the insert
//! fails after a user was invited or linked, the error says so and carries
//! the resolved profile id; nothing is rolled back.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, Gateway};
use crate::models::{InviteMetadata, NewEnrollment, NewProfile, Offer, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields.")]
    MissingRequiredFields,

    #[error("Please choose a stream for this offer.")]
    MissingStream,

    #[error("This student is already being submitted.")]
    AlreadySubmitting,
}

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Selected offer details are incomplete. Please re-select.")]
    IncompleteOffer,

    #[error("User exists but profile not found. Ask them to log in once or create profile manually.")]
    ProfileNotFound,

    #[error("Invite error: {}", .0.detail())]
    Invite(ApiError),

    #[error("User invited/linked, but failed to create enrollment: {}", .source.detail())]
    EnrollmentInsert { profile_id: String, source: ApiError },
}

/// Everything needed to submit one enrollment, captured from the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentRequest {
    pub email: String,
    pub full_name: String,
    pub organization_id: Option<String>,
    pub offer: Option<Offer>,
    pub stream_id: Option<String>,
    /// The selected offer has at least one stream
    pub offer_has_streams: bool,
    /// The enrollment table has a stream column
    pub streams_supported: bool,
    /// Company of the staff member submitting
    pub company_id: Option<String>,
}

impl EnrollmentRequest {
    /// Local checks, made before any remote call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let filled = |s: &str| !s.trim().is_empty();
        let org_selected = self.organization_id.as_deref().is_some_and(filled);
        if !filled(&self.email) || !filled(&self.full_name) || !org_selected || self.offer.is_none() {
            return Err(ValidationError::MissingRequiredFields);
        }
        if self.streams_supported && self.offer_has_streams && self.stream_id.is_none() {
            return Err(ValidationError::MissingStream);
        }
        Ok(())
    }
}

/// A completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentOutcome {
    pub profile_id: String,
    pub qualification: String,
}

impl EnrollmentOutcome {
    pub fn message(&self) -> String {
        format!("Student invited/enrolled for {}.", self.qualification)
    }
}

/// Find the profile for `email`, inviting a new user when there is none.
pub async fn resolve_identity<G: Gateway + ?Sized>(
    gateway: &G,
    email: &str,
    full_name: &str,
    company_id: Option<&str>,
    organization_id: &str,
) -> Result<String, EnrollmentError> {
    match gateway.find_profile_by_email(email).await {
        Ok(Some(profile)) => {
            debug!(profile_id = %profile.id, "Linking existing profile");
            return Ok(profile.id);
        }
        Ok(None) => {}
        // Treated like "no profile": the invite below reports the real problem
        Err(e) => warn!(error = %e, "Profile lookup failed"),
    }

    let metadata = InviteMetadata {
        full_name: full_name.to_string(),
        role: UserRole::Student,
        company_id: company_id.map(String::from),
        organization_id: Some(organization_id.to_string()),
    };

    let invited = match gateway.invite_user(email, &metadata).await {
        Ok(invited) => invited,
        Err(ApiError::AlreadyRegistered(message)) => {
            debug!(message = %message, "User already registered, looking up profile again");
            return match gateway.find_profile_by_email(email).await {
                Ok(Some(profile)) => Ok(profile.id),
                Ok(None) => Err(EnrollmentError::ProfileNotFound),
                Err(e) => {
                    warn!(error = %e, "Second profile lookup failed");
                    Err(EnrollmentError::ProfileNotFound)
                }
            };
        }
        Err(e) => return Err(EnrollmentError::Invite(e)),
    };

    info!(user_id = %invited.user_id, "Invited new student");

    let profile = NewProfile {
        id: invited.user_id.clone(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        role: UserRole::Student,
        company_id: company_id.map(String::from),
        organization_id: Some(organization_id.to_string()),
    };
    if let Err(e) = gateway.upsert_profile(&profile).await {
        warn!(user_id = %invited.user_id, error = %e, "Profile upsert failed");
    }

    Ok(invited.user_id)
}

/// Validate, resolve the student's identity and insert the enrollment.
pub async fn submit_enrollment<G: Gateway + ?Sized>(
    gateway: &G,
    request: &EnrollmentRequest,
) -> Result<EnrollmentOutcome, EnrollmentError> {
    request.validate()?;

    let offer = request
        .offer
        .as_ref()
        .ok_or(EnrollmentError::IncompleteOffer)?;
    let (qualification, organization) = match (&offer.qualification, &offer.organization) {
        (Some(q), Some(o)) => (q, o),
        _ => return Err(EnrollmentError::IncompleteOffer),
    };

    let email = request.email.trim();
    let full_name = request.full_name.trim();

    let profile_id = resolve_identity(
        gateway,
        email,
        full_name,
        request.company_id.as_deref(),
        &organization.id,
    )
    .await?;

    let stream_id = if request.streams_supported {
        request.stream_id.clone()
    } else {
        None
    };
    let enrollment = NewEnrollment::pending(
        profile_id.clone(),
        offer.id.clone(),
        qualification.id.clone(),
        organization.id.clone(),
        request.company_id.clone(),
        stream_id,
    );

    if let Err(source) = gateway.insert_enrollment(&enrollment).await {
        warn!(profile_id = %profile_id, offer_id = %offer.id, error = %source, "Enrollment insert failed");
        return Err(EnrollmentError::EnrollmentInsert { profile_id, source });
    }

    info!(profile_id = %profile_id, offer_id = %offer.id, "Enrollment created");

    Ok(EnrollmentOutcome {
        profile_id,
        qualification: qualification
            .label()
            .unwrap_or(&qualification.id)
            .to_string(),
    })
}
