//! State of the "invite new student" form.

use crate::api::Gateway;

use super::selector::{SelectorChain, SelectorEffect, SelectorEvent};
use super::submit::{
    submit_enrollment, EnrollmentError, EnrollmentOutcome, EnrollmentRequest, ValidationError,
};

#[derive(Debug, Clone, Default)]
pub struct EnrollmentForm {
    pub email: String,
    pub full_name: String,
    pub selector: SelectorChain,
    /// Whether the enrollment table has a stream column
    pub streams_supported: bool,
    submitting: bool,
    error: Option<String>,
}

impl EnrollmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_full_name(&mut self, full_name: impl Into<String>) {
        self.full_name = full_name.into();
    }

    /// Feed a selector event through the chain.
    pub fn apply(&mut self, event: SelectorEvent) -> Vec<SelectorEffect> {
        self.selector.apply(event)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Inline error: a failed submission, or a blocking load error
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| self.selector.error())
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting
            && !self.selector.organizations().is_empty()
            && self.selector.selected_org_id().is_some()
            && self.selector.selected_offer_id().is_some()
    }

    pub fn request(&self, company_id: Option<String>) -> EnrollmentRequest {
        EnrollmentRequest {
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            organization_id: self.selector.selected_org_id().map(String::from),
            offer: self.selector.selected_offer().cloned(),
            stream_id: self.selector.selected_stream_id().map(String::from),
            offer_has_streams: !self.selector.streams().is_empty(),
            streams_supported: self.streams_supported,
            company_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.request(None).validate()
    }

    /// Validate and mark the form busy. A validation failure is shown inline
    /// and nothing is sent. Refused while a submission is in flight.
    pub fn begin_submit(
        &mut self,
        company_id: Option<String>,
    ) -> Result<EnrollmentRequest, ValidationError> {
        if self.submitting {
            return Err(ValidationError::AlreadySubmitting);
        }
        self.error = None;
        let request = self.request(company_id);
        if let Err(e) = request.validate() {
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.submitting = true;
        Ok(request)
    }

    /// Apply a submission result. Success clears the form and runs
    /// `on_success`; failure keeps every field for another attempt.
    pub fn finish_submit(
        &mut self,
        result: Result<EnrollmentOutcome, EnrollmentError>,
        on_success: impl FnOnce(&EnrollmentOutcome),
    ) -> Result<String, String> {
        self.submitting = false;
        match result {
            Ok(outcome) => {
                self.reset();
                on_success(&outcome);
                Ok(outcome.message())
            }
            Err(e) => {
                let message = e.to_string();
                self.error = Some(message.clone());
                Err(message)
            }
        }
    }

    /// Clear contact fields and selections. The RTO list stays loaded.
    pub fn reset(&mut self) {
        self.email.clear();
        self.full_name.clear();
        self.selector.apply(SelectorEvent::Reset);
        self.submitting = false;
        self.error = None;
    }

    /// Run a whole submission against `gateway`.
    pub async fn submit<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        company_id: Option<String>,
        on_success: impl FnOnce(&EnrollmentOutcome),
    ) -> Result<String, String> {
        let request = self.begin_submit(company_id).map_err(|e| e.to_string())?;
        let result = submit_enrollment(gateway, &request).await;
        self.finish_submit(result, on_success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockGateway};
    use crate::models::{
        Offer, OfferStream, Organization, OrganizationRef, Profile, QualificationRef,
    };

    fn offer(id: &str) -> Offer {
        Offer {
            id: id.to_string(),
            qualification: Some(QualificationRef {
                id: "qual-1".to_string(),
                name: None,
                code: Some("BSB50420".to_string()),
            }),
            organization: Some(OrganizationRef {
                id: "rto-1".to_string(),
                name: None,
            }),
        }
    }

    fn stream(id: &str) -> OfferStream {
        OfferStream {
            id: id.to_string(),
            name: id.to_string(),
            offer_id: None,
        }
    }

    /// Form with an RTO, one offer and the given streams loaded
    fn ready_form(streams: Vec<OfferStream>) -> EnrollmentForm {
        let mut form = EnrollmentForm::new();
        form.streams_supported = true;
        form.selector.start();
        form.apply(SelectorEvent::OrganizationsLoaded(Ok(vec![Organization {
            id: "rto-1".to_string(),
            code: Some("1234".to_string()),
            name: None,
        }])));

        let effects = form.apply(SelectorEvent::OrganizationSelected(Some("rto-1".to_string())));
        let generation = match effects.as_slice() {
            [SelectorEffect::FetchOffers { generation, .. }] => *generation,
            other => panic!("unexpected {:?}", other),
        };
        let effects = form.apply(SelectorEvent::OffersLoaded {
            generation,
            result: Ok(vec![offer("offer-1")]),
        });
        let generation = match effects.as_slice() {
            [SelectorEffect::FetchOfferDetails { generation, .. }] => *generation,
            other => panic!("unexpected {:?}", other),
        };
        form.apply(SelectorEvent::OfferDetailsLoaded {
            generation,
            streams: Ok(streams),
            units: Ok(Vec::new()),
        });

        form.set_email("jo@example.com");
        form.set_full_name("Jo Citizen");
        form
    }

    fn existing_profile() -> Profile {
        Profile {
            id: "p-1".to_string(),
            email: None,
            full_name: None,
            avatar_url: None,
            role: None,
            company_id: None,
            organization_id: None,
        }
    }

    #[test]
    fn test_can_submit_requires_selection() {
        let form = EnrollmentForm::new();
        assert!(!form.can_submit());
        assert!(ready_form(Vec::new()).can_submit());
    }

    #[test]
    fn test_missing_fields_shown_inline() {
        let mut form = ready_form(Vec::new());
        form.set_full_name("  ");
        assert_eq!(form.begin_submit(None), Err(ValidationError::MissingRequiredFields));
        assert_eq!(form.error(), Some("Please fill in all required fields."));
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_second_submit_refused_while_in_flight() {
        let mut form = ready_form(Vec::new());
        assert!(form.begin_submit(None).is_ok());
        assert!(form.is_submitting());
        assert!(!form.can_submit());

        assert_eq!(form.begin_submit(None), Err(ValidationError::AlreadySubmitting));
        assert!(form.is_submitting());
        assert!(form.error().is_none());
    }

    #[tokio::test]
    async fn test_submit_allowed_again_after_failure() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_find_profile_by_email()
            .times(1)
            .returning(|_| Err(ApiError::ServerError("down".to_string())));
        gateway
            .expect_invite_user()
            .times(1)
            .returning(|_, _| Err(ApiError::ServerError("down".to_string())));

        let mut form = ready_form(Vec::new());
        let request = form.begin_submit(None).expect("first submit starts");
        let result = submit_enrollment(&gateway, &request).await;
        assert!(form.finish_submit(result, |_| {}).is_err());

        assert!(!form.is_submitting());
        assert!(form.begin_submit(None).is_ok());
    }

    #[tokio::test]
    async fn test_missing_stream_sends_nothing() {
        let gateway = MockGateway::new();
        let mut form = ready_form(vec![stream("a"), stream("b")]);
        let mut calls = 0;

        let result = form.submit(&gateway, None, |_| calls += 1).await;
        assert_eq!(result, Err("Please choose a stream for this offer.".to_string()));
        assert_eq!(calls, 0);
        assert_eq!(form.email, "jo@example.com");
    }

    #[tokio::test]
    async fn test_success_clears_form_and_calls_back_once() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_find_profile_by_email()
            .times(1)
            .returning(|_| Ok(Some(existing_profile())));
        gateway
            .expect_insert_enrollment()
            .withf(|e| e.stream_id.as_deref() == Some("only"))
            .times(1)
            .returning(|_| Ok(()));

        // Single stream is auto-selected
        let mut form = ready_form(vec![stream("only")]);
        let mut calls = 0;
        let result = form.submit(&gateway, None, |_| calls += 1).await;

        assert_eq!(result, Ok("Student invited/enrolled for BSB50420.".to_string()));
        assert_eq!(calls, 1);
        assert!(form.email.is_empty());
        assert!(form.full_name.is_empty());
        assert_eq!(form.selector.selected_org_id(), None);
        assert!(form.selector.offers().is_empty());
        assert!(form.selector.streams().is_empty());
        assert!(form.selector.units().is_empty());
        assert_eq!(form.selector.organizations().len(), 1);
        assert!(form.error().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_form_state() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_find_profile_by_email()
            .times(1)
            .returning(|_| Ok(Some(existing_profile())));
        gateway
            .expect_insert_enrollment()
            .times(1)
            .returning(|_| Err(ApiError::ServerError("insert failed".to_string())));

        let mut form = ready_form(Vec::new());
        let mut calls = 0;
        let result = form.submit(&gateway, None, |_| calls += 1).await;

        assert!(result.is_err());
        assert_eq!(calls, 0);
        assert_eq!(form.email, "jo@example.com");
        assert_eq!(form.selector.selected_offer_id(), Some("offer-1"));
        assert!(form
            .error()
            .unwrap_or_default()
            .starts_with("User invited/linked, but failed to create enrollment"));
        assert!(!form.is_submitting());
    }
}
