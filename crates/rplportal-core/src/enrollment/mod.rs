//! Enrollment workflow: the cascading selector chain, the submitter and the
//! unit preview shown while choosing an offer.

pub mod form;
pub mod preview;
pub mod selector;
pub mod submit;

pub use form::EnrollmentForm;
pub use preview::{build_preview, UnitGroup, UnitPreview, UNGROUPED};
pub use selector::{
    run_effect, SelectorChain, SelectorEffect, SelectorEvent, SelectorState, OFFER_LOAD_ERROR,
    RTO_LOAD_ERROR,
};
pub use submit::{
    resolve_identity, submit_enrollment, EnrollmentError, EnrollmentOutcome, EnrollmentRequest,
    ValidationError,
};
