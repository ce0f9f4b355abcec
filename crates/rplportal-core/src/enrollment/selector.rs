//! Cascading RTO -> offer -> stream/unit selection for the enrollment form.
//!
//! All state lives in [`SelectorChain`] and only changes through
//! [`SelectorChain::apply`]. Remote loads are returned as [`SelectorEffect`]s
//! for the caller to run (see [`run_effect`]); their results come back as
//! events tagged with the generation that requested them. A result whose
//! generation is no longer current is dropped, so the most recently
//! initiated selection always wins.

use tracing::{debug, error, warn};

use crate::api::{ApiError, Gateway};
use crate::models::{Offer, OfferStream, OfferUnit, Organization};

use super::preview::{build_preview, UnitPreview};

pub const RTO_LOAD_ERROR: &str = "Could not load RTOs.";
pub const OFFER_LOAD_ERROR: &str = "Could not load qualifications for the selected RTO.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectorState {
    #[default]
    NoOrgSelected,
    LoadingOffers {
        org_id: String,
    },
    OfferChoicesReady {
        org_id: String,
        offers: Vec<Offer>,
    },
    LoadingDetails {
        org_id: String,
        offers: Vec<Offer>,
        offer_id: String,
    },
    DetailsReady {
        org_id: String,
        offers: Vec<Offer>,
        offer_id: String,
        streams: Vec<OfferStream>,
        units: Vec<OfferUnit>,
        stream_id: Option<String>,
    },
}

#[derive(Debug)]
pub enum SelectorEvent {
    OrganizationsLoaded(Result<Vec<Organization>, ApiError>),
    /// `None` clears the selection
    OrganizationSelected(Option<String>),
    OffersLoaded {
        generation: u64,
        result: Result<Vec<Offer>, ApiError>,
    },
    OfferSelected(Option<String>),
    OfferDetailsLoaded {
        generation: u64,
        streams: Result<Vec<OfferStream>, ApiError>,
        units: Result<Vec<OfferUnit>, ApiError>,
    },
    StreamSelected(Option<String>),
    /// Clear every selection; the RTO list is kept
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEffect {
    FetchOrganizations,
    FetchOffers { org_id: String, generation: u64 },
    FetchOfferDetails { offer_id: String, generation: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct SelectorChain {
    organizations: Vec<Organization>,
    organizations_loading: bool,
    organizations_error: Option<String>,
    state: SelectorState,
    offers_error: Option<String>,
    offer_generation: u64,
    details_generation: u64,
}

impl SelectorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading the RTO list.
    pub fn start(&mut self) -> Vec<SelectorEffect> {
        self.organizations_loading = true;
        self.organizations_error = None;
        vec![SelectorEffect::FetchOrganizations]
    }

    pub fn apply(&mut self, event: SelectorEvent) -> Vec<SelectorEffect> {
        match event {
            SelectorEvent::OrganizationsLoaded(result) => {
                self.organizations_loading = false;
                match result {
                    Ok(orgs) => {
                        debug!(count = orgs.len(), "Loaded RTOs");
                        self.organizations = orgs;
                        self.organizations_error = None;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to load RTOs");
                        self.organizations.clear();
                        self.organizations_error = Some(RTO_LOAD_ERROR.to_string());
                    }
                }
                Vec::new()
            }
            SelectorEvent::OrganizationSelected(org_id) => self.select_organization(org_id),
            SelectorEvent::OffersLoaded { generation, result } => {
                self.offers_loaded(generation, result)
            }
            SelectorEvent::OfferSelected(offer_id) => self.select_offer(offer_id),
            SelectorEvent::OfferDetailsLoaded {
                generation,
                streams,
                units,
            } => {
                self.details_loaded(generation, streams, units);
                Vec::new()
            }
            SelectorEvent::StreamSelected(id) => {
                if let SelectorState::DetailsReady {
                    streams, stream_id, ..
                } = &mut self.state
                {
                    match id {
                        Some(id) if streams.iter().any(|s| s.id == id) => *stream_id = Some(id),
                        Some(id) => warn!(stream_id = %id, "Ignoring unknown stream"),
                        None => *stream_id = None,
                    }
                }
                Vec::new()
            }
            SelectorEvent::Reset => {
                self.select_organization(None);
                Vec::new()
            }
        }
    }

    fn select_organization(&mut self, org_id: Option<String>) -> Vec<SelectorEffect> {
        // Any load in flight for the old selection is now stale
        self.offer_generation += 1;
        self.details_generation += 1;
        self.offers_error = None;

        match org_id.filter(|id| !id.is_empty()) {
            None => {
                self.state = SelectorState::NoOrgSelected;
                Vec::new()
            }
            Some(org_id) => {
                self.state = SelectorState::LoadingOffers {
                    org_id: org_id.clone(),
                };
                vec![SelectorEffect::FetchOffers {
                    org_id,
                    generation: self.offer_generation,
                }]
            }
        }
    }

    fn offers_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<Offer>, ApiError>,
    ) -> Vec<SelectorEffect> {
        if generation != self.offer_generation {
            debug!(generation, current = self.offer_generation, "Dropping stale offer list");
            return Vec::new();
        }
        let org_id = match &self.state {
            SelectorState::LoadingOffers { org_id } => org_id.clone(),
            _ => return Vec::new(),
        };

        let offers = match result {
            Ok(offers) => offers,
            Err(e) => {
                error!(org_id = %org_id, error = %e, "Failed to load offers");
                self.offers_error = Some(OFFER_LOAD_ERROR.to_string());
                Vec::new()
            }
        };

        let only_offer = match offers.as_slice() {
            [offer] => Some(offer.id.clone()),
            _ => None,
        };
        self.state = SelectorState::OfferChoicesReady { org_id, offers };

        match only_offer {
            Some(offer_id) => self.select_offer(Some(offer_id)),
            None => Vec::new(),
        }
    }

    fn select_offer(&mut self, offer_id: Option<String>) -> Vec<SelectorEffect> {
        let (org_id, offers) = match std::mem::take(&mut self.state) {
            SelectorState::OfferChoicesReady { org_id, offers }
            | SelectorState::LoadingDetails { org_id, offers, .. }
            | SelectorState::DetailsReady { org_id, offers, .. } => (org_id, offers),
            other => {
                // No offer list to choose from yet
                self.state = other;
                return Vec::new();
            }
        };

        self.details_generation += 1;

        match offer_id.filter(|id| offers.iter().any(|o| &o.id == id)) {
            None => {
                self.state = SelectorState::OfferChoicesReady { org_id, offers };
                Vec::new()
            }
            Some(offer_id) => {
                self.state = SelectorState::LoadingDetails {
                    org_id,
                    offers,
                    offer_id: offer_id.clone(),
                };
                vec![SelectorEffect::FetchOfferDetails {
                    offer_id,
                    generation: self.details_generation,
                }]
            }
        }
    }

    fn details_loaded(
        &mut self,
        generation: u64,
        streams: Result<Vec<OfferStream>, ApiError>,
        units: Result<Vec<OfferUnit>, ApiError>,
    ) {
        if generation != self.details_generation {
            debug!(generation, current = self.details_generation, "Dropping stale offer details");
            return;
        }
        let (org_id, offers, offer_id) = match std::mem::take(&mut self.state) {
            SelectorState::LoadingDetails {
                org_id,
                offers,
                offer_id,
            } => (org_id, offers, offer_id),
            other => {
                self.state = other;
                return;
            }
        };

        let streams = streams.unwrap_or_else(|e| {
            warn!(offer_id = %offer_id, error = %e, "Failed to load offer streams");
            Vec::new()
        });
        let units = units.unwrap_or_else(|e| {
            warn!(offer_id = %offer_id, error = %e, "Failed to load offer units");
            Vec::new()
        });
        let stream_id = match streams.as_slice() {
            [stream] => Some(stream.id.clone()),
            _ => None,
        };

        self.state = SelectorState::DetailsReady {
            org_id,
            offers,
            offer_id,
            streams,
            units,
            stream_id,
        };
    }

    // ===== Queries =====

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn organizations_loading(&self) -> bool {
        self.organizations_loading
    }

    /// Blocking load error to show above the form
    pub fn error(&self) -> Option<&str> {
        self.organizations_error
            .as_deref()
            .or(self.offers_error.as_deref())
    }

    pub fn selected_org_id(&self) -> Option<&str> {
        match &self.state {
            SelectorState::NoOrgSelected => None,
            SelectorState::LoadingOffers { org_id }
            | SelectorState::OfferChoicesReady { org_id, .. }
            | SelectorState::LoadingDetails { org_id, .. }
            | SelectorState::DetailsReady { org_id, .. } => Some(org_id),
        }
    }

    pub fn selected_organization(&self) -> Option<&Organization> {
        let id = self.selected_org_id()?;
        self.organizations.iter().find(|o| o.id == id)
    }

    pub fn offers(&self) -> &[Offer] {
        match &self.state {
            SelectorState::OfferChoicesReady { offers, .. }
            | SelectorState::LoadingDetails { offers, .. }
            | SelectorState::DetailsReady { offers, .. } => offers,
            _ => &[],
        }
    }

    pub fn selected_offer_id(&self) -> Option<&str> {
        match &self.state {
            SelectorState::LoadingDetails { offer_id, .. }
            | SelectorState::DetailsReady { offer_id, .. } => Some(offer_id),
            _ => None,
        }
    }

    pub fn selected_offer(&self) -> Option<&Offer> {
        let id = self.selected_offer_id()?;
        self.offers().iter().find(|o| o.id == id)
    }

    pub fn streams(&self) -> &[OfferStream] {
        match &self.state {
            SelectorState::DetailsReady { streams, .. } => streams,
            _ => &[],
        }
    }

    pub fn selected_stream_id(&self) -> Option<&str> {
        match &self.state {
            SelectorState::DetailsReady { stream_id, .. } => stream_id.as_deref(),
            _ => None,
        }
    }

    pub fn units(&self) -> &[OfferUnit] {
        match &self.state {
            SelectorState::DetailsReady { units, .. } => units,
            _ => &[],
        }
    }

    pub fn preview(&self) -> UnitPreview {
        build_preview(self.units())
    }

    pub fn is_loading_offers(&self) -> bool {
        matches!(self.state, SelectorState::LoadingOffers { .. })
    }

    pub fn is_loading_details(&self) -> bool {
        matches!(self.state, SelectorState::LoadingDetails { .. })
    }
}

/// Run one effect against the backend and produce the event that reports it.
pub async fn run_effect<G: Gateway + ?Sized>(gateway: &G, effect: SelectorEffect) -> SelectorEvent {
    match effect {
        SelectorEffect::FetchOrganizations => {
            SelectorEvent::OrganizationsLoaded(gateway.list_organizations().await)
        }
        SelectorEffect::FetchOffers { org_id, generation } => SelectorEvent::OffersLoaded {
            generation,
            result: gateway.list_active_offers(&org_id).await,
        },
        SelectorEffect::FetchOfferDetails {
            offer_id,
            generation,
        } => {
            let (streams, units) = tokio::join!(
                gateway.list_offer_streams(&offer_id),
                gateway.list_offer_units(&offer_id)
            );
            SelectorEvent::OfferDetailsLoaded {
                generation,
                streams,
                units,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockGateway;
    use crate::models::{OrganizationRef, QualificationRef, UnitRef};

    fn offer(id: &str) -> Offer {
        Offer {
            id: id.to_string(),
            qualification: Some(QualificationRef {
                id: format!("q-{}", id),
                name: Some(format!("Qualification {}", id)),
                code: Some(format!("Q{}", id)),
            }),
            organization: Some(OrganizationRef {
                id: "rto-1".to_string(),
                name: Some("Northside Skills".to_string()),
            }),
        }
    }

    fn stream(id: &str) -> OfferStream {
        OfferStream {
            id: id.to_string(),
            name: format!("Stream {}", id),
            offer_id: None,
        }
    }

    fn unit(id: &str, unit_type: &str) -> OfferUnit {
        OfferUnit {
            id: id.to_string(),
            unit_type: Some(unit_type.to_string()),
            group_code: None,
            application_notes: None,
            unit: Some(UnitRef {
                id: format!("u-{}", id),
                code: id.to_uppercase(),
                name: None,
            }),
        }
    }

    fn org(id: &str) -> Organization {
        Organization {
            id: id.to_string(),
            code: None,
            name: Some(format!("RTO {}", id)),
        }
    }

    fn offers_generation(effects: &[SelectorEffect]) -> u64 {
        match effects {
            [SelectorEffect::FetchOffers { generation, .. }] => *generation,
            other => panic!("expected one FetchOffers, got {:?}", other),
        }
    }

    fn details_generation(effects: &[SelectorEffect]) -> u64 {
        match effects {
            [SelectorEffect::FetchOfferDetails { generation, .. }] => *generation,
            other => panic!("expected one FetchOfferDetails, got {:?}", other),
        }
    }

    /// Chain with an organization selected and two offers loaded
    fn chain_with_offers() -> SelectorChain {
        let mut chain = SelectorChain::new();
        let generation = offers_generation(&chain.apply(SelectorEvent::OrganizationSelected(Some(
            "rto-1".to_string(),
        ))));
        chain.apply(SelectorEvent::OffersLoaded {
            generation,
            result: Ok(vec![offer("o1"), offer("o2")]),
        });
        chain
    }

    #[test]
    fn test_start_requests_organizations() {
        let mut chain = SelectorChain::new();
        assert_eq!(chain.start(), vec![SelectorEffect::FetchOrganizations]);
        assert!(chain.organizations_loading());

        chain.apply(SelectorEvent::OrganizationsLoaded(Ok(vec![org("a"), org("b")])));
        assert!(!chain.organizations_loading());
        assert_eq!(chain.organizations().len(), 2);
        assert!(chain.error().is_none());
    }

    #[test]
    fn test_organization_failure_is_blocking() {
        let mut chain = SelectorChain::new();
        chain.start();
        chain.apply(SelectorEvent::OrganizationsLoaded(Err(ApiError::RateLimited)));
        assert!(chain.organizations().is_empty());
        assert_eq!(chain.error(), Some(RTO_LOAD_ERROR));
    }

    #[test]
    fn test_selecting_organization_fetches_offers() {
        let mut chain = SelectorChain::new();
        let effects = chain.apply(SelectorEvent::OrganizationSelected(Some("rto-1".to_string())));
        assert!(matches!(
            effects.as_slice(),
            [SelectorEffect::FetchOffers { org_id, .. }] if org_id == "rto-1"
        ));
        assert!(chain.is_loading_offers());
        assert_eq!(chain.selected_org_id(), Some("rto-1"));
    }

    #[test]
    fn test_selected_organization_resolves_from_list() {
        let mut chain = SelectorChain::new();
        chain.start();
        chain.apply(SelectorEvent::OrganizationsLoaded(Ok(vec![org("a"), org("b")])));
        assert!(chain.selected_organization().is_none());

        chain.apply(SelectorEvent::OrganizationSelected(Some("b".to_string())));
        assert_eq!(
            chain.selected_organization().map(|o| o.display_name()),
            Some("RTO b")
        );
    }

    #[test]
    fn test_single_offer_is_auto_selected() {
        let mut chain = SelectorChain::new();
        let generation = offers_generation(
            &chain.apply(SelectorEvent::OrganizationSelected(Some("rto-1".to_string()))),
        );
        let effects = chain.apply(SelectorEvent::OffersLoaded {
            generation,
            result: Ok(vec![offer("o1")]),
        });
        assert!(matches!(
            effects.as_slice(),
            [SelectorEffect::FetchOfferDetails { offer_id, .. }] if offer_id == "o1"
        ));
        assert_eq!(chain.selected_offer_id(), Some("o1"));
        assert!(chain.is_loading_details());
    }

    #[test]
    fn test_zero_or_many_offers_not_auto_selected() {
        let chain = chain_with_offers();
        assert_eq!(chain.offers().len(), 2);
        assert_eq!(chain.selected_offer_id(), None);

        let mut chain = SelectorChain::new();
        let generation = offers_generation(
            &chain.apply(SelectorEvent::OrganizationSelected(Some("rto-1".to_string()))),
        );
        let effects = chain.apply(SelectorEvent::OffersLoaded {
            generation,
            result: Ok(Vec::new()),
        });
        assert!(effects.is_empty());
        assert_eq!(chain.selected_offer_id(), None);
        assert!(matches!(chain.state(), SelectorState::OfferChoicesReady { .. }));
    }

    #[test]
    fn test_offer_failure_is_blocking_and_empties_list() {
        let mut chain = SelectorChain::new();
        let generation = offers_generation(
            &chain.apply(SelectorEvent::OrganizationSelected(Some("rto-1".to_string()))),
        );
        chain.apply(SelectorEvent::OffersLoaded {
            generation,
            result: Err(ApiError::ServerError("boom".to_string())),
        });
        assert!(chain.offers().is_empty());
        assert_eq!(chain.error(), Some(OFFER_LOAD_ERROR));

        // A new organization clears the offer error
        chain.apply(SelectorEvent::OrganizationSelected(Some("rto-2".to_string())));
        assert!(chain.error().is_none());
    }

    #[test]
    fn test_last_initiated_organization_wins() {
        let mut chain = SelectorChain::new();
        let first = offers_generation(
            &chain.apply(SelectorEvent::OrganizationSelected(Some("rto-a".to_string()))),
        );
        let second = offers_generation(
            &chain.apply(SelectorEvent::OrganizationSelected(Some("rto-b".to_string()))),
        );

        // The later request resolves first, then the earlier one arrives late
        chain.apply(SelectorEvent::OffersLoaded {
            generation: second,
            result: Ok(vec![offer("b1"), offer("b2")]),
        });
        chain.apply(SelectorEvent::OffersLoaded {
            generation: first,
            result: Ok(vec![offer("a1")]),
        });

        assert_eq!(chain.selected_org_id(), Some("rto-b"));
        let ids: Vec<&str> = chain.offers().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert_eq!(chain.selected_offer_id(), None);
    }

    #[test]
    fn test_stale_details_are_dropped() {
        let mut chain = chain_with_offers();
        let first = details_generation(&chain.apply(SelectorEvent::OfferSelected(Some("o1".to_string()))));
        let second = details_generation(&chain.apply(SelectorEvent::OfferSelected(Some("o2".to_string()))));

        chain.apply(SelectorEvent::OfferDetailsLoaded {
            generation: first,
            streams: Ok(vec![stream("s-old")]),
            units: Ok(vec![unit("old", "core")]),
        });
        assert!(chain.is_loading_details());

        chain.apply(SelectorEvent::OfferDetailsLoaded {
            generation: second,
            streams: Ok(vec![stream("s1"), stream("s2")]),
            units: Ok(vec![unit("a", "core")]),
        });
        assert_eq!(chain.selected_offer_id(), Some("o2"));
        assert_eq!(chain.streams().len(), 2);
        assert_eq!(chain.selected_stream_id(), None);
        assert_eq!(chain.units()[0].id, "a");
    }

    #[test]
    fn test_single_stream_is_auto_selected() {
        let mut chain = chain_with_offers();
        let generation =
            details_generation(&chain.apply(SelectorEvent::OfferSelected(Some("o1".to_string()))));
        chain.apply(SelectorEvent::OfferDetailsLoaded {
            generation,
            streams: Ok(vec![stream("s1")]),
            units: Ok(Vec::new()),
        });
        assert_eq!(chain.selected_stream_id(), Some("s1"));

        chain.apply(SelectorEvent::StreamSelected(None));
        assert_eq!(chain.selected_stream_id(), None);
        chain.apply(SelectorEvent::StreamSelected(Some("nope".to_string())));
        assert_eq!(chain.selected_stream_id(), None);
    }

    #[test]
    fn test_detail_failures_are_not_blocking() {
        let mut chain = chain_with_offers();
        let generation =
            details_generation(&chain.apply(SelectorEvent::OfferSelected(Some("o1".to_string()))));
        chain.apply(SelectorEvent::OfferDetailsLoaded {
            generation,
            streams: Err(ApiError::Unauthorized),
            units: Err(ApiError::ServerError("down".to_string())),
        });
        assert!(matches!(chain.state(), SelectorState::DetailsReady { .. }));
        assert!(chain.streams().is_empty());
        assert!(chain.units().is_empty());
        assert!(chain.error().is_none());
    }

    #[test]
    fn test_new_offer_clears_stream_and_preview() {
        let mut chain = chain_with_offers();
        let generation =
            details_generation(&chain.apply(SelectorEvent::OfferSelected(Some("o1".to_string()))));
        chain.apply(SelectorEvent::OfferDetailsLoaded {
            generation,
            streams: Ok(vec![stream("s1")]),
            units: Ok(vec![unit("a", "core")]),
        });

        chain.apply(SelectorEvent::OfferSelected(Some("o2".to_string())));
        assert!(chain.streams().is_empty());
        assert_eq!(chain.selected_stream_id(), None);
        assert!(chain.preview().is_empty());

        chain.apply(SelectorEvent::OfferSelected(None));
        assert_eq!(chain.selected_offer_id(), None);
        assert_eq!(chain.offers().len(), 2);
    }

    #[test]
    fn test_clearing_organization_is_idempotent() {
        let mut chain = chain_with_offers();
        chain.apply(SelectorEvent::OfferSelected(Some("o1".to_string())));

        chain.apply(SelectorEvent::OrganizationSelected(None));
        let once = chain.state().clone();
        chain.apply(SelectorEvent::OrganizationSelected(None));

        assert_eq!(once, SelectorState::NoOrgSelected);
        assert_eq!(chain.state(), &once);
        assert!(chain.offers().is_empty());
        assert!(chain.streams().is_empty());
        assert!(chain.units().is_empty());
        assert_eq!(chain.selected_offer_id(), None);
    }

    #[test]
    fn test_clearing_organization_drops_in_flight_offers() {
        let mut chain = SelectorChain::new();
        let generation = offers_generation(
            &chain.apply(SelectorEvent::OrganizationSelected(Some("rto-1".to_string()))),
        );
        chain.apply(SelectorEvent::OrganizationSelected(None));
        chain.apply(SelectorEvent::OffersLoaded {
            generation,
            result: Ok(vec![offer("o1")]),
        });
        assert_eq!(chain.state(), &SelectorState::NoOrgSelected);
    }

    #[test]
    fn test_offer_selection_needs_offer_list() {
        let mut chain = SelectorChain::new();
        let effects = chain.apply(SelectorEvent::OfferSelected(Some("o1".to_string())));
        assert!(effects.is_empty());
        assert_eq!(chain.state(), &SelectorState::NoOrgSelected);
    }

    #[test]
    fn test_reset_keeps_organizations() {
        let mut chain = chain_with_offers();
        chain.apply(SelectorEvent::OrganizationsLoaded(Ok(vec![org("rto-1")])));
        chain.apply(SelectorEvent::Reset);
        assert_eq!(chain.state(), &SelectorState::NoOrgSelected);
        assert_eq!(chain.organizations().len(), 1);
    }

    #[tokio::test]
    async fn test_run_effect_loads_streams_and_units() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_list_offer_streams()
            .withf(|offer_id| offer_id == "o1")
            .times(1)
            .returning(|_| Ok(vec![stream("s1")]));
        gateway
            .expect_list_offer_units()
            .withf(|offer_id| offer_id == "o1")
            .times(1)
            .returning(|_| Ok(vec![unit("a", "core"), unit("b", "elective")]));

        let event = run_effect(
            &gateway,
            SelectorEffect::FetchOfferDetails {
                offer_id: "o1".to_string(),
                generation: 7,
            },
        )
        .await;

        match event {
            SelectorEvent::OfferDetailsLoaded {
                generation,
                streams,
                units,
            } => {
                assert_eq!(generation, 7);
                assert_eq!(streams.unwrap().len(), 1);
                assert_eq!(units.unwrap().len(), 2);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_effect_fetches_offers_for_organization() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_list_active_offers()
            .withf(|org_id| org_id == "rto-9")
            .times(1)
            .returning(|_| Ok(vec![offer("o1")]));

        let event = run_effect(
            &gateway,
            SelectorEffect::FetchOffers {
                org_id: "rto-9".to_string(),
                generation: 3,
            },
        )
        .await;
        assert!(matches!(
            event,
            SelectorEvent::OffersLoaded { generation: 3, result: Ok(ref offers) } if offers.len() == 1
        ));
    }
}
