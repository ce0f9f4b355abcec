//! Qualification offers and their structure.
//!
//! An offer is an active qualification delivered by one RTO. It may be
//! subdivided into streams and is made of offer units, each pointing at a
//! catalogue unit of competency.

use serde::{Deserialize, Serialize};

use super::OrganizationRef;

/// Unit type tag for core units
pub const UNIT_TYPE_CORE: &str = "core";

/// Unit type tag for elective units
pub const UNIT_TYPE_ELECTIVE: &str = "elective";

/// Embedded qualification reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationRef {
    pub id: String,
    pub name: Option<String>,
    pub code: Option<String>,
}

impl QualificationRef {
    /// Qualification name, falling back to its code
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.code.as_deref().filter(|s| !s.is_empty()))
    }
}

/// An active offering of a qualification by an RTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub qualification: Option<QualificationRef>,
    #[serde(rename = "rto")]
    pub organization: Option<OrganizationRef>,
}

impl Offer {
    /// Label used in the qualification dropdown
    pub fn display_name(&self) -> String {
        let qualification = self
            .qualification
            .as_ref()
            .and_then(|q| q.label())
            .unwrap_or("Unnamed Qualification");

        match self.organization.as_ref().and_then(|o| o.name.as_deref()) {
            Some(rto) if !rto.is_empty() => format!("{} - {}", qualification, rto),
            _ => qualification.to_string(),
        }
    }
}

/// Optional cohort or variation within an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferStream {
    pub id: String,
    pub name: String,
    pub offer_id: Option<String>,
}

/// Embedded catalogue unit of competency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef {
    pub id: String,
    pub code: String,
    pub name: Option<String>,
}

/// A unit as it appears in one offer's structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferUnit {
    pub id: String,
    pub unit_type: Option<String>,
    pub group_code: Option<String>,
    #[serde(rename = "application_details")]
    pub application_notes: Option<String>,
    pub unit: Option<UnitRef>,
}

impl OfferUnit {
    pub fn unit_type_str(&self) -> &str {
        self.unit_type.as_deref().unwrap_or("")
    }

    pub fn unit_code(&self) -> &str {
        self.unit.as_ref().map(|u| u.code.as_str()).unwrap_or("")
    }

    pub fn unit_name(&self) -> &str {
        self.unit
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .unwrap_or("Unnamed")
    }

    pub fn is_core(&self) -> bool {
        self.unit_type_str().eq_ignore_ascii_case(UNIT_TYPE_CORE)
    }

    pub fn is_elective(&self) -> bool {
        self.unit_type_str().eq_ignore_ascii_case(UNIT_TYPE_ELECTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offer_with_joins() {
        let json = r#"{
            "id": "o1",
            "qualification": {"id": "q1", "name": "Certificate III in Carpentry", "code": "CPC30220"},
            "rto": {"id": "r1", "trading_name": "Northside Skills"}
        }"#;
        let offer: Offer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.display_name(), "Certificate III in Carpentry - Northside Skills");
    }

    #[test]
    fn test_offer_display_name_without_joins() {
        let offer = Offer { id: "o1".into(), qualification: None, organization: None };
        assert_eq!(offer.display_name(), "Unnamed Qualification");

        let offer = Offer {
            id: "o1".into(),
            qualification: Some(QualificationRef { id: "q1".into(), name: None, code: Some("CPC30220".into()) }),
            organization: None,
        };
        assert_eq!(offer.display_name(), "CPC30220");
    }

    #[test]
    fn test_parse_offer_unit() {
        let json = r#"{
            "id": "ou1",
            "unit_type": "Core",
            "group_code": null,
            "application_details": "Workplace only",
            "unit": {"id": "u1", "code": "CPCCCA2002", "name": "Use carpentry tools"}
        }"#;
        let unit: OfferUnit = serde_json::from_str(json).unwrap();
        assert!(unit.is_core());
        assert!(!unit.is_elective());
        assert_eq!(unit.unit_code(), "CPCCCA2002");
        assert_eq!(unit.application_notes.as_deref(), Some("Workplace only"));
    }
}
