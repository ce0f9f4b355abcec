//! Rows for the admin RTO assignment screens.

use serde::{Deserialize, Serialize};

use super::OrganizationRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessorAssignment {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "rto_id")]
    pub organization_id: Option<String>,
    #[serde(rename = "rtos")]
    pub organization: Option<OrganizationRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedProfile {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAssignment {
    pub id: String,
    #[serde(rename = "rto_id")]
    pub organization_id: Option<String>,
    #[serde(rename = "profiles")]
    pub profile: Option<AssignedProfile>,
    #[serde(rename = "rtos")]
    pub organization: Option<OrganizationRef>,
}

/// Shared view of an assignable row.
pub trait Assignable {
    fn row_id(&self) -> &str;
    fn person_name(&self) -> Option<&str>;
    fn person_email(&self) -> Option<&str>;
    fn organization_name(&self) -> Option<&str>;
    fn set_organization(&mut self, organization: Option<OrganizationRef>);
}

impl Assignable for AssessorAssignment {
    fn row_id(&self) -> &str {
        &self.id
    }

    fn person_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    fn person_email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().and_then(|o| o.name.as_deref())
    }

    fn set_organization(&mut self, organization: Option<OrganizationRef>) {
        self.organization_id = organization.as_ref().map(|o| o.id.clone());
        self.organization = organization;
    }
}

impl Assignable for StudentAssignment {
    fn row_id(&self) -> &str {
        &self.id
    }

    fn person_name(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.full_name.as_deref())
    }

    fn person_email(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.email.as_deref())
    }

    fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().and_then(|o| o.name.as_deref())
    }

    fn set_organization(&mut self, organization: Option<OrganizationRef>) {
        self.organization_id = organization.as_ref().map(|o| o.id.clone());
        self.organization = organization;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_student_assignment_and_reassign() {
        let json = r#"{
            "id": "s1",
            "rto_id": null,
            "profiles": {"id": "p1", "full_name": "Sam", "email": "sam@example.com"},
            "rtos": null
        }"#;
        let mut row: StudentAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(row.person_name(), Some("Sam"));
        assert_eq!(row.organization_name(), None);

        row.set_organization(Some(OrganizationRef { id: "r1".into(), name: Some("Northside".into()) }));
        assert_eq!(row.organization_id.as_deref(), Some("r1"));
        assert_eq!(row.organization_name(), Some("Northside"));

        row.set_organization(None);
        assert!(row.organization_id.is_none());
    }
}
