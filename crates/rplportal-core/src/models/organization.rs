use serde::{Deserialize, Serialize};

/// A Registered Training Organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(rename = "rto_code")]
    pub code: Option<String>,
    #[serde(rename = "trading_name")]
    pub name: Option<String>,
}

impl Organization {
    /// Trading name, falling back to the RTO code and then the id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.code.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.id)
    }
}

/// Embedded organization reference returned by joined queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub id: String,
    #[serde(rename = "trading_name")]
    pub name: Option<String>,
}
