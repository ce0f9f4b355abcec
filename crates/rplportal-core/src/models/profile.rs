use serde::{Deserialize, Serialize};

/// Role tag stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    PortfolioTeam,
    RtoAssessor,
    Admin,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::PortfolioTeam => "Portfolio Team",
            UserRole::RtoAssessor => "RTO Assessor",
            UserRole::Admin => "Admin",
            UserRole::Unknown => "Unknown",
        }
    }
}

/// A user profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default, rename = "rto_id")]
    pub organization_id: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Metadata attached to an invitation; the backend copies it onto the new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteMetadata {
    pub full_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(rename = "rto_id", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// Identity created by a successful invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitedUser {
    pub user_id: String,
}

/// Profile row written after an invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(rename = "rto_id", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}
