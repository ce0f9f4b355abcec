//! Enrollment ("student") records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress at which portfolio staff may endorse a student to the RTO.
pub const ENDORSE_PROGRESS_THRESHOLD: i32 = 70;

/// Lifecycle status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Active,
    Pending,
    Completed,
    Endorsed,
    #[serde(other)]
    Unknown,
}

impl StudentStatus {
    /// Statuses offered by the listing filter, in display order
    pub const FILTERABLE: [StudentStatus; 4] = [
        StudentStatus::Active,
        StudentStatus::Pending,
        StudentStatus::Endorsed,
        StudentStatus::Completed,
    ];

    /// Column value used in backend filters
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Pending => "pending",
            StudentStatus::Completed => "completed",
            StudentStatus::Endorsed => "endorsed",
            StudentStatus::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Pending => "Pending",
            StudentStatus::Completed => "Completed",
            StudentStatus::Endorsed => "Endorsed",
            StudentStatus::Unknown => "Unknown",
        }
    }
}

/// Enrollment row inserted by the enrollment submitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEnrollment {
    pub profile_id: String,
    pub offer_id: String,
    pub qualification_id: String,
    #[serde(rename = "rto_id")]
    pub organization_id: String,
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    pub status: StudentStatus,
    pub progress: i32,
    pub evidence_count: i32,
    #[serde(rename = "enrolled_date")]
    pub enrolled_at: DateTime<Utc>,
}

impl NewEnrollment {
    /// A fresh enrollment: pending, no progress, no evidence, enrolled now.
    pub fn pending(
        profile_id: String,
        offer_id: String,
        qualification_id: String,
        organization_id: String,
        company_id: Option<String>,
        stream_id: Option<String>,
    ) -> Self {
        Self {
            profile_id,
            offer_id,
            qualification_id,
            organization_id,
            company_id,
            stream_id,
            status: StudentStatus::Pending,
            progress: 0,
            evidence_count: 0,
            enrolled_at: Utc::now(),
        }
    }
}

/// One enrollment as shown in dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub course: String,
    pub enrolled_at: Option<DateTime<Utc>>,
    pub progress: i32,
    pub status: StudentStatus,
    pub evidence_count: i32,
    pub assigned_to: String,
    pub company_id: Option<String>,
}

impl StudentSummary {
    /// Whether the portfolio team may endorse this student to the RTO
    pub fn can_endorse(&self) -> bool {
        self.status == StudentStatus::Active && self.progress >= ENDORSE_PROGRESS_THRESHOLD
    }

    /// Progress clamped to 0..=100 for gauges
    pub fn progress_percent(&self) -> u16 {
        self.progress.clamp(0, 100) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(status: StudentStatus, progress: i32) -> StudentSummary {
        StudentSummary {
            id: "s1".into(),
            name: "Sam".into(),
            email: "sam@example.com".into(),
            avatar_url: None,
            course: "Cert III".into(),
            enrolled_at: None,
            progress,
            status,
            evidence_count: 0,
            assigned_to: "Unassigned".into(),
            company_id: None,
        }
    }

    #[test]
    fn test_can_endorse() {
        assert!(summary(StudentStatus::Active, 70).can_endorse());
        assert!(summary(StudentStatus::Active, 100).can_endorse());
        assert!(!summary(StudentStatus::Active, 69).can_endorse());
        assert!(!summary(StudentStatus::Pending, 90).can_endorse());
        assert!(!summary(StudentStatus::Endorsed, 90).can_endorse());
    }

    #[test]
    fn test_progress_percent_clamped() {
        assert_eq!(summary(StudentStatus::Active, -5).progress_percent(), 0);
        assert_eq!(summary(StudentStatus::Active, 140).progress_percent(), 100);
    }

    #[test]
    fn test_new_enrollment_payload() {
        let enrollment = NewEnrollment::pending(
            "p1".into(),
            "o1".into(),
            "q1".into(),
            "r1".into(),
            None,
            None,
        );
        let value = serde_json::to_value(&enrollment).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["progress"], 0);
        assert_eq!(value["evidence_count"], 0);
        assert_eq!(value["rto_id"], "r1");
        assert!(value["company_id"].is_null());
        assert!(value.get("stream_id").is_none());
        assert!(value["enrolled_date"].is_string());
    }

    #[test]
    fn test_unknown_status_parses() {
        let status: StudentStatus = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(status, StudentStatus::Unknown);
    }
}
