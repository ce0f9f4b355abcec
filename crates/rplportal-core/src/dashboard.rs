//! Which dashboard a signed-in user gets.

use crate::models::{Profile, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    /// No profile loaded; sign-in is required
    SignIn,
    /// A student's own enrollments
    StudentHome,
    /// Student listing and the invite form
    Portfolio,
    /// Endorsed students waiting for an RTO assessor
    AssessorQueue,
    /// Admin RTO assignment
    Management,
    /// Signed in with a role that has no dashboard
    Unavailable,
}

impl Dashboard {
    pub fn title(&self) -> &'static str {
        match self {
            Dashboard::SignIn => "Sign In",
            Dashboard::StudentHome => "My Enrollments",
            Dashboard::Portfolio => "Students",
            Dashboard::AssessorQueue => "Assessment Queue",
            Dashboard::Management => "Management",
            Dashboard::Unavailable => "No Dashboard",
        }
    }
}

/// Dashboards for a role, primary first.
pub fn dashboards_for_role(role: Option<UserRole>) -> Vec<Dashboard> {
    match role {
        Some(UserRole::Student) => vec![Dashboard::StudentHome],
        Some(UserRole::PortfolioTeam) => vec![Dashboard::Portfolio],
        Some(UserRole::RtoAssessor) => vec![Dashboard::AssessorQueue],
        Some(UserRole::Admin) => vec![Dashboard::Portfolio, Dashboard::Management],
        Some(UserRole::Unknown) | None => vec![Dashboard::Unavailable],
    }
}

pub fn dashboards_for(profile: Option<&Profile>) -> Vec<Dashboard> {
    match profile {
        None => vec![Dashboard::SignIn],
        Some(p) => dashboards_for_role(p.role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Option<UserRole>) -> Profile {
        Profile {
            id: "p".to_string(),
            email: None,
            full_name: None,
            avatar_url: None,
            role,
            company_id: None,
            organization_id: None,
        }
    }

    #[test]
    fn test_role_dispatch() {
        assert_eq!(dashboards_for(None), vec![Dashboard::SignIn]);
        assert_eq!(
            dashboards_for(Some(&profile(Some(UserRole::Student)))),
            vec![Dashboard::StudentHome]
        );
        assert_eq!(
            dashboards_for(Some(&profile(Some(UserRole::PortfolioTeam)))),
            vec![Dashboard::Portfolio]
        );
        assert_eq!(
            dashboards_for(Some(&profile(Some(UserRole::RtoAssessor)))),
            vec![Dashboard::AssessorQueue]
        );
        assert_eq!(
            dashboards_for(Some(&profile(Some(UserRole::Admin)))),
            vec![Dashboard::Portfolio, Dashboard::Management]
        );
    }

    #[test]
    fn test_unknown_role_has_placeholder() {
        assert_eq!(
            dashboards_for(Some(&profile(Some(UserRole::Unknown)))),
            vec![Dashboard::Unavailable]
        );
        assert_eq!(dashboards_for(Some(&profile(None))), vec![Dashboard::Unavailable]);
    }
}
