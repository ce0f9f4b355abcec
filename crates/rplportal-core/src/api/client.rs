//! HTTP implementation of [`Gateway`] for a PostgREST data API and a GoTrue
//! auth API hosted under one project URL.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{ApiError, Gateway};
use crate::auth::session::DEFAULT_EXPIRES_IN_SECS;
use crate::auth::SessionData;
use crate::models::{
    AssessorAssignment, InviteMetadata, InvitedUser, NewEnrollment, NewProfile, Offer,
    OfferStream, OfferUnit, Organization, Profile, StudentAssignment, StudentStatus,
    StudentSummary,
};
use crate::students::{StatusFilter, StudentPage, StudentQuery};
use crate::utils::format::NOT_AVAILABLE;

// ============================================================================
// Constants
// ============================================================================

const REST_PATH: &str = "rest/v1";
const AUTH_PATH: &str = "auth/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the project's anon key on every request
const API_KEY_HEADER: &str = "apikey";

const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";
const PREFER_COUNT: &str = "count=exact";

/// Placeholder for enrollments nobody has been assigned to
const UNASSIGNED: &str = "Unassigned";

const ORGANIZATION_SELECT: &str = "id,rto_code,trading_name";
const OFFER_SELECT: &str = "id,\
    qualification:qualifications!offers_qualification_id_fkey(id,name,code),\
    rto:rtos!offers_rto_id_fkey(id,trading_name)";
const STREAM_SELECT: &str = "id,name,offer_id";
const OFFER_UNIT_SELECT: &str = "id,unit_type,group_code,application_details,\
    unit:units!offer_units_unit_id_fkey(id,code,name)";
const PROFILE_SELECT: &str = "id,email,full_name,avatar_url,role,company_id,rto_id";
const STUDENT_SELECT: &str = "id,progress,status,evidence_count,enrolled_date,company_id,created_at,\
    profile:profiles!students_profile_id_fkey(id,full_name,email,avatar_url),\
    assigned_admin:profiles!students_assigned_admin_id_fkey(full_name),\
    offer:offers!inner(id,qualification:qualifications!offers_qualification_id_fkey(code,name))";
const ASSESSOR_SELECT: &str = "id,full_name,email,rto_id,rtos(id,trading_name)";
const STUDENT_ASSIGNMENT_SELECT: &str = "id,rto_id,profiles(id,full_name,email),rtos(id,trading_name)";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct InviteRequest<'a> {
    email: &'a str,
    data: &'a InviteMetadata,
}

#[derive(Debug, Deserialize)]
struct RawStudentProfile {
    full_name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAssignee {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawQualification {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStudentOffer {
    qualification: Option<RawQualification>,
}

/// Enrollment row as returned by the joined student select.
#[derive(Debug, Deserialize)]
struct RawStudentRow {
    id: String,
    progress: Option<i32>,
    status: Option<StudentStatus>,
    evidence_count: Option<i32>,
    enrolled_date: Option<String>,
    company_id: Option<String>,
    profile: Option<RawStudentProfile>,
    assigned_admin: Option<RawAssignee>,
    offer: Option<RawStudentOffer>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl RawStudentRow {
    fn into_summary(self) -> StudentSummary {
        let (name, email, avatar_url) = match self.profile {
            Some(p) => (non_empty(p.full_name), non_empty(p.email), non_empty(p.avatar_url)),
            None => (None, None, None),
        };
        let course = self
            .offer
            .and_then(|o| o.qualification)
            .and_then(|q| non_empty(q.name));
        let assigned_to = self.assigned_admin.and_then(|a| non_empty(a.full_name));

        StudentSummary {
            id: self.id,
            name: name.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            email: email.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            avatar_url,
            course: course.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            enrolled_at: self.enrolled_date.as_deref().and_then(parse_timestamp),
            progress: self.progress.unwrap_or(0),
            status: self.status.unwrap_or(StudentStatus::Pending),
            evidence_count: self.evidence_count.unwrap_or(0),
            assigned_to: assigned_to.unwrap_or_else(|| UNASSIGNED.to_string()),
            company_id: non_empty(self.company_id),
        }
    }
}

/// Total row count from a `Content-Range` header such as `0-5/42` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

// ============================================================================
// Client
// ============================================================================

/// API client for the portal backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    anon_key: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// A client carrying `token`, sharing this client's connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            anon_key: self.anon_key.clone(),
            token: Some(token),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, AUTH_PATH, path)
    }

    /// `apikey` plus a bearer token: the session token when signed in,
    /// otherwise the anon key.
    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let bearer = self.token.as_deref().unwrap_or(&self.anon_key);
        let mut headers = header::HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            header::HeaderValue::from_str(&self.anon_key)
                .map_err(|e| ApiError::InvalidRequest(format!("anon key: {}", e)))?,
        );
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", bearer))
                .map_err(|e| ApiError::InvalidRequest(format!("bearer token: {}", e)))?,
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let url = self.rest_url(table);
        debug!(table = table, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(params)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, table).await
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        table: &str,
        params: &[(&str, String)],
        body: &B,
        prefer: &str,
    ) -> Result<(), ApiError> {
        let url = self.rest_url(table);
        debug!(table = table, method = %method, "{} {}", method, url);

        let response = self
            .client
            .request(method, &url)
            .headers(self.auth_headers()?)
            .header("Prefer", prefer)
            .query(params)
            .json(body)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn select_students(
        &self,
        params: Vec<(&str, String)>,
    ) -> Result<Vec<StudentSummary>, ApiError> {
        let rows: Vec<RawStudentRow> = self.select("students", &params).await?;
        Ok(rows.into_iter().map(RawStudentRow::into_summary).collect())
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let url = self.auth_url("token");
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let token: TokenResponse = Self::parse_json(response, "token response").await?;

        Ok(SessionData {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| email.to_string()),
            created_at: Utc::now(),
            expires_in_secs: token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        })
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        if self.token.is_none() {
            return Ok(());
        }
        let response = self
            .client
            .post(self.auth_url("logout"))
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, ApiError> {
        let rows: Vec<Profile> = self
            .select(
                "profiles",
                &[
                    ("select", PROFILE_SELECT.to_string()),
                    ("id", eq(user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>, ApiError> {
        self.select(
            "rtos",
            &[
                ("select", ORGANIZATION_SELECT.to_string()),
                ("order", "trading_name.asc".to_string()),
            ],
        )
        .await
    }

    async fn list_active_offers(&self, org_id: &str) -> Result<Vec<Offer>, ApiError> {
        self.select(
            "offers",
            &[
                ("select", OFFER_SELECT.to_string()),
                ("rto_id", eq(org_id)),
                ("status", eq("active")),
                ("order", "id.asc".to_string()),
            ],
        )
        .await
    }

    async fn list_offer_streams(&self, offer_id: &str) -> Result<Vec<OfferStream>, ApiError> {
        self.select(
            "offer_streams",
            &[
                ("select", STREAM_SELECT.to_string()),
                ("offer_id", eq(offer_id)),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    async fn list_offer_units(&self, offer_id: &str) -> Result<Vec<OfferUnit>, ApiError> {
        self.select(
            "offer_units",
            &[
                ("select", OFFER_UNIT_SELECT.to_string()),
                ("offer_id", eq(offer_id)),
                ("order", "unit_type.asc".to_string()),
            ],
        )
        .await
    }

    async fn supports_enrollment_streams(&self) -> bool {
        let probe: Result<Vec<serde_json::Value>, ApiError> = self
            .select(
                "students",
                &[
                    ("select", "stream_id".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await;
        match probe {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Enrollment table has no stream column");
                false
            }
        }
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, ApiError> {
        let rows: Vec<Profile> = self
            .select(
                "profiles",
                &[
                    ("select", PROFILE_SELECT.to_string()),
                    ("email", eq(email)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn invite_user(
        &self,
        email: &str,
        metadata: &InviteMetadata,
    ) -> Result<InvitedUser, ApiError> {
        let response = self
            .client
            .post(self.auth_url("invite"))
            .headers(self.auth_headers()?)
            .json(&InviteRequest { email, data: metadata })
            .send()
            .await?;

        let response = Self::check_response(response)
            .await
            .map_err(ApiError::into_invite_error)?;
        let user: AuthUser = Self::parse_json(response, "invite response").await?;
        Ok(InvitedUser { user_id: user.id })
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> Result<(), ApiError> {
        self.write(
            Method::POST,
            "profiles",
            &[("on_conflict", "id".to_string())],
            profile,
            PREFER_UPSERT,
        )
        .await
    }

    async fn insert_enrollment(&self, enrollment: &NewEnrollment) -> Result<(), ApiError> {
        self.write(Method::POST, "students", &[], enrollment, PREFER_MINIMAL)
            .await
    }

    async fn list_students(&self, query: &StudentQuery) -> Result<StudentPage, ApiError> {
        let (from, to) = query.range();
        let mut params = vec![
            ("select", STUDENT_SELECT.to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let StatusFilter::Only(status) = query.status {
            params.push(("status", eq(status.as_str())));
        }
        if let Some(filter) = query.search_filter() {
            params.push(("or", filter));
        }

        let url = self.rest_url("students");
        debug!(page = query.page, from = from, to = to, "Fetching student page");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .header("Prefer", PREFER_COUNT)
            .header("Range-Unit", "items")
            .header(header::RANGE, format!("{}-{}", from, to))
            .query(&params)
            .send()
            .await?;

        let total_header = response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        // A page past the end is not an error; the caller clamps and refetches
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            warn!(page = query.page, "Requested student page is out of range");
            return Ok(StudentPage {
                students: Vec::new(),
                total: total_header.unwrap_or(0),
            });
        }

        let response = Self::check_response(response).await?;
        let rows: Vec<RawStudentRow> = Self::parse_json(response, "students").await?;
        let students: Vec<StudentSummary> =
            rows.into_iter().map(RawStudentRow::into_summary).collect();
        let total = total_header.unwrap_or(students.len() as u64);

        Ok(StudentPage { students, total })
    }

    async fn list_students_for_organization(
        &self,
        org_id: &str,
        status: StudentStatus,
    ) -> Result<Vec<StudentSummary>, ApiError> {
        self.select_students(vec![
            ("select", STUDENT_SELECT.to_string()),
            ("rto_id", eq(org_id)),
            ("status", eq(status.as_str())),
            ("order", "created_at.desc".to_string()),
        ])
        .await
    }

    async fn list_enrollments_for_profile(
        &self,
        profile_id: &str,
    ) -> Result<Vec<StudentSummary>, ApiError> {
        self.select_students(vec![
            ("select", STUDENT_SELECT.to_string()),
            ("profile_id", eq(profile_id)),
            ("order", "created_at.desc".to_string()),
        ])
        .await
    }

    async fn endorse_student(&self, student_id: &str) -> Result<(), ApiError> {
        self.write(
            Method::PATCH,
            "students",
            &[("id", eq(student_id))],
            &json!({ "status": StudentStatus::Endorsed }),
            PREFER_MINIMAL,
        )
        .await
    }

    async fn list_assessors(&self) -> Result<Vec<AssessorAssignment>, ApiError> {
        self.select(
            "profiles",
            &[
                ("select", ASSESSOR_SELECT.to_string()),
                ("role", eq("rto_assessor")),
                ("order", "full_name.asc".to_string()),
            ],
        )
        .await
    }

    async fn list_student_assignments(&self) -> Result<Vec<StudentAssignment>, ApiError> {
        self.select(
            "students",
            &[
                ("select", STUDENT_ASSIGNMENT_SELECT.to_string()),
                ("order", "profiles(full_name).asc".to_string()),
            ],
        )
        .await
    }

    async fn assign_assessor_organization(
        &self,
        profile_id: &str,
        org_id: Option<String>,
    ) -> Result<(), ApiError> {
        self.write(
            Method::PATCH,
            "profiles",
            &[("id", eq(profile_id))],
            &json!({ "rto_id": org_id }),
            PREFER_MINIMAL,
        )
        .await
    }

    async fn assign_student_organization(
        &self,
        student_id: &str,
        org_id: Option<String>,
    ) -> Result<(), ApiError> {
        self.write(
            Method::PATCH,
            "students",
            &[("id", eq(student_id))],
            &json!({ "rto_id": org_id }),
            PREFER_MINIMAL,
        )
        .await
    }
}
