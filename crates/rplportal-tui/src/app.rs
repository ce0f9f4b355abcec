//! Application state management for the portal TUI.
//!
//! `App` owns the backend client, the signed-in session and the state of
//! every dashboard. Remote calls run on spawned tokio tasks and report back
//! through an MPSC channel that `check_background_tasks` drains once per
//! frame, so all state changes happen on the UI loop.

use std::future::Future;
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use rplportal_core::api::{ApiClient, ApiError, Gateway};
use rplportal_core::auth::{CredentialStore, Session};
use rplportal_core::config::{env_credentials, Config};
use rplportal_core::dashboard::{dashboards_for, Dashboard};
use rplportal_core::enrollment::{
    run_effect, submit_enrollment, EnrollmentError, EnrollmentForm, EnrollmentOutcome,
    SelectorEffect, SelectorEvent,
};
use rplportal_core::models::{
    AssessorAssignment, Assignable, Organization, OrganizationRef, Profile, StudentAssignment,
    StudentStatus, StudentSummary, ENDORSE_PROGRESS_THRESHOLD,
};
use rplportal_core::students::{clamp_page, total_pages, StudentPage, StudentQuery};
use rplportal_core::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the email inputs.
const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the student name input.
const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for search and filter input.
const MAX_SEARCH_LENGTH: usize = 64;

// ============================================================================
// UI Enums
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    /// Invite-student form overlay
    Enrolling,
    /// RTO picker for an admin assignment
    PickingOrganization,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Focused field of the invite-student form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollFocus {
    Email,
    FullName,
    Organization,
    Offer,
    Stream,
    Submit,
}

impl EnrollFocus {
    pub fn next(&self) -> Self {
        match self {
            EnrollFocus::Email => EnrollFocus::FullName,
            EnrollFocus::FullName => EnrollFocus::Organization,
            EnrollFocus::Organization => EnrollFocus::Offer,
            EnrollFocus::Offer => EnrollFocus::Stream,
            EnrollFocus::Stream => EnrollFocus::Submit,
            EnrollFocus::Submit => EnrollFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            EnrollFocus::Email => EnrollFocus::Submit,
            EnrollFocus::FullName => EnrollFocus::Email,
            EnrollFocus::Organization => EnrollFocus::FullName,
            EnrollFocus::Offer => EnrollFocus::Organization,
            EnrollFocus::Stream => EnrollFocus::Offer,
            EnrollFocus::Submit => EnrollFocus::Stream,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            EnrollFocus::Organization | EnrollFocus::Offer | EnrollFocus::Stream
        )
    }
}

/// Management tab sub-view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagementView {
    Assessors,
    Students,
}

impl ManagementView {
    pub fn title(&self) -> &'static str {
        match self {
            ManagementView::Assessors => "Assessors",
            ManagementView::Students => "Students",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            ManagementView::Assessors => ManagementView::Students,
            ManagementView::Students => ManagementView::Assessors,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned tasks back to the UI loop.
enum BackgroundResult {
    /// A selector load finished; fed back into the enrollment form
    Selector(SelectorEvent),
    StreamsSupported(bool),
    /// A listing page, tagged with the request generation
    Students {
        generation: u64,
        result: Result<StudentPage, ApiError>,
    },
    Endorsed {
        student_id: String,
        result: Result<(), ApiError>,
    },
    EnrollmentSubmitted(Result<EnrollmentOutcome, EnrollmentError>),
    AssessorQueue(Result<Vec<StudentSummary>, ApiError>),
    MyEnrollments(Result<Vec<StudentSummary>, ApiError>),
    Assessors(Result<Vec<AssessorAssignment>, ApiError>),
    StudentAssignments(Result<Vec<StudentAssignment>, ApiError>),
    ManagementOrganizations(Result<Vec<Organization>, ApiError>),
    Assigned {
        view: ManagementView,
        row_id: String,
        organization: Option<OrganizationRef>,
        result: Result<(), ApiError>,
    },
}

// ============================================================================
// App
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    pub profile: Option<Profile>,

    // UI State
    pub state: AppState,
    pub tabs: Vec<Dashboard>,
    pub current_tab: usize,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Invite-student form
    pub enrollment_form: EnrollmentForm,
    pub enroll_focus: EnrollFocus,
    /// Highlighted row of the focused selector list
    pub enroll_cursor: usize,

    // Portfolio listing
    pub student_query: StudentQuery,
    pub students: Vec<StudentSummary>,
    pub students_total: u64,
    pub students_loading: bool,
    pub student_selection: usize,
    pub search_input: String,
    students_generation: u64,

    // Assessor queue
    pub assessor_queue: Vec<StudentSummary>,
    pub assessor_selection: usize,

    // Student home
    pub my_enrollments: Vec<StudentSummary>,
    pub my_enrollment_selection: usize,

    // Management
    pub management_view: ManagementView,
    pub assessors: Vec<AssessorAssignment>,
    pub student_assignments: Vec<StudentAssignment>,
    pub management_selection: usize,
    pub management_filter: String,
    pub management_orgs: Vec<Organization>,
    pub org_picker_selection: usize,

    // Background task channel
    bg_rx: mpsc::Receiver<BackgroundResult>,
    bg_tx: mpsc::Sender<BackgroundResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create the application, restoring any saved session.
    pub fn new(config: Config, api: ApiClient) -> Self {
        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let mut session = Session::new(cache_dir);
        match session.load() {
            Ok(found) => debug!(found, "Session loaded"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        Self::with_session(config, session, api)
    }

    fn with_session(config: Config, session: Session, mut api: ApiClient) -> Self {
        if let Some(token) = session.token() {
            api.set_token(token.to_string());
        }

        let (login_email, login_password) = env_credentials().unwrap_or_else(|| {
            let email = config.last_email.clone().unwrap_or_default();
            let password = if email.is_empty() {
                String::new()
            } else {
                CredentialStore::get_password(&email).unwrap_or_default()
            };
            (email, password)
        });

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let student_query = StudentQuery::new(config.page_size(), config.search);

        Self {
            config,
            session,
            api,
            profile: None,

            state: AppState::Normal,
            tabs: dashboards_for(None),
            current_tab: 0,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            enrollment_form: EnrollmentForm::new(),
            enroll_focus: EnrollFocus::Email,
            enroll_cursor: 0,

            student_query,
            students: Vec::new(),
            students_total: 0,
            students_loading: false,
            student_selection: 0,
            search_input: String::new(),
            students_generation: 0,

            assessor_queue: Vec::new(),
            assessor_selection: 0,

            my_enrollments: Vec::new(),
            my_enrollment_selection: 0,

            management_view: ManagementView::Assessors,
            assessors: Vec::new(),
            student_assignments: Vec::new(),
            management_selection: 0,
            management_filter: String::new(),
            management_orgs: Vec::new(),
            org_picker_selection: 0,

            bg_rx: rx,
            bg_tx: tx,

            status_message: None,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Load the profile for a restored session. Falls back to the login
    /// overlay when the session is no longer accepted.
    pub async fn resume_session(&mut self) {
        let Some(user_id) = self.session.user_id().map(String::from) else {
            self.start_login();
            return;
        };

        match self.api.fetch_profile(&user_id).await {
            Ok(profile) => {
                self.set_profile(profile);
                self.refresh_all_background();
            }
            Err(e) => {
                warn!(error = %e, "Could not restore session");
                if matches!(e, ApiError::Unauthorized) {
                    self.forget_session();
                }
                self.start_login();
                self.login_error = Some(e.user_message());
            }
        }
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        let session_data = match self.api.sign_in(&email, &password).await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
                return Err(e.into());
            }
        };

        if let Err(e) = CredentialStore::store(&email, &password) {
            warn!(error = %e, "Failed to store credentials");
        }

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        let user_id = session_data.user_id.clone();
        self.api.set_token(session_data.access_token.clone());
        self.session.update(session_data);
        if let Err(e) = self.session.save() {
            warn!(error = %e, "Failed to save session");
        }

        match self.api.fetch_profile(&user_id).await {
            Ok(profile) => {
                self.login_password.clear();
                self.set_profile(profile);
                self.state = AppState::Normal;
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load profile after login");
                self.login_error = Some(format!(
                    "Signed in, but could not load profile: {}",
                    e.user_message()
                ));
                Err(e.into())
            }
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Revoke the token, drop the saved session and return to the login overlay.
    pub async fn sign_out(&mut self) {
        if self.session.token().is_some() {
            if let Err(e) = self.api.sign_out().await {
                warn!(error = %e, "Sign-out request failed");
            }
        }
        self.forget_session();

        self.login_password.clear();
        self.profile = None;
        self.tabs = dashboards_for(None);
        self.current_tab = 0;
        self.enrollment_form.reset();
        self.students.clear();
        self.students_total = 0;
        self.assessor_queue.clear();
        self.my_enrollments.clear();
        self.assessors.clear();
        self.student_assignments.clear();

        info!("Signed out");
        self.start_login();
        self.status_message = Some("Signed out.".to_string());
    }

    fn forget_session(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove session file");
        }
        self.api.clear_token();
    }

    fn set_profile(&mut self, profile: Option<Profile>) {
        self.tabs = dashboards_for(profile.as_ref());
        self.current_tab = 0;
        info!(
            role = ?profile.as_ref().and_then(|p| p.role),
            dashboards = self.tabs.len(),
            "Profile loaded"
        );
        self.profile = profile;
    }

    /// Name shown in the title bar
    pub fn signed_in_as(&self) -> Option<String> {
        let profile = self.profile.as_ref()?;
        let role = profile
            .role
            .map(|r| r.display_name())
            .unwrap_or("No role");
        Some(format!("{} ({})", profile.display_name(), role))
    }

    // =========================================================================
    // Tabs
    // =========================================================================

    pub fn current_dashboard(&self) -> Dashboard {
        self.tabs
            .get(self.current_tab)
            .copied()
            .unwrap_or(Dashboard::SignIn)
    }

    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.current_tab = (self.current_tab + 1) % self.tabs.len();
        }
    }

    pub fn prev_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.current_tab = (self.current_tab + self.tabs.len() - 1) % self.tabs.len();
        }
    }

    pub fn select_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.current_tab = index;
        }
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    /// Run `task` on the runtime and deliver its result to the UI loop.
    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = BackgroundResult> + Send + 'static,
    {
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            Self::send_result(&tx, result).await;
        });
    }

    /// Load every dashboard this user has
    pub fn refresh_all_background(&mut self) {
        for dashboard in self.tabs.clone() {
            self.refresh_dashboard(dashboard);
        }
    }

    pub fn refresh_current_tab(&mut self) {
        self.refresh_dashboard(self.current_dashboard());
    }

    fn refresh_dashboard(&mut self, dashboard: Dashboard) {
        match dashboard {
            Dashboard::Portfolio => self.refresh_students(),
            Dashboard::AssessorQueue => self.refresh_assessor_queue(),
            Dashboard::StudentHome => self.refresh_my_enrollments(),
            Dashboard::Management => self.refresh_management(),
            Dashboard::SignIn | Dashboard::Unavailable => {}
        }
    }

    /// Check for completed background tasks and process results
    pub async fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.bg_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Selector(event) => {
                let effects = self.enrollment_form.apply(event);
                self.run_selector_effects(effects);
                self.clamp_enroll_cursor();
            }
            BackgroundResult::StreamsSupported(supported) => {
                debug!(supported, "Enrollment stream column probed");
                self.enrollment_form.streams_supported = supported;
            }
            BackgroundResult::Students { generation, result } => {
                self.process_students_page(generation, result);
            }
            BackgroundResult::Endorsed { student_id, result } => match result {
                Ok(()) => {
                    info!(%student_id, "Student endorsed");
                    self.status_message = Some("Student endorsed.".to_string());
                    self.refresh_students();
                }
                Err(e) => {
                    error!(%student_id, error = %e, "Endorse failed");
                    self.status_message =
                        Some(format!("Could not endorse student: {}", e.detail()));
                }
            },
            BackgroundResult::EnrollmentSubmitted(result) => {
                self.process_enrollment_submitted(result);
            }
            BackgroundResult::AssessorQueue(result) => match result {
                Ok(rows) => {
                    self.assessor_queue = rows;
                    self.assessor_selection = clamp_selection(
                        self.assessor_selection,
                        self.assessor_queue.len(),
                    );
                }
                Err(e) => self.report_load_error("assessment queue", &e),
            },
            BackgroundResult::MyEnrollments(result) => match result {
                Ok(rows) => {
                    self.my_enrollments = rows;
                    self.my_enrollment_selection = clamp_selection(
                        self.my_enrollment_selection,
                        self.my_enrollments.len(),
                    );
                }
                Err(e) => self.report_load_error("enrollments", &e),
            },
            BackgroundResult::Assessors(result) => match result {
                Ok(rows) => {
                    self.assessors = rows;
                    self.clamp_management_selection();
                }
                Err(e) => self.report_load_error("assessors", &e),
            },
            BackgroundResult::StudentAssignments(result) => match result {
                Ok(rows) => {
                    self.student_assignments = rows;
                    self.clamp_management_selection();
                }
                Err(e) => self.report_load_error("students", &e),
            },
            BackgroundResult::ManagementOrganizations(result) => match result {
                Ok(orgs) => self.management_orgs = orgs,
                Err(e) => self.report_load_error("RTOs", &e),
            },
            BackgroundResult::Assigned {
                view,
                row_id,
                organization,
                result,
            } => self.process_assignment(view, &row_id, organization, result),
        }
    }

    fn report_load_error(&mut self, what: &str, e: &ApiError) {
        error!(error = %e, "Failed to load {}", what);
        self.status_message = Some(format!("Could not load {}: {}", what, e.user_message()));
    }

    // =========================================================================
    // Enrollment Form
    // =========================================================================

    fn run_selector_effects(&self, effects: Vec<SelectorEffect>) {
        for effect in effects {
            debug!(?effect, "Running selector effect");
            let api = self.api.clone();
            self.spawn_task(async move { BackgroundResult::Selector(run_effect(&api, effect).await) });
        }
    }

    /// Show the invite form, loading the RTO list the first time.
    pub fn open_enrollment_form(&mut self) {
        self.state = AppState::Enrolling;
        self.enroll_focus = EnrollFocus::Email;
        self.enroll_cursor = 0;

        let selector = &self.enrollment_form.selector;
        if selector.organizations().is_empty() && !selector.organizations_loading() {
            let effects = self.enrollment_form.selector.start();
            self.run_selector_effects(effects);

            let api = self.api.clone();
            self.spawn_task(async move {
                BackgroundResult::StreamsSupported(api.supports_enrollment_streams().await)
            });
        }
    }

    pub fn close_enrollment_form(&mut self) {
        self.state = AppState::Normal;
    }

    pub fn set_enroll_focus(&mut self, focus: EnrollFocus) {
        self.enroll_focus = focus;
        self.enroll_cursor = self.selected_option_index().unwrap_or(0);
    }

    /// Ids of the options in the focused selector list
    pub fn enroll_option_ids(&self) -> Vec<String> {
        let selector = &self.enrollment_form.selector;
        match self.enroll_focus {
            EnrollFocus::Organization => selector
                .organizations()
                .iter()
                .map(|o| o.id.clone())
                .collect(),
            EnrollFocus::Offer => selector.offers().iter().map(|o| o.id.clone()).collect(),
            EnrollFocus::Stream => selector.streams().iter().map(|s| s.id.clone()).collect(),
            _ => Vec::new(),
        }
    }

    fn selected_option_index(&self) -> Option<usize> {
        let selector = &self.enrollment_form.selector;
        let selected = match self.enroll_focus {
            EnrollFocus::Organization => selector.selected_org_id(),
            EnrollFocus::Offer => selector.selected_offer_id(),
            EnrollFocus::Stream => selector.selected_stream_id(),
            _ => None,
        }?;
        self.enroll_option_ids().iter().position(|id| id == selected)
    }

    fn clamp_enroll_cursor(&mut self) {
        self.enroll_cursor = clamp_selection(self.enroll_cursor, self.enroll_option_ids().len());
    }

    pub fn move_enroll_cursor(&mut self, down: bool) {
        let len = self.enroll_option_ids().len();
        if len == 0 {
            return;
        }
        self.enroll_cursor = if down {
            (self.enroll_cursor + 1).min(len - 1)
        } else {
            self.enroll_cursor.saturating_sub(1)
        };
    }

    /// Select the highlighted option of the focused list.
    pub fn choose_enroll_option(&mut self) {
        let Some(id) = self.enroll_option_ids().get(self.enroll_cursor).cloned() else {
            return;
        };
        let event = match self.enroll_focus {
            EnrollFocus::Organization => SelectorEvent::OrganizationSelected(Some(id)),
            EnrollFocus::Offer => SelectorEvent::OfferSelected(Some(id)),
            EnrollFocus::Stream => SelectorEvent::StreamSelected(Some(id)),
            _ => return,
        };
        self.apply_selector_event(event);
        let next = self.enroll_focus.next();
        self.set_enroll_focus(next);
    }

    /// Clear the selection of the focused list.
    pub fn clear_enroll_option(&mut self) {
        let event = match self.enroll_focus {
            EnrollFocus::Organization => SelectorEvent::OrganizationSelected(None),
            EnrollFocus::Offer => SelectorEvent::OfferSelected(None),
            EnrollFocus::Stream => SelectorEvent::StreamSelected(None),
            _ => return,
        };
        self.apply_selector_event(event);
        self.enroll_cursor = 0;
    }

    fn apply_selector_event(&mut self, event: SelectorEvent) {
        let effects = self.enrollment_form.apply(event);
        self.run_selector_effects(effects);
    }

    /// Validate locally and send the submission to a background task.
    pub fn submit_enrollment_form(&mut self) {
        if self.enrollment_form.is_submitting() {
            debug!("Enrollment already in flight");
            return;
        }
        let company_id = self.profile.as_ref().and_then(|p| p.company_id.clone());
        let request = match self.enrollment_form.begin_submit(company_id) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Enrollment form incomplete");
                return;
            }
        };

        info!(offer = ?request.offer.as_ref().map(|o| &o.id), "Submitting enrollment");
        let api = self.api.clone();
        self.spawn_task(async move {
            BackgroundResult::EnrollmentSubmitted(submit_enrollment(&api, &request).await)
        });
    }

    fn process_enrollment_submitted(
        &mut self,
        result: Result<EnrollmentOutcome, EnrollmentError>,
    ) {
        let mut created = false;
        let finished = self.enrollment_form.finish_submit(result, |outcome| {
            info!(profile_id = %outcome.profile_id, "Enrollment created");
            created = true;
        });

        match finished {
            Ok(message) => {
                self.status_message = Some(message);
                self.enroll_focus = EnrollFocus::Email;
                self.enroll_cursor = 0;
                if self.state == AppState::Enrolling {
                    self.state = AppState::Normal;
                }
            }
            Err(message) => {
                error!(%message, "Enrollment failed");
                self.status_message = Some(message);
            }
        }

        if created {
            self.refresh_students();
        }
    }

    // =========================================================================
    // Portfolio Listing
    // =========================================================================

    /// Fetch the current page. Only the most recent request is applied.
    pub fn refresh_students(&mut self) {
        self.students_generation += 1;
        self.students_loading = true;

        let generation = self.students_generation;
        let query = self.student_query.clone();
        let api = self.api.clone();
        debug!(generation, page = query.page, "Fetching students");
        self.spawn_task(async move {
            let result = api.list_students(&query).await;
            BackgroundResult::Students { generation, result }
        });
    }

    fn process_students_page(&mut self, generation: u64, result: Result<StudentPage, ApiError>) {
        if generation != self.students_generation {
            debug!(generation, current = self.students_generation, "Dropping stale student page");
            return;
        }
        self.students_loading = false;

        match result {
            Ok(page) => {
                let pages = total_pages(page.total, self.student_query.page_size);
                let clamped = clamp_page(self.student_query.page, pages);
                if clamped != self.student_query.page {
                    debug!(page = self.student_query.page, clamped, "Page past the end");
                    self.student_query.set_page(clamped);
                    self.refresh_students();
                    return;
                }
                self.students = page.students;
                self.students_total = page.total;
                self.student_selection =
                    clamp_selection(self.student_selection, self.students.len());
            }
            Err(e) => {
                self.students.clear();
                self.students_total = 0;
                self.student_selection = 0;
                self.report_load_error("students", &e);
            }
        }
    }

    pub fn total_student_pages(&self) -> u32 {
        total_pages(self.students_total, self.student_query.page_size)
    }

    /// Commit the search box to the query
    pub fn apply_search(&mut self) {
        self.student_query.set_search(self.search_input.trim());
        self.student_selection = 0;
        self.refresh_students();
    }

    pub fn cycle_status_filter(&mut self) {
        let next = self.student_query.status.next();
        self.student_query.set_status(next);
        self.student_selection = 0;
        self.refresh_students();
    }

    pub fn go_to_page(&mut self, page: u32) {
        let page = clamp_page(page, self.total_student_pages());
        if page != self.student_query.page {
            self.student_query.set_page(page);
            self.student_selection = 0;
            self.refresh_students();
        }
    }

    pub fn selected_student(&self) -> Option<&StudentSummary> {
        self.students.get(self.student_selection)
    }

    /// Endorse the selected student to their RTO.
    pub fn endorse_selected(&mut self) {
        let Some(student) = self.selected_student() else {
            return;
        };
        if !student.can_endorse() {
            self.status_message = Some(format!(
                "Only active students with at least {}% progress can be endorsed.",
                ENDORSE_PROGRESS_THRESHOLD
            ));
            return;
        }

        let student_id = student.id.clone();
        let api = self.api.clone();
        self.status_message = Some(format!("Endorsing {}...", student.name));
        self.spawn_task(async move {
            let result = api.endorse_student(&student_id).await;
            BackgroundResult::Endorsed { student_id, result }
        });
    }

    // =========================================================================
    // Assessor Queue and Student Home
    // =========================================================================

    fn refresh_assessor_queue(&mut self) {
        let Some(org_id) = self.profile.as_ref().and_then(|p| p.organization_id.clone()) else {
            self.assessor_queue.clear();
            self.status_message = Some("Your profile has no RTO assigned.".to_string());
            return;
        };

        let api = self.api.clone();
        self.spawn_task(async move {
            BackgroundResult::AssessorQueue(
                api.list_students_for_organization(&org_id, StudentStatus::Endorsed)
                    .await,
            )
        });
    }

    fn refresh_my_enrollments(&mut self) {
        let Some(profile_id) = self.profile.as_ref().map(|p| p.id.clone()) else {
            return;
        };

        let api = self.api.clone();
        self.spawn_task(async move {
            BackgroundResult::MyEnrollments(api.list_enrollments_for_profile(&profile_id).await)
        });
    }

    // =========================================================================
    // Management
    // =========================================================================

    fn refresh_management(&mut self) {
        let api = self.api.clone();
        self.spawn_task(async move { BackgroundResult::Assessors(api.list_assessors().await) });

        let api = self.api.clone();
        self.spawn_task(async move {
            BackgroundResult::StudentAssignments(api.list_student_assignments().await)
        });

        let api = self.api.clone();
        self.spawn_task(async move {
            BackgroundResult::ManagementOrganizations(api.list_organizations().await)
        });
    }

    /// Rows of the current management view matching the filter
    pub fn management_rows(&self) -> Vec<&dyn Assignable> {
        let filter = self.management_filter.trim();
        let matches = |row: &dyn Assignable| {
            contains_ignore_case(row.person_name().unwrap_or(""), filter)
                || contains_ignore_case(row.person_email().unwrap_or(""), filter)
        };

        match self.management_view {
            ManagementView::Assessors => self
                .assessors
                .iter()
                .map(|r| r as &dyn Assignable)
                .filter(|r| matches(*r))
                .collect(),
            ManagementView::Students => self
                .student_assignments
                .iter()
                .map(|r| r as &dyn Assignable)
                .filter(|r| matches(*r))
                .collect(),
        }
    }

    pub fn toggle_management_view(&mut self) {
        self.management_view = self.management_view.toggle();
        self.management_selection = 0;
    }

    pub fn clamp_management_selection(&mut self) {
        let len = self.management_rows().len();
        self.management_selection = clamp_selection(self.management_selection, len);
    }

    pub fn open_org_picker(&mut self) {
        if self.management_rows().is_empty() {
            return;
        }
        if self.management_orgs.is_empty() {
            self.status_message = Some("No RTOs loaded.".to_string());
            return;
        }
        self.org_picker_selection = 0;
        self.state = AppState::PickingOrganization;
    }

    /// Assign the picked RTO to the selected row. Picker row 0 unassigns.
    pub fn assign_picked_organization(&mut self) {
        self.state = AppState::Normal;

        let Some(row_id) = self
            .management_rows()
            .get(self.management_selection)
            .map(|r| r.row_id().to_string())
        else {
            return;
        };

        let organization = match self.org_picker_selection {
            0 => None,
            i => match self.management_orgs.get(i - 1) {
                Some(org) => Some(OrganizationRef {
                    id: org.id.clone(),
                    name: org.name.clone(),
                }),
                None => return,
            },
        };

        let view = self.management_view;
        let org_id = organization.as_ref().map(|o| o.id.clone());
        let api = self.api.clone();
        debug!(%row_id, ?org_id, ?view, "Assigning RTO");
        self.spawn_task(async move {
            let result = match view {
                ManagementView::Assessors => {
                    api.assign_assessor_organization(&row_id, org_id).await
                }
                ManagementView::Students => api.assign_student_organization(&row_id, org_id).await,
            };
            BackgroundResult::Assigned {
                view,
                row_id,
                organization,
                result,
            }
        });
    }

    fn process_assignment(
        &mut self,
        view: ManagementView,
        row_id: &str,
        organization: Option<OrganizationRef>,
        result: Result<(), ApiError>,
    ) {
        if let Err(e) = result {
            error!(%row_id, error = %e, "Assignment failed");
            self.status_message = Some(format!("Could not assign RTO: {}", e.detail()));
            return;
        }

        let row: Option<&mut dyn Assignable> = match view {
            ManagementView::Assessors => self
                .assessors
                .iter_mut()
                .find(|r| r.id == row_id)
                .map(|r| r as &mut dyn Assignable),
            ManagementView::Students => self
                .student_assignments
                .iter_mut()
                .find(|r| r.id == row_id)
                .map(|r| r as &mut dyn Assignable),
        };

        let message = if organization.is_some() {
            "RTO assigned."
        } else {
            "RTO unassigned."
        };
        if let Some(row) = row {
            row.set_organization(organization);
        }
        self.status_message = Some(message.to_string());
    }
}

/// Keep a list selection inside `0..len`
fn clamp_selection(selection: usize, len: usize) -> usize {
    selection.min(len.saturating_sub(1))
}

fn login_error_message(e: &ApiError) -> String {
    match e {
        ApiError::Unauthorized => "Invalid email or password".to_string(),
        ApiError::Rejected(message) | ApiError::AccessDenied(message) => {
            format!("Sign-in failed: {}", message)
        }
        other => other.user_message(),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_search_char(current_len: usize, c: char) -> bool {
    current_len < MAX_SEARCH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rplportal_core::models::UserRole;

    fn test_app() -> App {
        let config = Config::default();
        let session = Session::new(std::env::temp_dir().join("rplportal-app-tests"));
        let api = ApiClient::new("http://127.0.0.1:9", "anon").unwrap();
        App::with_session(config, session, api)
    }

    fn student(id: &str) -> StudentSummary {
        StudentSummary {
            id: id.to_string(),
            name: format!("Student {}", id),
            email: format!("{}@example.com", id),
            avatar_url: None,
            course: "Cert III".to_string(),
            enrolled_at: None,
            progress: 80,
            status: StudentStatus::Active,
            evidence_count: 2,
            assigned_to: "Unassigned".to_string(),
            company_id: None,
        }
    }

    fn assessor(id: &str) -> AssessorAssignment {
        AssessorAssignment {
            id: id.to_string(),
            full_name: Some(format!("Assessor {}", id)),
            email: None,
            organization_id: None,
            organization: None,
        }
    }

    #[test]
    fn test_enrollment_failure_sets_status_message() {
        let mut app = test_app();
        app.state = AppState::Normal;

        app.process_result(BackgroundResult::EnrollmentSubmitted(Err(
            EnrollmentError::EnrollmentInsert {
                profile_id: "p-1".to_string(),
                source: ApiError::ServerError("insert failed".to_string()),
            },
        )));

        let message = app.status_message.clone().unwrap_or_default();
        assert!(message.starts_with("User invited/linked, but failed to create enrollment"));
        assert_eq!(app.enrollment_form.error(), Some(message.as_str()));
        assert!(!app.enrollment_form.is_submitting());
    }

    #[test]
    fn test_submit_ignored_while_form_incomplete() {
        let mut app = test_app();
        app.submit_enrollment_form();
        assert!(!app.enrollment_form.is_submitting());
        assert_eq!(
            app.enrollment_form.error(),
            Some("Please fill in all required fields.")
        );
    }

    // -------------------------------------------------------------------------
    // Enum Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_enroll_focus_cycles() {
        let mut focus = EnrollFocus::Email;
        for _ in 0..6 {
            focus = focus.next();
        }
        assert_eq!(focus, EnrollFocus::Email);
        assert_eq!(EnrollFocus::Email.prev(), EnrollFocus::Submit);
        assert!(EnrollFocus::Stream.is_list());
        assert!(!EnrollFocus::Submit.is_list());
    }

    #[test]
    fn test_management_view_toggle() {
        assert_eq!(ManagementView::Assessors.toggle(), ManagementView::Students);
        assert_eq!(ManagementView::Students.toggle(), ManagementView::Assessors);
    }

    // -------------------------------------------------------------------------
    // App State Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_tabs_follow_profile_role() {
        let mut app = test_app();
        assert_eq!(app.current_dashboard(), Dashboard::SignIn);

        app.set_profile(Some(Profile {
            id: "p1".to_string(),
            email: None,
            full_name: Some("Ada".to_string()),
            avatar_url: None,
            role: Some(UserRole::Admin),
            company_id: None,
            organization_id: None,
        }));
        assert_eq!(app.tabs, vec![Dashboard::Portfolio, Dashboard::Management]);
        app.next_tab();
        assert_eq!(app.current_dashboard(), Dashboard::Management);
        app.next_tab();
        assert_eq!(app.current_dashboard(), Dashboard::Portfolio);
        app.prev_tab();
        assert_eq!(app.current_dashboard(), Dashboard::Management);
        assert_eq!(app.signed_in_as().as_deref(), Some("Ada (Admin)"));
    }

    #[tokio::test]
    async fn test_stale_student_page_is_dropped() {
        let mut app = test_app();
        app.refresh_students();
        let stale = app.students_generation;
        app.refresh_students();

        app.process_students_page(
            stale,
            Ok(StudentPage {
                students: vec![student("old")],
                total: 1,
            }),
        );
        assert!(app.students.is_empty());
        assert!(app.students_loading);

        let current = app.students_generation;
        app.process_students_page(
            current,
            Ok(StudentPage {
                students: vec![student("new")],
                total: 1,
            }),
        );
        assert_eq!(app.students[0].id, "new");
        assert!(!app.students_loading);
    }

    #[tokio::test]
    async fn test_page_past_end_is_clamped_and_refetched() {
        let mut app = test_app();
        app.student_query.set_page(5);
        app.refresh_students();
        let generation = app.students_generation;

        app.process_students_page(
            generation,
            Ok(StudentPage {
                students: Vec::new(),
                total: 7,
            }),
        );
        assert_eq!(app.student_query.page, 2);
        assert_eq!(app.students_generation, generation + 1);
        assert!(app.students_loading);
    }

    #[tokio::test]
    async fn test_endorse_requires_threshold() {
        let mut app = test_app();
        let mut low = student("s1");
        low.progress = 40;
        app.students = vec![low];

        app.endorse_selected();
        assert_eq!(
            app.status_message.as_deref(),
            Some("Only active students with at least 70% progress can be endorsed.")
        );
    }

    #[tokio::test]
    async fn test_endorse_failure_reported() {
        let mut app = test_app();
        app.process_result(BackgroundResult::Endorsed {
            student_id: "s1".to_string(),
            result: Err(ApiError::AccessDenied("not allowed".to_string())),
        });
        assert_eq!(
            app.status_message.as_deref(),
            Some("Could not endorse student: not allowed")
        );
    }

    #[tokio::test]
    async fn test_assignment_updates_row_on_success_only() {
        let mut app = test_app();
        app.assessors = vec![assessor("a1"), assessor("a2")];

        app.process_result(BackgroundResult::Assigned {
            view: ManagementView::Assessors,
            row_id: "a2".to_string(),
            organization: Some(OrganizationRef {
                id: "r1".to_string(),
                name: Some("Northside".to_string()),
            }),
            result: Err(ApiError::ServerError("boom".to_string())),
        });
        assert_eq!(app.status_message.as_deref(), Some("Could not assign RTO: boom"));
        assert!(app.assessors[1].organization.is_none());

        app.process_result(BackgroundResult::Assigned {
            view: ManagementView::Assessors,
            row_id: "a2".to_string(),
            organization: Some(OrganizationRef {
                id: "r1".to_string(),
                name: Some("Northside".to_string()),
            }),
            result: Ok(()),
        });
        assert_eq!(app.assessors[1].organization_id.as_deref(), Some("r1"));
        assert_eq!(app.assessors[1].organization_name(), Some("Northside"));
        assert!(app.assessors[0].organization.is_none());
    }

    #[tokio::test]
    async fn test_management_filter() {
        let mut app = test_app();
        app.assessors = vec![assessor("a1"), assessor("b2")];
        app.management_filter = "B2".to_string();
        let rows = app.management_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_id(), "b2");
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(99, '@'));
        assert!(!can_add_email_char(100, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_name_and_search_chars() {
        assert!(can_add_name_char(0, ' '));
        assert!(!can_add_name_char(100, 'a'));
        assert!(can_add_search_char(63, 'x'));
        assert!(!can_add_search_char(64, 'x'));
        assert!(!can_add_search_char(0, '\t'));
    }
}
