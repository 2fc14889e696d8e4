//! Application state management for the academy terminal client.
//!
//! `App` owns the UI state, a shared `SessionStore`, the catalog cache and
//! the channel that background requests report back on. The admin screen is
//! wrapped in an `AccessGuard` that is created fresh each time the screen is
//! entered.

use std::sync::Arc;

use academy_core::auth::{AccessGuard, Guarded, Navigator, Session, SessionStore, LOGIN_PATH};
use academy_core::cache::CacheManager;
use academy_core::catalog::MaterialFilter;
use academy_core::forms::{
    can_add_char, Credentials, ForgotPassword, PasswordReset, Registration,
};
use academy_core::models::{Category, Identity, Material, Role, UserRecord};
use academy_core::{AuthError, Config};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";
const GENERIC_FALLBACK: &str = "An error occurred. Please try again.";
const ROLE_FALLBACK: &str = "Failed to update role.";
const DOWNLOAD_FALLBACK: &str = "Download failed. Please refresh and try logging in again.";
const DOWNLOAD_LOGIN_HINT: &str =
    "Please log in to your student account to download free resources.";

// ============================================================================
// Screens and routes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Materials,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    AdminUsers,
}

impl Screen {
    pub fn path(&self) -> &'static str {
        match self {
            Screen::Materials => "/free-material",
            Screen::Login => LOGIN_PATH,
            Screen::Register => "/register",
            Screen::ForgotPassword => "/forgot-password",
            Screen::ResetPassword => "/reset-password",
            Screen::AdminUsers => "/admin/users",
        }
    }

    /// Resolve a route path; `/reset-password/<token>` maps to the reset screen
    pub fn from_path(path: &str) -> Option<Screen> {
        let path = path.trim_end_matches('/');
        if path.starts_with("/reset-password") {
            return Some(Screen::ResetPassword);
        }
        [
            Screen::Materials,
            Screen::Login,
            Screen::Register,
            Screen::ForgotPassword,
            Screen::AdminUsers,
        ]
        .into_iter()
        .find(|screen| screen.path() == path)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Materials => "Free Library",
            Screen::Login => "Login",
            Screen::Register => "Sign Up",
            Screen::ForgotPassword => "Forgot Password",
            Screen::ResetPassword => "Reset Password",
            Screen::AdminUsers => "Manage Users",
        }
    }

    pub fn is_form(&self) -> bool {
        matches!(
            self,
            Screen::Login | Screen::Register | Screen::ForgotPassword | Screen::ResetPassword
        )
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Route changes requested by the access guard, applied after evaluation.
#[derive(Debug, Default)]
pub struct ScreenNavigator {
    interactive: bool,
    pending: Option<String>,
}

impl ScreenNavigator {
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            pending: None,
        }
    }

    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl Navigator for ScreenNavigator {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn replace(&mut self, path: &str) {
        self.pending = Some(path.to_string());
    }
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub masked: bool,
}

impl FormField {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: true,
        }
    }
}

/// State of one form screen. Focus index `fields.len()` is the submit button.
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub submit_label: &'static str,
    pub busy_label: &'static str,
    pub error: Option<String>,
    pub success: Option<String>,
    pub submitting: bool,
}

impl Form {
    fn new(fields: Vec<FormField>, submit_label: &'static str, busy_label: &'static str) -> Self {
        Self {
            fields,
            focus: 0,
            submit_label,
            busy_label,
            error: None,
            success: None,
            submitting: false,
        }
    }

    pub fn login() -> Self {
        Self::new(
            vec![FormField::text("Email"), FormField::secret("Password")],
            "Sign In",
            "Logging In...",
        )
    }

    pub fn register() -> Self {
        Self::new(
            vec![
                FormField::text("Full Name"),
                FormField::text("Email"),
                FormField::secret("Password"),
                FormField::secret("Confirm Password"),
            ],
            "Sign Up",
            "Creating Account...",
        )
    }

    pub fn forgot_password() -> Self {
        Self::new(vec![FormField::text("Email")], "Send Reset Link", "Sending...")
    }

    pub fn reset_password() -> Self {
        Self::new(
            vec![
                FormField::text("Reset Token"),
                FormField::secret("New Password"),
                FormField::secret("Confirm New Password"),
            ],
            "Set New Password",
            "Resetting...",
        )
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value.into();
        }
    }

    pub fn on_button(&self) -> bool {
        self.focus >= self.fields.len()
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % (self.fields.len() + 1);
    }

    pub fn focus_prev(&mut self) {
        let slots = self.fields.len() + 1;
        self.focus = (self.focus + slots - 1) % slots;
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if can_add_char(field.value.chars().count(), c) {
                field.value.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    /// Start a submission; false if one is already outstanding
    fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        self.error = None;
        self.success = None;
        true
    }

    fn fail(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    fn clear_secrets(&mut self) {
        for field in self.fields.iter_mut().filter(|f| f.masked) {
            field.value.clear();
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned requests. Errors are already user-facing.
enum TaskResult {
    LoggedIn(Result<Session, AuthError>),
    Registered(Result<Session, AuthError>),
    ResetLinkSent(Result<String, String>),
    PasswordReset(Result<Option<String>, String>),
    /// Tagged with the token the list was requested under
    Users {
        token: Option<String>,
        result: Result<Vec<UserRecord>, String>,
    },
    RoleUpdated(Result<(String, Role), String>),
    Catalog(Result<(Vec<Category>, Vec<Material>), String>),
    Download(Result<String, String>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub store: Arc<SessionStore>,
    session_rx: watch::Receiver<Session>,
    pub session: Session,
    pub cache: Option<CacheManager>,
    interactive: bool,

    // UI State
    pub state: AppState,
    pub screen: Screen,
    pub status_message: Option<String>,

    // Forms
    pub login_form: Form,
    pub register_form: Form,
    pub forgot_form: Form,
    pub reset_form: Form,

    // Admin users screen
    admin_guard: AccessGuard<ScreenNavigator>,
    pub admin_view: Guarded<Identity>,
    pub users: Vec<UserRecord>,
    pub users_loaded: bool,
    pub users_loading: bool,
    pub users_error: Option<String>,
    pub user_selection: usize,
    pub role_update_pending: bool,

    // Free material
    pub categories: Vec<Category>,
    pub materials: Vec<Material>,
    pub filter: MaterialFilter,
    pub material_selection: usize,
    pub catalog_loading: bool,
    pub catalog_age: String,
    pub download_pending: bool,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    pub fn new(config: Config, store: Arc<SessionStore>, cache: Option<CacheManager>, interactive: bool) -> Self {
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let session_rx = store.subscribe();
        let session = store.current();

        let mut login_form = Form::login();
        let email = std::env::var("ACADEMY_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        login_form.set_value(0, email);
        login_form.set_value(1, std::env::var("ACADEMY_PASSWORD").unwrap_or_default());
        if !login_form.value(0).is_empty() {
            login_form.focus = 1;
        }

        Self {
            config,
            store,
            session_rx,
            session,
            cache,
            interactive,

            state: AppState::Normal,
            screen: Screen::Materials,
            status_message: None,

            login_form,
            register_form: Form::register(),
            forgot_form: Form::forgot_password(),
            reset_form: Form::reset_password(),

            admin_guard: AccessGuard::admin_only(ScreenNavigator::new(interactive)),
            admin_view: Guarded::Loading,
            users: Vec::new(),
            users_loaded: false,
            users_loading: false,
            users_error: None,
            user_selection: 0,
            role_update_pending: false,

            categories: Vec::new(),
            materials: Vec::new(),
            filter: MaterialFilter::default(),
            material_selection: 0,
            catalog_loading: false,
            catalog_age: "never".to_string(),
            download_pending: false,

            task_rx,
            task_tx,
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Restore the persisted session off the UI thread
    pub fn start_hydration(&self) {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let session = store.hydrate();
            debug!(authenticated = session.is_authenticated(), "Hydrated");
        });
    }

    pub fn current_user(&self) -> Option<&Identity> {
        self.session.user.as_ref()
    }

    /// Pick up session changes and re-run the routing rules that depend on them
    pub fn sync_session(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            let previous_token = self.session.token().map(str::to_string);
            self.session = self.session_rx.borrow_and_update().clone();
            if self.session.token() != previous_token.as_deref() {
                // The table belongs to whoever fetched it
                self.reset_users();
            }
            debug!(
                authenticated = self.session.is_authenticated(),
                loading = self.session.is_loading,
                "Session changed"
            );
        }

        // Login and sign-up are pointless once someone is logged in
        if matches!(self.screen, Screen::Login | Screen::Register) && !self.session.is_loading {
            if let Some(role) = self.session.role() {
                let target = if role == Role::Admin {
                    Screen::AdminUsers
                } else {
                    Screen::Materials
                };
                self.navigate(target);
            }
        }

        if self.screen == Screen::AdminUsers {
            self.evaluate_admin_guard();
        }
    }

    fn evaluate_admin_guard(&mut self) {
        self.admin_view = self.admin_guard.check(&self.session);

        if let Some(path) = self.admin_guard.navigator_mut().take_pending() {
            if let Some(denial) = self.admin_guard.denial() {
                debug!(?denial, "Admin screen refused");
            }
            match Screen::from_path(&path) {
                Some(screen) => self.navigate(screen),
                None => warn!(path = %path, "Guard redirected to unknown route"),
            }
            return;
        }

        if matches!(self.admin_view, Guarded::Content(_)) && !self.users_loaded && !self.users_loading {
            self.fetch_users();
        }
    }

    pub fn logout(&mut self) {
        match self.store.logout() {
            Ok(()) => self.status_message = Some("Logged out".to_string()),
            Err(e) => {
                warn!(error = %e, "Logout could not clear persisted session");
                self.status_message = Some(format!("Logged out ({})", e));
            }
        }
        self.reset_users();
    }

    fn reset_users(&mut self) {
        self.users.clear();
        self.users_loaded = false;
        self.users_loading = false;
        self.users_error = None;
        self.user_selection = 0;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        debug!(from = self.screen.path(), to = screen.path(), "Navigate");
        self.state = AppState::Normal;
        self.screen = screen;

        if screen == Screen::AdminUsers {
            // Entering the screen mounts a fresh guard
            self.admin_guard = AccessGuard::admin_only(ScreenNavigator::new(self.interactive));
            self.admin_view = Guarded::Loading;
            self.users_loaded = false;
            self.users_error = None;
            self.user_selection = 0;
            self.evaluate_admin_guard();
        }
        if matches!(screen, Screen::Login | Screen::Register) {
            self.sync_session();
        }
    }

    /// Open the reset screen with a token from a link or the command line
    pub fn open_reset(&mut self, token_or_link: &str) {
        self.reset_form = Form::reset_password();
        self.reset_form
            .set_value(0, PasswordReset::token_from_input(token_or_link));
        self.reset_form.focus = 1;
        self.navigate(Screen::ResetPassword);
    }

    // =========================================================================
    // Form submission
    // =========================================================================

    pub fn submit_current_form(&mut self) {
        match self.screen {
            Screen::Login => self.submit_login(),
            Screen::Register => self.submit_register(),
            Screen::ForgotPassword => self.submit_forgot_password(),
            Screen::ResetPassword => self.submit_reset_password(),
            _ => {}
        }
    }

    pub fn current_form_mut(&mut self) -> Option<&mut Form> {
        match self.screen {
            Screen::Login => Some(&mut self.login_form),
            Screen::Register => Some(&mut self.register_form),
            Screen::ForgotPassword => Some(&mut self.forgot_form),
            Screen::ResetPassword => Some(&mut self.reset_form),
            _ => None,
        }
    }

    pub fn current_form(&self) -> Option<&Form> {
        match self.screen {
            Screen::Login => Some(&self.login_form),
            Screen::Register => Some(&self.register_form),
            Screen::ForgotPassword => Some(&self.forgot_form),
            Screen::ResetPassword => Some(&self.reset_form),
            _ => None,
        }
    }

    fn submit_login(&mut self) {
        let credentials = Credentials::new(
            self.login_form.value(0).trim(),
            self.login_form.value(1),
        );
        if let Err(e) = credentials.validate() {
            self.login_form.error = Some(e.to_string());
            return;
        }
        if !self.login_form.begin_submit() {
            return;
        }

        self.config.last_email = Some(credentials.email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        let store = Arc::clone(&self.store);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = store.login(&credentials).await;
            Self::send_result(&tx, TaskResult::LoggedIn(result)).await;
        });
    }

    fn submit_register(&mut self) {
        let registration = Registration {
            name: self.register_form.value(0).trim().to_string(),
            email: self.register_form.value(1).trim().to_string(),
            password: self.register_form.value(2).to_string(),
            confirm_password: self.register_form.value(3).to_string(),
        };
        if let Err(e) = registration.validate() {
            self.register_form.error = Some(e.to_string());
            return;
        }
        if !self.register_form.begin_submit() {
            return;
        }

        let store = Arc::clone(&self.store);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = store.register(&registration).await;
            Self::send_result(&tx, TaskResult::Registered(result)).await;
        });
    }

    fn submit_forgot_password(&mut self) {
        let form = ForgotPassword {
            email: self.forgot_form.value(0).trim().to_string(),
        };
        if let Err(e) = form.validate() {
            self.forgot_form.error = Some(e.to_string());
            return;
        }
        if !self.forgot_form.begin_submit() {
            return;
        }

        let api = self.store.api().clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api
                .forgot_password(&form.email)
                .await
                .map_err(|e| e.user_message(GENERIC_FALLBACK));
            Self::send_result(&tx, TaskResult::ResetLinkSent(result)).await;
        });
    }

    fn submit_reset_password(&mut self) {
        let form = PasswordReset {
            token: PasswordReset::token_from_input(self.reset_form.value(0)),
            password: self.reset_form.value(1).to_string(),
            confirm_password: self.reset_form.value(2).to_string(),
        };
        if let Err(e) = form.validate() {
            self.reset_form.error = Some(e.to_string());
            return;
        }
        if !self.reset_form.begin_submit() {
            return;
        }

        let api = self.store.api().clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api
                .reset_password(&form.token, &form.password, &form.confirm_password)
                .await
                .map_err(|e| e.user_message(GENERIC_FALLBACK));
            Self::send_result(&tx, TaskResult::PasswordReset(result)).await;
        });
    }

    // =========================================================================
    // Admin users
    // =========================================================================

    pub fn fetch_users(&mut self) {
        if self.users_loading {
            return;
        }
        self.users_loading = true;
        self.users_error = None;

        let token = self.store.token();
        let store = Arc::clone(&self.store);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = store
                .with_authorized(|api| async move { api.list_users().await })
                .await
                .map_err(|e| e.to_string());
            Self::send_result(&tx, TaskResult::Users { token, result }).await;
        });
    }

    pub fn selected_user(&self) -> Option<&UserRecord> {
        self.users.get(self.user_selection)
    }

    /// Change the selected account's role; the signed-in admin's own row is locked
    pub fn change_selected_role(&mut self, role: Role) {
        if self.role_update_pending {
            return;
        }
        let (Some(target), Some(me)) = (self.selected_user(), self.current_user()) else {
            return;
        };
        if target.is_self(me) {
            self.status_message = Some("You cannot change your own role".to_string());
            return;
        }
        if target.role == role {
            return;
        }

        let user_id = target.id.clone();
        self.role_update_pending = true;
        let store = Arc::clone(&self.store);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let id = user_id.clone();
            let result = store
                .with_authorized(|api| async move { api.update_user_role(&id, role).await })
                .await
                .map(|()| (user_id, role))
                .map_err(|e| e.user_message(ROLE_FALLBACK));
            Self::send_result(&tx, TaskResult::RoleUpdated(result)).await;
        });
    }

    // =========================================================================
    // Free material
    // =========================================================================

    /// Show the cached catalog right away
    pub fn load_from_cache(&mut self) {
        let Some(ref cache) = self.cache else {
            return;
        };
        if let Some(cached) = cache.load_catalog() {
            self.catalog_age = cached.age_display();
            self.categories = cached.data.categories;
            self.materials = cached.data.materials;
            debug!(materials = self.materials.len(), "Catalog loaded from cache");
        }
    }

    pub fn is_catalog_stale(&self) -> bool {
        self.materials.is_empty() || self.cache.as_ref().map(|c| c.catalog_stale()).unwrap_or(true)
    }

    pub fn refresh_catalog(&mut self) {
        if self.catalog_loading {
            return;
        }
        self.catalog_loading = true;
        let api = self.store.api().clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_catalog()
                .await
                .map_err(|e| e.user_message("Failed to load resources."));
            Self::send_result(&tx, TaskResult::Catalog(result)).await;
        });
    }

    pub fn filtered_materials(&self) -> Vec<&Material> {
        self.filter.apply(&self.materials)
    }

    pub fn selected_material(&self) -> Option<&Material> {
        self.filtered_materials().get(self.material_selection).copied()
    }

    pub fn cycle_category(&mut self) {
        self.filter.cycle_category(&self.categories);
        self.material_selection = 0;
    }

    pub fn download_selected(&mut self) {
        if !self.session.is_authenticated() {
            self.status_message = Some(DOWNLOAD_LOGIN_HINT.to_string());
            return;
        }
        if self.download_pending {
            return;
        }
        let Some(material_id) = self.selected_material().map(|m| m.id.clone()) else {
            return;
        };

        self.download_pending = true;
        let store = Arc::clone(&self.store);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = store
                .with_authorized(|api| async move { api.request_download(&material_id).await })
                .await
                .map_err(|e| e.user_message(DOWNLOAD_FALLBACK));
            Self::send_result(&tx, TaskResult::Download(result)).await;
        });
    }

    // =========================================================================
    // Background results
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if tx.send(result).await.is_err() {
            debug!("UI gone before background task finished");
        }
    }

    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::LoggedIn(result) => {
                self.login_form.submitting = false;
                match result {
                    Ok(session) => {
                        self.login_form.clear_secrets();
                        let name = session.user.as_ref().map(|u| u.display_name().to_string());
                        self.status_message =
                            Some(format!("Login Successful! Welcome back, {}.", name.unwrap_or_default()));
                        info!("Login successful");
                    }
                    Err(AuthError::Superseded) => debug!("Login superseded"),
                    Err(e) => {
                        error!(error = %e, "Login failed");
                        self.login_form.fail(e.user_message(LOGIN_FALLBACK));
                    }
                }
            }
            TaskResult::Registered(result) => {
                self.register_form.submitting = false;
                match result {
                    Ok(_) => {
                        self.register_form = Form::register();
                        self.status_message =
                            Some("Registration successful! Logging you in...".to_string());
                    }
                    Err(AuthError::Superseded) => debug!("Registration superseded"),
                    Err(e) => {
                        error!(error = %e, "Registration failed");
                        self.register_form.fail(e.user_message(REGISTER_FALLBACK));
                    }
                }
            }
            TaskResult::ResetLinkSent(result) => match result {
                Ok(message) => {
                    self.forgot_form.submitting = false;
                    self.status_message = Some(message.clone());
                    self.forgot_form.success = Some(message);
                }
                Err(message) => self.forgot_form.fail(message),
            },
            TaskResult::PasswordReset(result) => match result {
                Ok(_) => {
                    self.reset_form = Form::reset_password();
                    self.status_message =
                        Some("Password has been reset successfully! Please log in.".to_string());
                    self.navigate(Screen::Login);
                }
                Err(message) => self.reset_form.fail(message),
            },
            TaskResult::Users { token, result } => {
                if token != self.store.token() {
                    // reset_users already cleared the flags for the new session
                    debug!("Dropping user list fetched for another session");
                    return;
                }
                self.users_loading = false;
                self.users_loaded = true;
                match result {
                    Ok(users) => {
                        self.users = users;
                        self.user_selection = self.user_selection.min(self.users.len().saturating_sub(1));
                    }
                    Err(message) => {
                        warn!(error = %message, "Failed to load users");
                        self.users_error = Some(message);
                    }
                }
            }
            TaskResult::RoleUpdated(result) => {
                self.role_update_pending = false;
                match result {
                    Ok((user_id, role)) => {
                        info!(user_id = %user_id, role = %role, "Role updated");
                        self.status_message = Some("User role updated successfully!".to_string());
                        // Refetch rather than patch locally
                        self.users_loaded = false;
                        self.fetch_users();
                    }
                    Err(message) => self.status_message = Some(message),
                }
            }
            TaskResult::Catalog(result) => {
                self.catalog_loading = false;
                match result {
                    Ok((categories, materials)) => {
                        if let Some(ref cache) = self.cache {
                            if let Err(e) = cache.save_catalog(&categories, &materials) {
                                warn!(error = %e, "Failed to cache catalog");
                            }
                        }
                        self.categories = categories;
                        self.materials = materials;
                        self.catalog_age = "just now".to_string();
                        self.material_selection = self
                            .material_selection
                            .min(self.filtered_materials().len().saturating_sub(1));
                    }
                    Err(message) => self.status_message = Some(message),
                }
            }
            TaskResult::Download(result) => {
                self.download_pending = false;
                self.status_message = Some(match result {
                    Ok(url) => format!("Download starting... {}", url),
                    Err(message) => message,
                });
            }
        }
    }
}
