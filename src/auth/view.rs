// snapsize/src/auth/view.rs
use super::{AuthOutcome, IdentityProvider, UserInfo};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgotStep {
    EmailEntry,
    CodeEntry { email: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    SignUp,
    Confirm { email: String },
    ForgotPassword { step: ForgotStep },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Submitting(String),
    Success(String),
    Error(String),
}

/// What the auth dialog shows. Every transition returns a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthView {
    pub screen: Screen,
    pub status: Status,
    pub user: Option<UserInfo>,
}

impl Default for AuthView {
    fn default() -> Self {
        Self {
            screen: Screen::SignIn,
            status: Status::Idle,
            user: None,
        }
    }
}

impl AuthView {
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn show(self, screen: Screen) -> Self {
        Self {
            screen,
            status: Status::Idle,
            ..self
        }
    }

    pub fn submitting(self, message: impl Into<String>) -> Self {
        Self {
            status: Status::Submitting(message.into()),
            ..self
        }
    }

    pub fn succeeded(self, message: impl Into<String>) -> Self {
        Self {
            status: Status::Success(message.into()),
            ..self
        }
    }

    pub fn failed(self, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error(message.into()),
            ..self
        }
    }

    fn with_user(self, user: Option<UserInfo>) -> Self {
        Self { user, ..self }
    }

    fn with_screen(self, screen: Screen) -> Self {
        Self { screen, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    Navigate(Screen),
    SignUp { email: String, password: String },
    ConfirmSignUp { code: String },
    SignIn { email: String, password: String },
    ResetPasswordStart { email: String },
    ResetPasswordConfirm { code: String, new_password: String },
    SignOut,
    Refresh,
}

/// Applies user actions against an identity provider.
pub struct AuthController<P> {
    provider: P,
}

impl<P: IdentityProvider> AuthController<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Initial view: signed in when the provider already has a session.
    pub fn start(&self) -> AuthView {
        self.dispatch(AuthView::default(), AuthAction::Refresh)
    }

    pub fn dispatch(&self, view: AuthView, action: AuthAction) -> AuthView {
        match action {
            AuthAction::Navigate(screen) => view.show(screen),
            AuthAction::Refresh => {
                let user = self.provider.current_user();
                log::debug!("Session refresh: signed in = {}", user.is_some());
                AuthView {
                    status: Status::Idle,
                    ..view.with_user(user)
                }
            }
            AuthAction::SignUp { email, password } => {
                if let Some(problem) = check_credentials(&email, &password, true) {
                    return view.failed(problem);
                }
                let view = view.submitting("Signing up...");
                let outcome = self.provider.sign_up(&email, &password);
                finish(view, outcome, |v| v.with_screen(Screen::Confirm { email }))
            }
            AuthAction::ConfirmSignUp { code } => {
                let pending = match &view.screen {
                    Screen::Confirm { email } => Some(email.clone()),
                    _ => None,
                };
                let Some(email) = pending else {
                    return view.failed("No sign-up is waiting for confirmation");
                };
                if code.trim().is_empty() {
                    return view.failed("Please fill in all fields");
                }
                let view = view.submitting("Confirming account...");
                let outcome = self.provider.confirm_sign_up(&email, code.trim());
                finish(view, outcome, |v| v.with_screen(Screen::SignIn))
            }
            AuthAction::SignIn { email, password } => {
                if let Some(problem) = check_credentials(&email, &password, false) {
                    return view.failed(problem);
                }
                let view = view.submitting("Logging in...");
                let outcome = self.provider.sign_in(&email, &password);
                let user = if outcome.success {
                    self.provider.current_user()
                } else {
                    None
                };
                finish(view, outcome, |v| v.with_user(user))
            }
            AuthAction::ResetPasswordStart { email } => {
                if email.trim().is_empty() {
                    return view.failed("Please enter your email");
                }
                let view = view.submitting("Sending reset code...");
                let outcome = self.provider.reset_password_start(&email);
                finish(view, outcome, |v| {
                    v.with_screen(Screen::ForgotPassword {
                        step: ForgotStep::CodeEntry { email },
                    })
                })
            }
            AuthAction::ResetPasswordConfirm { code, new_password } => {
                let pending = match &view.screen {
                    Screen::ForgotPassword {
                        step: ForgotStep::CodeEntry { email },
                    } => Some(email.clone()),
                    _ => None,
                };
                let Some(email) = pending else {
                    return view.failed("Request a reset code first");
                };
                if let Some(problem) = check_credentials(&code, &new_password, true) {
                    return view.failed(problem);
                }
                let view = view.submitting("Resetting password...");
                let outcome = self
                    .provider
                    .reset_password_confirm(&email, code.trim(), &new_password);
                finish(view, outcome, |v| v.with_screen(Screen::SignIn))
            }
            AuthAction::SignOut => {
                let outcome = self.provider.sign_out();
                if !outcome.success {
                    log::error!("Logout failed: {}", outcome.message);
                }
                finish(view, outcome, |v| v.with_user(None).with_screen(Screen::SignIn))
            }
        }
    }
}

fn check_credentials(identifier: &str, secret: &str, new_secret: bool) -> Option<&'static str> {
    if identifier.trim().is_empty() || secret.is_empty() {
        return Some("Please fill in all fields");
    }
    if new_secret && secret.chars().count() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 8 characters long");
    }
    None
}

fn finish(view: AuthView, outcome: AuthOutcome, on_success: impl FnOnce(AuthView) -> AuthView) -> AuthView {
    if outcome.success {
        on_success(view).succeeded(outcome.message)
    } else {
        log::debug!("Identity provider refused: {}", outcome.message);
        view.failed(outcome.message)
    }
}
