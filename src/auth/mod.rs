// snapsize/src/auth/mod.rs
//! Identity provider boundary. Cloud saves are only offered to a signed-in
//! user; everything about credentials is delegated to the provider.
mod view;

pub use view::{AuthAction, AuthController, AuthView, ForgotStep, Screen, Status};

use crate::utils::sanitize_user_prefix;
use serde::{Deserialize, Serialize};

/// Provider answer: a success flag and a message shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

impl AuthOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl UserInfo {
    /// Key segment for this user's cloud saves: username, else email.
    pub fn storage_prefix(&self) -> Option<String> {
        let raw = if !self.username.is_empty() {
            self.username.as_str()
        } else {
            self.email.as_deref().unwrap_or_default()
        };

        if raw.is_empty() {
            None
        } else {
            Some(sanitize_user_prefix(raw))
        }
    }

    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.username)
    }
}

pub trait IdentityProvider {
    fn sign_up(&self, email: &str, password: &str) -> AuthOutcome;

    fn confirm_sign_up(&self, email: &str, code: &str) -> AuthOutcome;

    fn sign_in(&self, email: &str, password: &str) -> AuthOutcome;

    fn reset_password_start(&self, email: &str) -> AuthOutcome;

    fn reset_password_confirm(&self, email: &str, code: &str, new_password: &str) -> AuthOutcome;

    fn sign_out(&self) -> AuthOutcome;

    fn current_user(&self) -> Option<UserInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_prefix_prefers_username() {
        let user = UserInfo {
            username: "jo smith".to_string(),
            email: Some("jo@x.io".to_string()),
            user_id: None,
        };
        assert_eq!(user.storage_prefix().as_deref(), Some("jo_smith"));
    }

    #[test]
    fn storage_prefix_falls_back_to_email() {
        let user = UserInfo {
            username: String::new(),
            email: Some("jo@x.io".to_string()),
            user_id: None,
        };
        assert_eq!(user.storage_prefix().as_deref(), Some("jo_x.io"));

        let anonymous = UserInfo {
            username: String::new(),
            email: None,
            user_id: None,
        };
        assert_eq!(anonymous.storage_prefix(), None);
    }

    #[test]
    fn user_info_deserializes_with_optional_fields() {
        let user: UserInfo = serde_json::from_str(r#"{"username":"ann"}"#).unwrap();
        assert_eq!(user.username, "ann");
        assert_eq!(user.email, None);
        assert_eq!(user.display_name(), "ann");
    }
}
