use crate::backend::{ApiError, ApiResult};
use crate::config::Settings;

/// The signed-in user. Passed explicitly to every operation that acts on
/// behalf of a user; there is no ambient current-user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Session {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }

    /// `None` when no identity has been configured, i.e. the user is logged out.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let uid = settings.uid.clone()?;
        Some(Self {
            uid,
            display_name: settings.user_name.clone(),
            email: settings.user_email.clone(),
        })
    }

    /// Gate for features that need a signed-in user.
    pub fn require(session: Option<&Session>) -> ApiResult<&Session> {
        session.ok_or(ApiError::LoginRequired)
    }

    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_uid_means_logged_out() {
        let settings = Settings::default();
        let session = Session::from_settings(&settings);
        assert!(session.is_none());
        assert_eq!(
            Session::require(session.as_ref()).unwrap_err(),
            ApiError::LoginRequired
        );

        let signed_in = Session::new("uid-1");
        assert_eq!(Session::require(Some(&signed_in)).unwrap().uid, "uid-1");
    }

    #[test]
    fn carries_profile_fields() {
        let settings = Settings {
            uid: Some("uid-1".into()),
            user_email: Some("a@example.com".into()),
            ..Settings::default()
        };
        let session = Session::from_settings(&settings).unwrap();
        assert_eq!(session.uid, "uid-1");
        assert_eq!(session.greeting_name(), "a@example.com");
        assert_eq!(Session::new("u").greeting_name(), "u");
    }
}
