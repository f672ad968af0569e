use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredView {
    #[default]
    Table,
    Graph,
    Compact,
}

impl FromStr for PreferredView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(PreferredView::Table),
            "graph" => Ok(PreferredView::Graph),
            "compact" => Ok(PreferredView::Compact),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Free,
    Pro,
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(AccountType::Free),
            "pro" => Ok(AccountType::Pro),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// `GET /user_profile/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub preferred_view: PreferredView,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// `POST /register_user/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterUser<'a> {
    pub firebase_uid: &'a str,
    pub email: &'a str,
    pub name: &'a str,
}

/// `PATCH /update_user/`. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_view: Option<PreferredView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.preferred_view.is_none() && self.account_type.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProfileUpdateBody<'a> {
    pub firebase_uid: &'a str,
    #[serde(flatten)]
    pub update: &'a ProfileUpdate,
}

/// `{"message": ...}` acknowledgement returned by the account endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}
