use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::session::Session;

/// `data` of a successful `auth/login`.
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginData {
    #[serde(alias = "access_token")]
    pub token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    /// Seconds until the token expires.
    #[serde(default)]
    pub expires_in: Option<i64>,

    pub user: LoginUser,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginUser {
    pub id: i64,
    pub name: String,
    pub email: String,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,
}

impl LoginData {
    pub fn into_session(self) -> Session {
        Session {
            name: self.user.name,
            email: self.user.email,
            role: self.user.role,
            token: self.token,
            expires_at: self
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}
