//! Authentication payloads and the signed-in user

use serde::{Deserialize, Serialize};

/// Credentials posted to the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

/// Signed-in user profile, including roles and permission codes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl UserInfo {
    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code || p == "*")
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Payload of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

/// Body posted to the refresh endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Payload of a successful token refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_data_uses_camel_case() {
        let data: LoginData = serde_json::from_str(
            r#"{"token":"t1","refreshToken":"r1","user":{"id":1,"username":"testuser"}}"#,
        )
        .unwrap();
        assert_eq!(data.refresh_token.as_deref(), Some("r1"));
        assert_eq!(data.user.map(|u| u.username), Some("testuser".to_string()));
    }

    #[test]
    fn wildcard_permission_grants_everything() {
        let user = UserInfo { permissions: vec!["*".into()], ..Default::default() };
        assert!(user.has_permission("product:delete"));
        assert!(!UserInfo::default().has_permission("product:delete"));
    }
}
