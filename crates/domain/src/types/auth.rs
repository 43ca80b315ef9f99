//! Authentication and user types

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Access/refresh bearer token pair.
///
/// Both tokens are always present together; a half pair is never
/// constructed by the client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    /// Pair of both tokens.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

// Tokens must never end up in logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Raw login/refresh response. Fields are optional because a 200 without
/// tokens must be detected and rejected, not silently accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Extract a complete pair, or `None` if either token is missing/empty.
    pub fn into_pair(self) -> Option<TokenPair> {
        match (self.access_token, self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(TokenPair::new(access, refresh))
            }
            _ => None,
        }
    }
}

/// Login and registration request body
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl UserCredentials {
    /// Login or registration credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `/auth/refresh` and `/auth/logout`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Account state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Inactive,
    Active,
}

impl_domain_status_conversions!(UserState {
    Inactive => "inactive",
    Active => "active",
});

/// Current user as returned by `/auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub state: UserState,
    pub created_at: String,
}

/// Partial update of the current user (`PUT /auth/me`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_requires_both_tokens() {
        let full = TokenResponse {
            access_token: Some("A".into()),
            refresh_token: Some("R".into()),
            token_type: Some("bearer".into()),
        };
        assert_eq!(full.into_pair(), Some(TokenPair::new("A", "R")));

        let missing_refresh =
            TokenResponse { access_token: Some("A".into()), ..TokenResponse::default() };
        assert_eq!(missing_refresh.into_pair(), None);

        let empty_access = TokenResponse {
            access_token: Some(String::new()),
            refresh_token: Some("R".into()),
            token_type: None,
        };
        assert_eq!(empty_access.into_pair(), None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret"));

        let creds = UserCredentials::new("a@b.c", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("a@b.c"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_user_info_deserializes() {
        let user: UserInfo = serde_json::from_str(
            r#"{"id": 3, "email": "a@b.c", "state": "active", "created_at": "2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(user.state, UserState::Active);
        assert_eq!(user.state.to_string(), "active");
    }
}
