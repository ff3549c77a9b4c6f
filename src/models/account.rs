use serde::{Deserialize, Serialize};

/// Token pair payload inside login and refresh responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
}

/// Envelope returned by `/console/api/login` and
/// `/console/api/refresh-token`.
///
/// `result` is `"success"` with `data` populated, or some other string with
/// an explanatory `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub result: String,
    #[serde(default)]
    pub data: Option<TokenData>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// The token pair, when the server reported success
    pub fn tokens(&self) -> Option<&TokenData> {
        if self.result == "success" {
            self.data.as_ref()
        } else {
            None
        }
    }
}

/// Body for `POST /console/api/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub language: String,
    pub remember_me: bool,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            language: "zh-Hans".to_string(),
            remember_me: true,
        }
    }

    /// Override the interface language sent with the login
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_remember_me(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }
}

/// Account profile from `GET /console/api/account/profile`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_password_set: Option<bool>,
    #[serde(default)]
    pub interface_language: Option<String>,
    #[serde(default)]
    pub interface_theme: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<i64>,
    #[serde(default)]
    pub last_login_ip: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_success_tokens() {
        let json = r#"{"result":"success","data":{"access_token":"T1","refresh_token":"R1"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        let tokens = resp.tokens().unwrap();
        assert_eq!(tokens.access_token, "T1");
        assert_eq!(tokens.refresh_token, "R1");
    }

    #[test]
    fn test_auth_response_error_has_no_tokens() {
        let json = r#"{"result":"error","message":"invalid refresh token"}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(resp.tokens().is_none());
        assert_eq!(resp.message.as_deref(), Some("invalid refresh token"));
    }

    #[test]
    fn test_login_request_defaults_and_overrides() {
        let request = LoginRequest::new("a@b.c", "pw");
        assert_eq!(request.language, "zh-Hans");
        assert!(request.remember_me);

        let request = LoginRequest::new("a@b.c", "pw")
            .with_language("en-US")
            .with_remember_me(false);
        assert_eq!(request.language, "en-US");
        assert!(!request.remember_me);
    }

    #[test]
    fn test_auth_response_success_without_data() {
        let json = r#"{"result":"success"}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(resp.tokens().is_none());
    }
}
