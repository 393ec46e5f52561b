use crate::backend::model::Plan;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("token is not a JWT")]
    Malformed,
    #[error("token payload is not valid base64")]
    Encoding,
    #[error("token payload is not valid JSON: {0}")]
    Payload(String),
}

/// Claims the profile page cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub username: String,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl DecodedToken {
    /// Decodes the payload segment of a JWT. The signature is not checked here;
    /// the API does that on every request.
    pub fn from_jwt(token: &str) -> Result<Self, SessionError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_sig), None) =
            (segments.next(), segments.next(), segments.next(), segments.next())
        else {
            return Err(SessionError::Malformed);
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| SessionError::Encoding)?;
        serde_json::from_slice(&bytes).map_err(|e| SessionError::Payload(e.to_string()))
    }
}

/// Authenticated user as seen by the app shell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    token: Option<DecodedToken>,
    raw_token: Option<String>,
    provider_login: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_token(raw: &str, provider_login: bool) -> Result<Self, SessionError> {
        let token = DecodedToken::from_jwt(raw)?;
        Ok(Self {
            token: Some(token),
            raw_token: Some(raw.to_string()),
            provider_login,
        })
    }

    /// Session from already decoded claims, without a bearer token.
    #[cfg(test)]
    pub fn with_claims(token: DecodedToken, provider_login: bool) -> Self {
        Self {
            token: Some(token),
            raw_token: None,
            provider_login,
        }
    }

    #[cfg(test)]
    pub fn token(&self) -> Option<&DecodedToken> {
        self.token.as_ref()
    }

    pub fn raw_token(&self) -> Option<&str> {
        self.raw_token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.username.as_str())
    }

    pub fn is_owner(&self, username: &str) -> bool {
        self.username() == Some(username)
    }

    pub fn provider_login(&self) -> bool {
        self.provider_login
    }

    pub fn clear_provider_login(&mut self) {
        self.provider_login = false;
    }

    pub fn set_plan(&mut self, plan: Plan) {
        if let Some(token) = self.token.as_mut() {
            token.plan = plan;
        }
    }

    pub fn sign_out(&mut self) {
        *self = Self::anonymous();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decode_token() {
        let raw = jwt(r#"{"username":"mario","plan":"standard","exp":1700000000}"#);
        let session = Session::from_token(&raw, true).expect("valid token");
        assert_eq!(session.username(), Some("mario"));
        assert_eq!(session.token().unwrap().plan, Plan::Standard);
        assert_eq!(session.raw_token(), Some(raw.as_str()));
        assert!(session.provider_login());
        assert!(session.is_owner("mario"));
        assert!(!session.is_owner("lucia"));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(DecodedToken::from_jwt("abc"), Err(SessionError::Malformed));
        assert_eq!(DecodedToken::from_jwt("a.$$$.c"), Err(SessionError::Encoding));
        assert!(matches!(
            DecodedToken::from_jwt(&jwt("not json")),
            Err(SessionError::Payload(_))
        ));
    }

    #[test]
    fn test_plan_update_and_sign_out() {
        let raw = jwt(r#"{"username":"mario"}"#);
        let mut session = Session::from_token(&raw, true).unwrap();
        assert_eq!(session.token().unwrap().plan, Plan::Base);
        session.set_plan(Plan::Premium);
        assert_eq!(session.token().unwrap().plan, Plan::Premium);
        session.clear_provider_login();
        assert!(!session.provider_login());
        session.sign_out();
        assert_eq!(session, Session::anonymous());
        assert!(!session.is_owner("mario"));
    }
}
