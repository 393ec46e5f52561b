use crate::backend::model::{Account, Plan, RecipeSummary};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid API base url {0}")]
    BaseUrl(String),
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("the server rejected {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

/// Maps a failed response to an error, picking up per-field messages on 400/422.
pub fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            if !parsed.errors.is_empty() {
                return ApiError::Validation(parsed.errors);
            }
        }
    }
    ApiError::Status {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Remote collaborators used by the profile page.
#[allow(async_fn_in_trait)]
pub trait ProfileApi {
    /// `Ok(None)` when the account does not exist.
    async fn fetch_account(&self, username: &str) -> Result<Option<Account>, ApiError>;
    async fn fetch_recipes(&self) -> Result<Vec<RecipeSummary>, ApiError>;
    async fn modify_account(&self, username: &str, draft: &Account) -> Result<(), ApiError>;
    async fn upgrade_plan(&self, username: &str, plan: Plan, account: &Account) -> Result<(), ApiError>;
    async fn delete_account(&self, username: &str) -> Result<(), ApiError>;
    async fn delete_recipe(&self, id: &str) -> Result<(), ApiError>;
    /// Ends the Google session. Anything but HTTP 200 is a failure.
    async fn logout_provider(&self) -> Result<(), ApiError>;
    /// Bearer token sent with every later request; `None` sends requests anonymously.
    fn set_token(&self, token: Option<String>);
}

/// REST implementation of [`ProfileApi`].
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    token: RefCell<Option<String>>,
}

impl HttpApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(30));
        let client = builder.build()?;

        let parsed = Url::parse(base_url).map_err(|e| ApiError::BaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }

        tracing::info!("Creating API client for {}", parsed);
        Ok(Self {
            client,
            base_url: parsed,
            token: RefCell::new(token),
        })
    }

    /// `{base}/api/v1/{segments..}`. Each segment is percent-encoded, so `/`, `?` and `#`
    /// inside a username or id stay part of that segment.
    pub fn build_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.token.borrow().clone();
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(error_from_body(status, &body))
        }
    }
}

impl ProfileApi for HttpApi {
    async fn fetch_account(&self, username: &str) -> Result<Option<Account>, ApiError> {
        let url = self.build_url(["accounts", username]);
        tracing::debug!("GET {}", url);
        match self.send(self.client.get(url)).await {
            Ok(response) => Ok(response.json::<Option<Account>>().await?),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_recipes(&self) -> Result<Vec<RecipeSummary>, ApiError> {
        let url = self.build_url(["recipes"]);
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    async fn modify_account(&self, username: &str, draft: &Account) -> Result<(), ApiError> {
        let url = self.build_url(["accounts", username]);
        tracing::debug!("PUT {}", url);
        self.send(self.client.put(url).json(draft)).await?;
        Ok(())
    }

    async fn upgrade_plan(&self, username: &str, plan: Plan, account: &Account) -> Result<(), ApiError> {
        let url = self.build_url(["accounts", username]);
        tracing::debug!("PUT {} (plan {})", url, plan);
        let body = Account {
            plan,
            ..account.draft()
        };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn delete_account(&self, username: &str) -> Result<(), ApiError> {
        let url = self.build_url(["accounts", username]);
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), ApiError> {
        let url = self.build_url(["recipes", id]);
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn logout_provider(&self) -> Result<(), ApiError> {
        let url = self.build_url(["auth", "google", "logout"]);
        tracing::debug!("POST {}", url);
        let response = self.send(self.client.post(url)).await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ApiError::Status {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let api = HttpApi::new("http://localhost:3000/", None).unwrap();
        assert_eq!(api.build_url(["accounts", "mario"]).as_str(), "http://localhost:3000/api/v1/accounts/mario");
        assert_eq!(api.build_url(["recipes"]).as_str(), "http://localhost:3000/api/v1/recipes");

        let nested = HttpApi::new("https://example.com/cookbook", None).unwrap();
        assert_eq!(nested.build_url(["recipes"]).path(), "/cookbook/api/v1/recipes");

        assert!(matches!(HttpApi::new("not a url", None), Err(ApiError::BaseUrl(_))));
    }

    #[test]
    fn test_build_url_keeps_user_input_in_one_segment() {
        let api = HttpApi::new("http://localhost:3000", None).unwrap();

        let url = api.build_url(["accounts", "a?b"]);
        assert_eq!(url.path(), "/api/v1/accounts/a%3Fb");
        assert_eq!(url.query(), None);

        let url = api.build_url(["accounts", "x#y"]);
        assert_eq!(url.path(), "/api/v1/accounts/x%23y");
        assert_eq!(url.fragment(), None);

        let url = api.build_url(["accounts", "../recipes"]);
        assert_eq!(url.path(), "/api/v1/accounts/..%2Frecipes");
    }

    #[test]
    fn test_set_token_controls_bearer_header() {
        let api = HttpApi::new("http://localhost:3000", Some("abc".into())).unwrap();
        let auth = |api: &HttpApi| {
            api.authorized(api.client.get(api.build_url(["recipes"])))
                .build()
                .unwrap()
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .map(|v| v.to_str().unwrap().to_string())
        };
        assert_eq!(auth(&api).as_deref(), Some("Bearer abc"));
        api.set_token(None);
        assert_eq!(auth(&api), None);
    }

    #[test]
    fn test_field_errors_from_bad_request() {
        let err = error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"errors": {"email": "Email already in use"}}"#,
        );
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.get("email").map(String::as_str), Some("Email already in use"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_status_errors() {
        assert_eq!(
            error_from_body(StatusCode::BAD_REQUEST, "bad"),
            ApiError::Status { status: 400, body: "bad".into() }
        );
        assert_eq!(
            error_from_body(StatusCode::UNPROCESSABLE_ENTITY, r#"{"errors": {}}"#),
            ApiError::Status { status: 422, body: r#"{"errors": {}}"#.into() }
        );
        assert!(matches!(
            error_from_body(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ApiError::Status { status: 500, .. }
        ));
    }
}
