use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::error::{ErrorPayload, StoreError};
use super::models::{Principal, PrincipalPage, Session, SignUpOutcome};
use super::query::{filter_params, validate_identifier, Filter, SelectQuery};
use super::{Procedures, RemoteStore, TableQuery, UserDirectory};

// Stops a misbehaving directory from paging forever.
const MAX_PRINCIPAL_PAGES: u32 = 1000;

/// HTTP client for the hosted store: PostgREST under `/rest/v1`, the auth
/// service under `/auth/v1`.
#[derive(Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    bearer: String,
    schema: String,
    principal_page_size: u32,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, schema: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| StoreError::InvalidQuery(format!("Invalid store URL {:?}: {}", base_url, e)))?;

        // Url::join drops the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base,
            api_key: api_key.to_string(),
            bearer: api_key.to_string(),
            schema: schema.to_string(),
            principal_page_size: 50,
        })
    }

    pub fn with_principal_page_size(mut self, page_size: u32) -> Self {
        self.principal_page_size = page_size.max(1);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base
            .join(path)
            .map_err(|e| StoreError::InvalidQuery(format!("Invalid endpoint {:?}: {}", path, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    fn request_as(&self, method: Method, url: Url, access_token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<(HeaderMap, Value), StoreError> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((headers, body))
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, StoreError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        let (_, body) = self.send(self.request(Method::POST, url).json(&body)).await?;
        Ok(serde_json::from_value(body)?)
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let payload = match serde_json::from_str::<Value>(&text) {
        Ok(body) => ErrorPayload::from_body(status.as_u16(), &body),
        Err(_) if !text.trim().is_empty() => ErrorPayload::new(text.trim()),
        Err(_) => ErrorPayload::from_body(status.as_u16(), &Value::Null),
    };
    debug!("Remote store returned {}: {}", status, payload);
    Err(StoreError::remote(status.as_u16(), payload))
}

/// Total from a PostgREST `Content-Range` header (`0-24/3573` or `*/3573`).
pub(crate) fn content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl TableQuery for RestStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, StoreError> {
        let params = query.to_params()?;
        let mut url = self.endpoint(&format!("rest/v1/{}", query.table))?;
        url.query_pairs_mut().extend_pairs(params);

        let request = self
            .request(Method::GET, url)
            .header("Accept-Profile", &self.schema);
        let (_, body) = self.send(request).await?;

        match body {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(vec![]),
            other => Err(StoreError::Decode(format!("expected a row array from {}, got {}", query.table, other))),
        }
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        validate_identifier(table)?;
        let mut url = self.endpoint(&format!("rest/v1/{}", table))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("limit", "0")
            .extend_pairs(filter_params(filters)?);

        let request = self
            .request(Method::GET, url)
            .header("Accept-Profile", &self.schema)
            .header("Prefer", "count=exact");
        let (headers, _) = self.send(request).await?;

        headers
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(content_range_total)
            .ok_or_else(|| StoreError::Decode(format!("missing exact count for {}", table)))
    }
}

#[async_trait]
impl Procedures for RestStore {
    async fn invoke(&self, procedure: &str) -> Result<Value, StoreError> {
        validate_identifier(procedure)?;
        let url = self.endpoint(&format!("rest/v1/rpc/{}", procedure))?;
        let request = self
            .request(Method::POST, url)
            .header("Content-Profile", &self.schema)
            .json(&json!({}));
        let (_, body) = self.send(request).await?;
        Ok(body)
    }
}

#[async_trait]
impl UserDirectory for RestStore {
    async fn list_principals(&self) -> Result<Vec<Principal>, StoreError> {
        let mut principals = Vec::new();

        for page in 1..=MAX_PRINCIPAL_PAGES {
            let mut url = self.endpoint("auth/v1/admin/users")?;
            url.query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &self.principal_page_size.to_string());

            let (_, body) = self.send(self.request(Method::GET, url)).await?;
            let batch: PrincipalPage = serde_json::from_value(body)?;
            let fetched = batch.users.len();
            principals.extend(batch.users);

            if fetched < self.principal_page_size as usize {
                break;
            }
        }

        Ok(principals)
    }

    async fn get_principal(&self, access_token: &str) -> Result<Principal, StoreError> {
        let url = self.endpoint("auth/v1/user")?;
        let (_, body) = self.send(self.request_as(Method::GET, url, access_token)).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, StoreError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, StoreError> {
        let url = self.endpoint("auth/v1/signup")?;
        let request = self
            .request(Method::POST, url)
            .json(&json!({ "email": email, "password": password }));
        let (_, body) = self.send(request).await?;

        if body.get("access_token").is_some() {
            return Ok(SignUpOutcome::SignedIn(serde_json::from_value(body)?));
        }

        // Unconfirmed sign-ups return the user either bare or wrapped
        let user = match body.get("user") {
            Some(user) => user.clone(),
            None => body,
        };
        Ok(SignUpOutcome::ConfirmationPending(serde_json::from_value(user)?))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        let url = self.endpoint("auth/v1/logout")?;
        self.send(self.request_as(Method::POST, url, access_token)).await?;
        Ok(())
    }
}

impl RemoteStore for RestStore {
    fn as_principal(&self, access_token: &str) -> Arc<dyn RemoteStore> {
        let mut scoped = self.clone();
        scoped.bearer = access_token.to_string();
        Arc::new(scoped)
    }
}
