#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use cloud_admin::config::AppConfig;
use cloud_admin::store::{
    ErrorPayload, FilterOp, Principal, Procedures, RemoteStore, SelectQuery, Session, SignUpOutcome, StoreError,
    TableQuery, UserDirectory,
};
use cloud_admin::AppState;

/// Every remote call the fake saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Select { table: String, scope: Option<String> },
    Count(String),
    Invoke(String),
    ListPrincipals,
    GetPrincipal(String),
    SignIn(String),
    Refresh(String),
    SignUp(String),
    SignOut(String),
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    // None: the listing procedure is not installed
    tables: Option<Vec<String>>,
    rows: HashMap<String, Result<Vec<Value>, ErrorPayload>>,
    counts: HashMap<String, Result<u64, ErrorPayload>>,
    admins: HashSet<Uuid>,
    allow_list_error: Option<ErrorPayload>,
    sessions: HashMap<String, Principal>,
    refresh: HashMap<String, Session>,
    passwords: HashMap<String, (String, Session)>,
    principals: Vec<Principal>,
    directory_down: bool,
}

/// In-memory stand-in for the hosted store. Clones share state, so a handle
/// kept by the test sees the calls made through the app.
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<FakeState>>,
    scope: Option<String>,
}

fn missing_relation(table: &str) -> ErrorPayload {
    ErrorPayload {
        message: format!("relation \"public.{}\" does not exist", table),
        code: Some("42P01".into()),
        details: None,
        hint: None,
    }
}

fn unauthorized() -> StoreError {
    StoreError::remote(401, ErrorPayload::new("invalid JWT").with_code("bad_jwt"))
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().expect("fake store lock")
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }

    pub fn with_tables(self, tables: &[&str]) -> Self {
        self.state().tables = Some(tables.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.state().rows.insert(table.to_string(), Ok(rows));
        self
    }

    pub fn with_select_error(self, table: &str, payload: ErrorPayload) -> Self {
        self.state().rows.insert(table.to_string(), Err(payload));
        self
    }

    pub fn with_count(self, table: &str, count: u64) -> Self {
        self.state().counts.insert(table.to_string(), Ok(count));
        self
    }

    pub fn with_count_error(self, table: &str, payload: ErrorPayload) -> Self {
        self.state().counts.insert(table.to_string(), Err(payload));
        self
    }

    /// A live session for `principal` under `access_token`.
    pub fn with_session(self, access_token: &str, principal: &Principal) -> Self {
        self.state().sessions.insert(access_token.to_string(), principal.clone());
        self
    }

    pub fn with_admin(self, principal: &Principal) -> Self {
        self.state().admins.insert(principal.id);
        self
    }

    pub fn with_refresh(self, refresh_token: &str, session: Session) -> Self {
        self.state().refresh.insert(refresh_token.to_string(), session);
        self
    }

    pub fn with_password(self, email: &str, password: &str, session: Session) -> Self {
        self.state()
            .passwords
            .insert(email.to_string(), (password.to_string(), session));
        self
    }

    pub fn with_principals(self, principals: Vec<Principal>) -> Self {
        self.state().principals = principals;
        self
    }

    pub fn allow_list_fails(self, payload: ErrorPayload) -> Self {
        self.state().allow_list_error = Some(payload);
        self
    }

    /// The auth directory answers every session lookup with a 503.
    pub fn directory_unavailable(self) -> Self {
        self.state().directory_down = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn selects_of(&self, table: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Select { table: t, .. } if t == table))
            .count()
    }

    pub fn invokes_of(&self, procedure: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Invoke(p) if p == procedure))
            .count()
    }

    pub fn counts_of(&self, table: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Count(t) if t == table))
            .count()
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SignOut(token) => Some(token),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TableQuery for FakeStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, StoreError> {
        self.record(Call::Select {
            table: query.table.clone(),
            scope: self.scope.clone(),
        });
        let state = self.state();

        if query.table == "admin_users" {
            if let Some(payload) = &state.allow_list_error {
                return Err(StoreError::remote(400, payload.clone()));
            }
            let wanted = query
                .filters
                .iter()
                .find(|f| f.column == "id" && f.op == FilterOp::Eq)
                .and_then(|f| Uuid::parse_str(&f.value).ok());
            return Ok(match wanted {
                Some(id) if state.admins.contains(&id) => vec![json!({ "id": id })],
                _ => vec![],
            });
        }

        match state.rows.get(&query.table) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(payload)) => Err(StoreError::remote(400, payload.clone())),
            None if state.tables.as_ref().is_some_and(|t| t.contains(&query.table)) => Ok(vec![]),
            None => Err(StoreError::remote(404, missing_relation(&query.table))),
        }
    }

    async fn count(&self, table: &str, _filters: &[cloud_admin::store::Filter]) -> Result<u64, StoreError> {
        self.record(Call::Count(table.to_string()));
        let state = self.state();
        match state.counts.get(table) {
            Some(Ok(n)) => Ok(*n),
            Some(Err(payload)) => Err(StoreError::remote(400, payload.clone())),
            None => match state.rows.get(table) {
                Some(Ok(rows)) => Ok(rows.len() as u64),
                _ => Err(StoreError::remote(404, missing_relation(table))),
            },
        }
    }
}

#[async_trait]
impl Procedures for FakeStore {
    async fn invoke(&self, procedure: &str) -> Result<Value, StoreError> {
        self.record(Call::Invoke(procedure.to_string()));
        match (&self.state().tables, procedure) {
            (Some(tables), "list_public_tables") => Ok(Value::Array(
                tables.iter().map(|t| json!({ "table_name": t })).collect(),
            )),
            _ => Err(StoreError::remote(
                404,
                ErrorPayload {
                    message: format!("Could not find the function public.{} without parameters", procedure),
                    code: Some("PGRST202".into()),
                    details: None,
                    hint: None,
                },
            )),
        }
    }
}

#[async_trait]
impl UserDirectory for FakeStore {
    async fn list_principals(&self) -> Result<Vec<Principal>, StoreError> {
        self.record(Call::ListPrincipals);
        Ok(self.state().principals.clone())
    }

    async fn get_principal(&self, access_token: &str) -> Result<Principal, StoreError> {
        self.record(Call::GetPrincipal(access_token.to_string()));
        let state = self.state();
        if state.directory_down {
            return Err(StoreError::remote(503, ErrorPayload::new("upstream connect error")));
        }
        state.sessions.get(access_token).cloned().ok_or_else(unauthorized)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        self.record(Call::SignIn(email.to_string()));
        match self.state().passwords.get(email) {
            Some((expected, session)) if expected == password => Ok(session.clone()),
            _ => Err(StoreError::remote(
                400,
                ErrorPayload::new("Invalid login credentials").with_code("invalid_credentials"),
            )),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, StoreError> {
        self.record(Call::Refresh(refresh_token.to_string()));
        let mut state = self.state();
        let session = state.refresh.get(refresh_token).cloned().ok_or_else(|| {
            StoreError::remote(400, ErrorPayload::new("Invalid Refresh Token").with_code("refresh_token_not_found"))
        })?;
        state
            .sessions
            .insert(session.access_token.clone(), session.principal.clone());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome, StoreError> {
        self.record(Call::SignUp(email.to_string()));
        Ok(SignUpOutcome::ConfirmationPending(principal(email)))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        self.record(Call::SignOut(access_token.to_string()));
        self.state().sessions.remove(access_token);
        Ok(())
    }
}

impl RemoteStore for FakeStore {
    fn as_principal(&self, access_token: &str) -> Arc<dyn RemoteStore> {
        Arc::new(FakeStore {
            inner: self.inner.clone(),
            scope: Some(access_token.to_string()),
        })
    }
}

pub fn principal(email: &str) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
        created_at: None,
    }
}

pub fn session(access_token: &str, refresh_token: &str, principal: &Principal) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: Some(refresh_token.to_string()),
        expires_at: None,
        principal: principal.clone(),
    }
}

/// Identity store with one allow-listed admin signed in as `admin-token`.
pub fn identity_with_admin() -> (FakeStore, Principal) {
    let admin = principal("ops@example.com");
    let identity = FakeStore::new()
        .with_session("admin-token", &admin)
        .with_admin(&admin);
    (identity, admin)
}

pub const ADMIN_COOKIE: &str = "admin_access_token=admin-token; admin_refresh_token=admin-refresh";

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None)
}

pub fn app_with(service: Option<FakeStore>, identity: Option<FakeStore>) -> Router {
    let service = service.map(|s| Arc::new(s) as Arc<dyn RemoteStore>);
    let identity = identity.map(|s| Arc::new(s) as Arc<dyn RemoteStore>);
    cloud_admin::app(AppState::new(test_config(), service, identity))
}

pub struct Page {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Page {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }
}

/// Drive one request through the router.
pub async fn get(app: Router, path: &str, cookie: Option<&str>) -> Result<Page> {
    let mut request = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let response = app
        .oneshot(request.body(Body::empty())?)
        .await
        .context("router failed")?;

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(Page {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec())?,
    })
}

/// Serve `app` on a free local port; returns its base URL.
pub async fn serve(app: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

/// Client that reports redirects instead of following them.
pub fn client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}
