use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Structured diagnostic returned by the remote store. PostgREST fills all
/// four fields; the auth service usually only sends a message and a code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Normalize an error body from either PostgREST
    /// (`message`/`code`/`details`/`hint`) or the auth service
    /// (`msg`/`error_code`, or OAuth-style `error`/`error_description`).
    pub fn from_body(status: u16, body: &Value) -> Self {
        let text = |key: &str| -> Option<String> {
            match body.get(key)? {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        };

        let message = text("message")
            .or_else(|| text("msg"))
            .or_else(|| text("error_description"))
            .or_else(|| text("error"))
            .unwrap_or_else(|| format!("remote store returned HTTP {}", status));

        Self {
            message,
            code: text("error_code").or_else(|| text("code")),
            details: text("details"),
            hint: text("hint"),
        }
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Any failure talking to the remote store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{payload}")]
    Remote { status: u16, payload: ErrorPayload },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl StoreError {
    pub fn remote(status: u16, payload: ErrorPayload) -> Self {
        StoreError::Remote { status, payload }
    }

    /// Diagnostic payload for rendering, whatever the failure kind.
    pub fn payload(&self) -> ErrorPayload {
        match self {
            StoreError::Remote { payload, .. } => payload.clone(),
            StoreError::Transport(err) => {
                let code = if err.is_timeout() { "TIMEOUT" } else { "TRANSPORT" };
                ErrorPayload::new(err.to_string()).with_code(code)
            }
            StoreError::Decode(msg) => ErrorPayload::new(msg.clone()).with_code("DECODE"),
            StoreError::InvalidQuery(msg) => ErrorPayload::new(msg.clone()).with_code("INVALID_QUERY"),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Remote { status, .. } => Some(*status),
            StoreError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The store rejected the credentials used for the call.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}
