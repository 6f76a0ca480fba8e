use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-directory record. Staff sessions resolve to one of these, and the
/// debug page and CLI list them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn display_email(&self) -> &str {
        self.email.as_deref().filter(|e| !e.is_empty()).unwrap_or("No email")
    }
}

/// An authenticated session as issued by the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is rejected.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(rename = "user")]
    pub principal: Principal,
}

/// Result of a sign-up request: either the directory confirmed the account
/// immediately and opened a session, or it is waiting on e-mail confirmation.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationPending(Principal),
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PrincipalPage {
    #[serde(default)]
    pub users: Vec<Principal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_reads_token_response() {
        let body = json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_700_000_000,
            "refresh_token": "rt",
            "user": {
                "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
                "email": "ops@example.com",
                "created_at": "2024-03-01T10:00:00.123456Z",
                "aud": "authenticated"
            }
        });
        let session: Session = serde_json::from_value(body).unwrap();
        assert_eq!(session.refresh_token.as_deref(), Some("rt"));
        assert_eq!(session.expires_at, Some(1_700_000_000));
        assert_eq!(session.principal.display_email(), "ops@example.com");
    }

    #[test]
    fn principal_without_email() {
        let principal: Principal =
            serde_json::from_value(json!({ "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff", "email": "" })).unwrap();
        assert_eq!(principal.display_email(), "No email");
        assert!(principal.created_at.is_none());
    }
}
