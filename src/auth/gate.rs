use tracing::{debug, info, warn};

use super::SessionTokens;
use crate::store::{Principal, RemoteStore, SelectQuery, Session, StoreError};

/// Table whose rows grant access to the dashboard, keyed by principal id.
pub const ALLOW_LIST_TABLE: &str = "admin_users";

/// Reason code attached to the login redirect after a forced sign-out.
pub const NOT_AUTHORIZED: &str = "not_authorized";

/// Terminal states of a gate check.
#[derive(Debug)]
pub enum GateOutcome {
    /// No session, or the directory no longer recognises it.
    SessionMissing,
    /// Valid session, not on the allow-list. The session has already been
    /// revoked by the time this is returned.
    Unauthorized { principal: Principal },
    /// Render the page. `refreshed` carries a renewed session that must be
    /// written back to the browser.
    Authorized {
        principal: Principal,
        refreshed: Option<Session>,
    },
    /// The directory could not be reached. The session is left alone so the
    /// next request can retry it.
    StoreUnavailable(StoreError),
}

struct ResolvedSession {
    principal: Principal,
    access_token: String,
    refreshed: Option<Session>,
}

/// Admin-only gate in front of every dashboard page.
pub struct AuthorizationGate<'a, S: RemoteStore + ?Sized> {
    identity: &'a S,
}

impl<'a, S: RemoteStore + ?Sized> AuthorizationGate<'a, S> {
    pub fn new(identity: &'a S) -> Self {
        Self { identity }
    }

    pub async fn check(&self, tokens: Option<SessionTokens>) -> GateOutcome {
        let Some(tokens) = tokens else {
            debug!("Gate: no session cookie");
            return GateOutcome::SessionMissing;
        };

        let session = match self.resolve_session(&tokens).await {
            Ok(Some(session)) => session,
            Ok(None) => return GateOutcome::SessionMissing,
            Err(e) => {
                warn!("Gate: directory unavailable, keeping session: {}", e);
                return GateOutcome::StoreUnavailable(e);
            }
        };

        let query = SelectQuery::from(ALLOW_LIST_TABLE)
            .columns(["id"])
            .eq("id", session.principal.id.to_string())
            .limit(1);

        let allowed = self
            .identity
            .as_principal(&session.access_token)
            .select(&query)
            .await;

        match allowed {
            Ok(rows) if !rows.is_empty() => {
                debug!("Gate: {} is allow-listed", session.principal.id);
                GateOutcome::Authorized {
                    principal: session.principal,
                    refreshed: session.refreshed,
                }
            }
            Ok(_) => {
                warn!("Gate: {} has a session but no {} row", session.principal.id, ALLOW_LIST_TABLE);
                self.revoke(&session.access_token).await;
                GateOutcome::Unauthorized { principal: session.principal }
            }
            Err(e) => {
                warn!(
                    "Gate: allow-list lookup for {} failed, revoking session: {}",
                    session.principal.id, e
                );
                self.revoke(&session.access_token).await;
                GateOutcome::Unauthorized { principal: session.principal }
            }
        }
    }

    /// Resolve the principal behind the cookies, renewing the session once
    /// through the refresh token when the access token is spent.
    /// `Ok(None)` means the session is gone for good; `Err` means the
    /// directory itself failed and the answer is unknown.
    async fn resolve_session(&self, tokens: &SessionTokens) -> Result<Option<ResolvedSession>, StoreError> {
        if !tokens.access_token_expired() {
            match self.identity.get_principal(&tokens.access_token).await {
                Ok(principal) => {
                    return Ok(Some(ResolvedSession {
                        principal,
                        access_token: tokens.access_token.clone(),
                        refreshed: None,
                    }))
                }
                Err(e) if e.is_unauthorized() => debug!("Gate: access token rejected: {}", e),
                Err(e) if is_outage(&e) => return Err(e),
                Err(e) => {
                    debug!("Gate: session not recognised: {}", e);
                    return Ok(None);
                }
            }
        }

        let Some(refresh_token) = tokens.refresh_token.as_deref() else {
            return Ok(None);
        };
        match self.identity.refresh_session(refresh_token).await {
            Ok(session) => {
                info!("Gate: refreshed session for {}", session.principal.id);
                Ok(Some(ResolvedSession {
                    principal: session.principal.clone(),
                    access_token: session.access_token.clone(),
                    refreshed: Some(session),
                }))
            }
            Err(e) if is_outage(&e) => Err(e),
            Err(e) => {
                debug!("Gate: refresh failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn revoke(&self, access_token: &str) {
        if let Err(e) = self.identity.sign_out(access_token).await {
            // Cookies are cleared regardless; the remote token just lives
            // until it expires.
            warn!("Gate: remote sign-out failed: {}", e);
        }
    }
}

// Transport failures and 5xx answers say nothing about the session itself.
fn is_outage(e: &StoreError) -> bool {
    e.status().map_or(true, |status| status >= 500)
}
