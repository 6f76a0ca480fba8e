//! Remote data store: the hosted Postgres service reached over its REST
//! surface. The rest of the crate only sees the traits below, so pages and
//! the authorization gate run unchanged against [`RestStore`] or an
//! in-memory double.

pub mod error;
pub mod models;
pub mod query;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use error::{ErrorPayload, StoreError};
pub use models::{Principal, Session, SignUpOutcome};
pub use query::{Filter, FilterOp, Order, SelectQuery, SortDirection};
pub use rest::RestStore;

/// Generic table reads within the configured schema namespace.
#[async_trait]
pub trait TableQuery: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Value>, StoreError>;

    /// Exact row count; no row payload is transferred.
    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError>;
}

/// Named remote procedures.
#[async_trait]
pub trait Procedures: Send + Sync {
    async fn invoke(&self, procedure: &str) -> Result<Value, StoreError>;
}

/// Principal records and sessions, independent of the queryable tables.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every principal in the directory. Needs the privileged key.
    async fn list_principals(&self) -> Result<Vec<Principal>, StoreError>;

    /// Resolve the principal behind an access token.
    async fn get_principal(&self, access_token: &str) -> Result<Principal, StoreError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, StoreError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, StoreError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, StoreError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError>;
}

pub trait RemoteStore: TableQuery + Procedures + UserDirectory {
    /// A handle on the same store whose requests carry the principal's access
    /// token, so the store's row-level policies apply to that principal.
    fn as_principal(&self, access_token: &str) -> Arc<dyn RemoteStore>;
}
