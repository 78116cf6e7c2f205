//! Refresh-token sessions backing `/auth/refresh` and `/auth/logout`.

use pmo_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One issued refresh token. The plaintext token is never stored.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A session about to be issued on login or refresh.
#[derive(Debug)]
pub struct NewSession<'a> {
    pub user_id: DbId,
    pub refresh_token_hash: &'a str,
    pub expires_at: Timestamp,
    pub user_agent: Option<&'a str>,
    pub ip_address: Option<&'a str>,
}
