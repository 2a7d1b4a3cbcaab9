//! Auth data models.

use jiff::Timestamp;

use crate::{auth::SessionToken, uuids::TypedUuid};

/// Shopper identity marker. Users live with the external identity provider;
/// only their UUID is stored here.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Session UUID
pub type SessionUuid = TypedUuid<Session>;

/// Session metadata persisted in storage.
#[derive(Debug, Clone)]
pub struct Session {
    pub uuid: SessionUuid,
    pub user_uuid: UserUuid,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

/// New session persistence payload.
#[derive(Debug, Clone)]
pub(crate) struct NewSession {
    pub uuid: SessionUuid,
    pub user_uuid: UserUuid,
    pub token_hash: String,
    pub expires_at: Option<Timestamp>,
}

/// Session issuance result with the one-time raw token.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub session: Session,
}
