//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;

use crate::auth::{
    AuthServiceError, generate_session_token, hash_session_token,
    models::{IssuedSession, NewSession, SessionUuid, UserUuid},
    repository::PgSessionsRepository,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgSessionsRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgSessionsRepository::new(pool),
        }
    }

    /// Issue a new session token for the given user.
    ///
    /// The raw token is only returned here; storage keeps its hash.
    pub async fn issue_session(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedSession, AuthServiceError> {
        let token = generate_session_token();

        let session = self
            .repository
            .create_session(&NewSession {
                uuid: SessionUuid::new(),
                user_uuid: user,
                token_hash: token.hash(),
                expires_at,
            })
            .await?;

        Ok(IssuedSession { token, session })
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserUuid, AuthServiceError> {
        let session = self
            .repository
            .find_active_session(&hash_session_token(bearer_token), Timestamp::now())
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        Ok(session.user_uuid)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer session token to the user it belongs to.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserUuid, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan};
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn issued_token_resolves_to_its_user() -> TestResult {
        let ctx = TestContext::new().await;

        let issued = ctx.auth.issue_session(ctx.user_uuid, None).await?;

        assert!(!issued.token.as_str().is_empty());
        assert_eq!(issued.session.user_uuid, ctx.user_uuid);
        assert_eq!(ctx.auth.authenticate_bearer(issued.token.as_str()).await?, ctx.user_uuid);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn unknown_token_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.authenticate_bearer("sf_not_a_real_token").await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn expired_session_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let expired_at = Timestamp::now().checked_sub(1.hour())?;

        let issued = ctx.auth.issue_session(ctx.user_uuid, Some(expired_at)).await?;

        let result = ctx.auth.authenticate_bearer(issued.token.as_str()).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
