//! Sessions repository.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::auth::models::{NewSession, Session, SessionUuid};

const FIND_ACTIVE_SESSION_SQL: &str = include_str!("sql/find_active_session.sql");
const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgSessionsRepository {
    pool: PgPool,
}

impl PgSessionsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn find_active_session(
        &self,
        token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<Session>, sqlx::Error> {
        query_as::<Postgres, Session>(FIND_ACTIVE_SESSION_SQL)
            .bind(token_hash)
            .bind(SqlxTimestamp::from(now))
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn create_session(&self, session: &NewSession) -> Result<Session, sqlx::Error> {
        query_as::<Postgres, Session>(CREATE_SESSION_SQL)
            .bind(session.uuid.into_uuid())
            .bind(session.user_uuid.into_uuid())
            .bind(&session.token_hash)
            .bind(session.expires_at.map(SqlxTimestamp::from))
            .fetch_one(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Session {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SessionUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: row.try_get::<Uuid, _>("user_uuid")?.into(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
