use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{Admin, Principal, ResultEngine, Session, Voter, sessions};

use super::Engine;

impl Engine {
    /// Issue a new opaque session token for `principal`.
    pub async fn open_session(&self, principal: Principal) -> ResultEngine<Session> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;
        let token = Uuid::new_v4().to_string();

        sessions::ActiveModel {
            token: ActiveValue::Set(token.clone()),
            role: ActiveValue::Set(principal.role().to_string()),
            subject_id: ActiveValue::Set(principal.subject_id()),
            created_at: ActiveValue::Set(now),
            expires_at: ActiveValue::Set(expires_at),
        }
        .insert(&self.database)
        .await?;

        Ok(Session {
            token,
            principal,
            expires_at,
        })
    }

    /// Resolve a token to its principal. Expired sessions are removed and
    /// resolve to `None`.
    pub async fn resolve_session(&self, token: &str) -> ResultEngine<Option<Principal>> {
        let Some(model) = sessions::Entity::find_by_id(token.to_string())
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        if model.expires_at <= Utc::now() {
            sessions::Entity::delete_by_id(model.token)
                .exec(&self.database)
                .await?;
            return Ok(None);
        }

        Ok(Principal::from_row(&model.role, model.subject_id))
    }

    /// Voter behind a session, if the session is a live voter session.
    pub async fn session_voter(&self, token: &str) -> ResultEngine<Option<Voter>> {
        match self.resolve_session(token).await? {
            Some(Principal::Voter(id)) => self.find_voter(id).await,
            _ => Ok(None),
        }
    }

    /// Administrator behind a session, if the session is a live admin session.
    pub async fn session_admin(&self, token: &str) -> ResultEngine<Option<Admin>> {
        match self.resolve_session(token).await? {
            Some(Principal::Admin(id)) => self.find_admin(id).await,
            _ => Ok(None),
        }
    }

    /// Forget a session. Unknown tokens are ignored.
    pub async fn close_session(&self, token: &str) -> ResultEngine<()> {
        sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Delete every expired session, returning how many were removed.
    pub async fn purge_expired_sessions(&self) -> ResultEngine<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }
}
