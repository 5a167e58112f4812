use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    Admin, EngineError, ResultEngine, admins,
    util::{is_unique_violation, required_secret, required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Check an administrator's credentials.
    pub async fn authenticate_admin(&self, username: &str, password: &str) -> ResultEngine<Admin> {
        let username = required_text(Some(username), "Username")?;
        let password = required_secret(Some(password), "Password")?;

        let model = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.database)
            .await?;

        let verified = self
            .passwords
            .verify(&password, model.as_ref().map(|m| m.password_hash.as_str()));
        match model {
            Some(model) if verified => Ok(Admin::from(model)),
            _ => Err(EngineError::InvalidCredentials),
        }
    }

    /// Create an administrator account.
    pub async fn create_admin(&self, username: &str, password: &str) -> ResultEngine<Admin> {
        let username = required_text(Some(username), "Username")?;
        let password = required_secret(Some(password), "Password")?;
        let password_hash = self.passwords.hash(&password)?;

        with_tx!(self, |db_tx| {
            let exists = admins::Entity::find()
                .filter(admins::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::DuplicateUsername(username));
            }

            let model = admins::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password_hash: ActiveValue::Set(password_hash),
                ..Default::default()
            }
            .insert(&db_tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    EngineError::DuplicateUsername(username.clone())
                } else {
                    err.into()
                }
            })?;
            Ok(Admin::from(model))
        })
    }

    /// Create the first administrator when the table is empty.
    ///
    /// Returns `None` when an administrator already exists.
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> ResultEngine<Option<Admin>> {
        if admins::Entity::find().count(&self.database).await? > 0 {
            return Ok(None);
        }
        self.create_admin(username, password).await.map(Some)
    }

    pub async fn find_admin(&self, admin_id: i32) -> ResultEngine<Option<Admin>> {
        Ok(admins::Entity::find_by_id(admin_id)
            .one(&self.database)
            .await?
            .map(Admin::from))
    }
}
