use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, NewVoter, ResultEngine, Voter,
    util::{is_unique_violation, non_blank, required_secret, required_text},
    voters,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new voter.
    ///
    /// Checks run in order: required fields, password confirmation, school id
    /// uniqueness. Only a salted hash of the password is stored.
    pub async fn register_voter(&self, input: NewVoter) -> ResultEngine<Voter> {
        let school_id = required_text(input.school_id.as_deref(), "School ID")?;
        let full_name = required_text(input.full_name.as_deref(), "Full name")?;
        let password = required_secret(input.password.as_deref(), "Password")?;
        let confirm = required_secret(input.confirm_password.as_deref(), "Password confirmation")?;
        if password != confirm {
            return Err(EngineError::PasswordMismatch);
        }
        let grade = non_blank(input.grade.as_deref()).map(ToString::to_string);
        let password_hash = self.passwords.hash(&password)?;

        with_tx!(self, |db_tx| {
            let exists = voters::Entity::find()
                .filter(voters::Column::SchoolId.eq(school_id.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::DuplicateSchoolId(school_id));
            }

            let model = voters::ActiveModel {
                school_id: ActiveValue::Set(school_id.clone()),
                full_name: ActiveValue::Set(full_name),
                grade: ActiveValue::Set(grade),
                password_hash: ActiveValue::Set(password_hash),
                ..Default::default()
            }
            .insert(&db_tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    EngineError::DuplicateSchoolId(school_id.clone())
                } else {
                    err.into()
                }
            })?;

            Ok(Voter::from(model))
        })
    }

    /// Check a voter's credentials.
    ///
    /// Unknown school ids and wrong passwords fail with the same
    /// [`EngineError::InvalidCredentials`].
    pub async fn authenticate_voter(&self, school_id: &str, password: &str) -> ResultEngine<Voter> {
        let school_id = required_text(Some(school_id), "School ID")?;
        let password = required_secret(Some(password), "Password")?;

        let model = voters::Entity::find()
            .filter(voters::Column::SchoolId.eq(school_id))
            .one(&self.database)
            .await?;

        let verified = self
            .passwords
            .verify(&password, model.as_ref().map(|m| m.password_hash.as_str()));
        match model {
            Some(model) if verified => Ok(Voter::from(model)),
            _ => Err(EngineError::InvalidCredentials),
        }
    }

    /// All voters ordered by full name.
    pub async fn list_voters(&self) -> ResultEngine<Vec<Voter>> {
        let voters = voters::Entity::find()
            .order_by_asc(voters::Column::FullName)
            .order_by_asc(voters::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Voter::from)
            .collect();
        Ok(voters)
    }

    pub async fn find_voter(&self, voter_id: i32) -> ResultEngine<Option<Voter>> {
        Ok(voters::Entity::find_by_id(voter_id)
            .one(&self.database)
            .await?
            .map(Voter::from))
    }
}
