use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Election, ElectionInput, ElectionStatus, EngineError, ResultEngine, elections,
    util::{non_blank, parse_date, parse_election_id, parse_optional_election_id, required_text},
};

use super::{Engine, ballots::load_election, with_tx};

impl Engine {
    /// All elections, most recent start date first.
    pub async fn list_elections(&self) -> ResultEngine<Vec<Election>> {
        let elections = elections::Entity::find()
            .order_by_desc(elections::Column::StartDate)
            .order_by_desc(elections::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Election::from)
            .collect();
        Ok(elections)
    }

    pub async fn election(&self, election_id: i32) -> ResultEngine<Election> {
        load_election(&self.database, election_id).await
    }

    /// Create an election, or update it when `input.election_id` is set.
    ///
    /// A blank status means `upcoming` for a new election and leaves the
    /// current status untouched on update.
    pub async fn save_election(&self, input: ElectionInput) -> ResultEngine<Election> {
        let election_id = parse_optional_election_id(input.election_id.as_deref())?;
        let title = required_text(input.title.as_deref(), "Title")?;
        let start_date = parse_date(input.start_date.as_deref(), "Start date")?;
        let end_date = parse_date(input.end_date.as_deref(), "End date")?;
        if start_date > end_date {
            return Err(EngineError::DateRangeInvalid);
        }
        let status = non_blank(input.status.as_deref())
            .map(ElectionStatus::try_from)
            .transpose()?;
        let description = non_blank(input.description.as_deref()).map(ToString::to_string);
        let positions = non_blank(input.positions.as_deref()).map(ToString::to_string);

        with_tx!(self, |db_tx| {
            let model = match election_id {
                Some(id) => {
                    let existing = elections::Entity::find_by_id(id)
                        .one(&db_tx)
                        .await?
                        .ok_or(EngineError::ElectionNotFound(id))?;
                    let mut active: elections::ActiveModel = existing.into();
                    active.title = ActiveValue::Set(title);
                    active.description = ActiveValue::Set(description);
                    active.start_date = ActiveValue::Set(start_date);
                    active.end_date = ActiveValue::Set(end_date);
                    active.positions = ActiveValue::Set(positions);
                    if let Some(status) = status {
                        active.status = ActiveValue::Set(status.as_str().to_string());
                    }
                    active.update(&db_tx).await?
                }
                None => {
                    elections::ActiveModel {
                        title: ActiveValue::Set(title),
                        description: ActiveValue::Set(description),
                        start_date: ActiveValue::Set(start_date),
                        end_date: ActiveValue::Set(end_date),
                        status: ActiveValue::Set(status.unwrap_or_default().as_str().to_string()),
                        positions: ActiveValue::Set(positions),
                        ..Default::default()
                    }
                    .insert(&db_tx)
                    .await?
                }
            };
            Ok(Election::from(model))
        })
    }

    /// Delete an election by its raw form id.
    ///
    /// Its candidates stay with their election cleared; its ballots go.
    pub async fn delete_election(&self, election_id: Option<&str>) -> ResultEngine<Election> {
        let election_id = parse_election_id(election_id)?;

        with_tx!(self, |db_tx| {
            let model = elections::Entity::find_by_id(election_id)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::ElectionNotFound(election_id))?;
            elections::Entity::delete_by_id(election_id)
                .exec(&db_tx)
                .await?;
            Ok(Election::from(model))
        })
    }
}
