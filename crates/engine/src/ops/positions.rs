use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Position, PositionInput, ResultEngine, positions,
    util::{non_blank, parse_optional_id, parse_positive_or_one, parse_required_id, required_text},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn list_positions(&self) -> ResultEngine<Vec<Position>> {
        let positions = positions::Entity::find()
            .order_by_asc(positions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Position::from)
            .collect();
        Ok(positions)
    }

    /// Create a position, or update it when `input.position_id` is set.
    ///
    /// Blank `max_winners` and `votes_allowed` default to 1.
    pub async fn save_position(&self, input: PositionInput) -> ResultEngine<Position> {
        let position_id = parse_optional_id(input.position_id.as_deref(), "position")?;
        let title = required_text(input.title.as_deref(), "Title")?;
        let max_winners = parse_positive_or_one(input.max_winners.as_deref(), "Max winners")?;
        let votes_allowed = parse_positive_or_one(input.votes_allowed.as_deref(), "Votes allowed")?;
        let description = non_blank(input.description.as_deref()).map(ToString::to_string);

        with_tx!(self, |db_tx| {
            let model = match position_id {
                Some(id) => {
                    let existing = positions::Entity::find_by_id(id)
                        .one(&db_tx)
                        .await?
                        .ok_or(EngineError::PositionNotFound(id))?;
                    let mut active: positions::ActiveModel = existing.into();
                    active.title = ActiveValue::Set(title);
                    active.description = ActiveValue::Set(description);
                    active.max_winners = ActiveValue::Set(max_winners);
                    active.votes_allowed = ActiveValue::Set(votes_allowed);
                    active.update(&db_tx).await?
                }
                None => {
                    positions::ActiveModel {
                        title: ActiveValue::Set(title),
                        description: ActiveValue::Set(description),
                        max_winners: ActiveValue::Set(max_winners),
                        votes_allowed: ActiveValue::Set(votes_allowed),
                        ..Default::default()
                    }
                    .insert(&db_tx)
                    .await?
                }
            };
            Ok(Position::from(model))
        })
    }

    /// Delete a position; its candidates move to the "Other" group.
    pub async fn delete_position(&self, position_id: Option<&str>) -> ResultEngine<Position> {
        let position_id = parse_required_id(position_id, "position")?;

        with_tx!(self, |db_tx| {
            let model = positions::Entity::find_by_id(position_id)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::PositionNotFound(position_id))?;
            positions::Entity::delete_by_id(position_id)
                .exec(&db_tx)
                .await?;
            Ok(Position::from(model))
        })
    }
}
