use sea_orm::{EntityTrait, PaginatorTrait};

use crate::{ResultEngine, ballots, candidates, elections, positions, voters};

use super::Engine;

/// Row counts shown on the admin landing page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub voters: u64,
    pub elections: u64,
    pub positions: u64,
    pub candidates: u64,
    pub ballots: u64,
}

impl Engine {
    pub async fn dashboard(&self) -> ResultEngine<Dashboard> {
        Ok(Dashboard {
            voters: voters::Entity::find().count(&self.database).await?,
            elections: elections::Entity::find().count(&self.database).await?,
            positions: positions::Entity::find().count(&self.database).await?,
            candidates: candidates::Entity::find().count(&self.database).await?,
            ballots: ballots::Entity::find().count(&self.database).await?,
        })
    }
}
