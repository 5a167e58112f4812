//! Persisted ballots.
//!
//! A ballot is written once per (voter, election); each selected candidate is
//! stored as a `votes` row hanging off the ballot.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Ballots {
    Table,
    Id,
    VoterId,
    ElectionId,
    CastAt,
}

#[derive(Iden)]
enum Votes {
    Table,
    Id,
    BallotId,
    CandidateId,
    PositionId,
}

#[derive(Iden)]
enum Voters {
    Table,
    Id,
}

#[derive(Iden)]
enum Elections {
    Table,
    Id,
}

#[derive(Iden)]
enum Candidates {
    Table,
    Id,
}

#[derive(Iden)]
enum Positions {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ballots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ballots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ballots::VoterId).integer().not_null())
                    .col(ColumnDef::new(Ballots::ElectionId).integer().not_null())
                    .col(ColumnDef::new(Ballots::CastAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ballots-voter_id")
                            .from(Ballots::Table, Ballots::VoterId)
                            .to(Voters::Table, Voters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ballots-election_id")
                            .from(Ballots::Table, Ballots::ElectionId)
                            .to(Elections::Table, Elections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One ballot per voter per election.
        manager
            .create_index(
                Index::create()
                    .name("uidx-ballots-voter_id-election_id")
                    .table(Ballots::Table)
                    .col(Ballots::VoterId)
                    .col(Ballots::ElectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Votes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Votes::BallotId).integer().not_null())
                    .col(ColumnDef::new(Votes::CandidateId).integer().not_null())
                    .col(ColumnDef::new(Votes::PositionId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-votes-ballot_id")
                            .from(Votes::Table, Votes::BallotId)
                            .to(Ballots::Table, Ballots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-votes-candidate_id")
                            .from(Votes::Table, Votes::CandidateId)
                            .to(Candidates::Table, Candidates::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-votes-position_id")
                            .from(Votes::Table, Votes::PositionId)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-votes-ballot_id-candidate_id")
                    .table(Votes::Table)
                    .col(Votes::BallotId)
                    .col(Votes::CandidateId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ballots::Table).to_owned())
            .await?;
        Ok(())
    }
}
