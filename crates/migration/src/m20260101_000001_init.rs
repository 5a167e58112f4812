//! Initial schema migration.
//!
//! Creates the portal tables:
//!
//! - `voters`: students allowed to vote, keyed by school id
//! - `admins`: portal administrators
//! - `elections`: time-bounded voting events
//! - `positions`: contested roles with winner/vote allowances
//! - `candidates`: people running for a position in an election

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Voters {
    Table,
    Id,
    SchoolId,
    FullName,
    Grade,
    PasswordHash,
}

#[derive(Iden)]
enum Admins {
    Table,
    Id,
    Username,
    PasswordHash,
}

#[derive(Iden)]
enum Elections {
    Table,
    Id,
    Title,
    Description,
    StartDate,
    EndDate,
    Status,
    Positions,
}

#[derive(Iden)]
enum Positions {
    Table,
    Id,
    Title,
    Description,
    MaxWinners,
    VotesAllowed,
}

#[derive(Iden)]
enum Candidates {
    Table,
    Id,
    FullName,
    PhotoFilename,
    PositionId,
    Party,
    Bio,
    ElectionId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Voters
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Voters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Voters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Voters::SchoolId).string().not_null())
                    .col(ColumnDef::new(Voters::FullName).string().not_null())
                    .col(ColumnDef::new(Voters::Grade).string())
                    .col(ColumnDef::new(Voters::PasswordHash).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-voters-school_id-unique")
                    .table(Voters::Table)
                    .col(Voters::SchoolId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Admins
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Admins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Admins::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Admins::Username).string().not_null())
                    .col(ColumnDef::new(Admins::PasswordHash).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-admins-username-unique")
                    .table(Admins::Table)
                    .col(Admins::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Elections
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Elections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Elections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Elections::Title).string().not_null())
                    .col(ColumnDef::new(Elections::Description).text())
                    .col(ColumnDef::new(Elections::StartDate).date().not_null())
                    .col(ColumnDef::new(Elections::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Elections::Status)
                            .string()
                            .not_null()
                            .default("upcoming"),
                    )
                    .col(ColumnDef::new(Elections::Positions).text())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Positions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Positions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Positions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Positions::Title).string().not_null())
                    .col(ColumnDef::new(Positions::Description).text())
                    .col(
                        ColumnDef::new(Positions::MaxWinners)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Positions::VotesAllowed)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Candidates
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Candidates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Candidates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Candidates::FullName).string().not_null())
                    .col(ColumnDef::new(Candidates::PhotoFilename).string())
                    .col(ColumnDef::new(Candidates::PositionId).integer())
                    .col(ColumnDef::new(Candidates::Party).string())
                    .col(ColumnDef::new(Candidates::Bio).text())
                    .col(ColumnDef::new(Candidates::ElectionId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-candidates-position_id")
                            .from(Candidates::Table, Candidates::PositionId)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-candidates-election_id")
                            .from(Candidates::Table, Candidates::ElectionId)
                            .to(Elections::Table, Elections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-candidates-election_id")
                    .table(Candidates::Table)
                    .col(Candidates::ElectionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Candidates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Positions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Elections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Voters::Table).to_owned())
            .await?;
        Ok(())
    }
}
