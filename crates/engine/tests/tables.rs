use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, NewVoter};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(4)
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn cell(column: &str, value: Option<&str>) -> (String, Option<String>) {
    (column.to_string(), value.map(ToString::to_string))
}

#[tokio::test]
async fn lists_application_tables() {
    let (engine, _db) = engine_with_db().await;
    let tables = engine.list_tables().await.unwrap();

    for expected in [
        "admins",
        "ballots",
        "candidates",
        "elections",
        "positions",
        "sessions",
        "voters",
        "votes",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing {expected}");
    }
    assert!(tables.iter().all(|t| !t.starts_with("sqlite_")));
    let mut sorted = tables.clone();
    sorted.sort();
    assert_eq!(tables, sorted);
}

#[tokio::test]
async fn columns_come_from_the_live_schema() {
    let (engine, _db) = engine_with_db().await;
    let columns = engine.table_columns("positions").await.unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "title", "description", "max_winners", "votes_allowed"]
    );
    assert!(columns[0].primary_key);
    assert!(columns[0].is_rowid_alias());
    assert!(columns[1].not_null);

    assert_eq!(
        engine.table_columns("nope").await.unwrap_err(),
        EngineError::UnknownTable("nope".to_string())
    );
}

#[tokio::test]
async fn insert_update_delete_by_column_name() {
    let (engine, _db) = engine_with_db().await;

    engine
        .insert_row(
            "positions",
            &[
                cell("title", Some("President")),
                cell("description", None),
                cell("max_winners", Some("1")),
                cell("votes_allowed", Some("2")),
            ],
        )
        .await
        .unwrap();

    let data = engine.table_rows("positions").await.unwrap();
    assert_eq!(data.rows.len(), 1);
    assert_eq!(
        data.rows[0],
        vec![
            Some("1".to_string()),
            Some("President".to_string()),
            None,
            Some("1".to_string()),
            Some("2".to_string()),
        ]
    );
    assert_eq!(data.key_column().map(|c| c.name.as_str()), Some("id"));

    let updated = engine
        .update_row("positions", "id", "1", &[cell("title", Some("Chair"))])
        .await
        .unwrap();
    assert_eq!(updated, 1);
    let positions = engine.list_positions().await.unwrap();
    assert_eq!(positions[0].title, "Chair");
    assert_eq!(positions[0].votes_allowed, 2);

    assert_eq!(engine.delete_row("positions", "id", "1").await.unwrap(), 1);
    assert!(engine.table_rows("positions").await.unwrap().rows.is_empty());
}

#[tokio::test]
async fn unknown_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(
        engine
            .insert_row("positions; DROP TABLE voters", &[])
            .await
            .unwrap_err(),
        EngineError::UnknownTable("positions; DROP TABLE voters".to_string())
    );
    assert_eq!(
        engine
            .insert_row("positions", &[cell("bogus", Some("1"))])
            .await
            .unwrap_err(),
        EngineError::UnknownColumn("bogus".to_string())
    );
    assert_eq!(
        engine
            .delete_row("positions", "bogus", "1")
            .await
            .unwrap_err(),
        EngineError::UnknownColumn("bogus".to_string())
    );
}

#[tokio::test]
async fn constraint_violations_surface_as_errors() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_voter(NewVoter {
            school_id: Some("S1".to_string()),
            full_name: Some("Ann".to_string()),
            grade: None,
            password: Some("pw".to_string()),
            confirm_password: Some("pw".to_string()),
        })
        .await
        .unwrap();

    let duplicate = engine
        .insert_row(
            "voters",
            &[
                cell("school_id", Some("S1")),
                cell("full_name", Some("Copy")),
                cell("password_hash", Some("x")),
            ],
        )
        .await
        .unwrap_err();
    assert!(duplicate.is_internal());

    let dangling = engine
        .insert_row(
            "candidates",
            &[cell("full_name", Some("Ghost")), cell("position_id", Some("77"))],
        )
        .await
        .unwrap_err();
    assert!(matches!(dangling, EngineError::Database(_)));

    assert_eq!(engine.table_rows("voters").await.unwrap().rows.len(), 1);
    assert!(engine.table_rows("candidates").await.unwrap().rows.is_empty());
}
