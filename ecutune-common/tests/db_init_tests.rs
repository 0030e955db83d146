//! Tests for database initialization and migrations

use ecutune_common::db::migrations::get_schema_version;
use ecutune_common::db::{init_database, init_memory_database, run_migrations, CURRENT_SCHEMA_VERSION};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("ecutune.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ecutune.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_schema_version_is_current() {
    let pool = init_memory_database().await.unwrap();

    let version = get_schema_version(&pool).await.unwrap();
    assert_eq!(version, CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let pool = init_memory_database().await.unwrap();

    run_migrations(&pool).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, CURRENT_SCHEMA_VERSION as i64);
}

#[tokio::test]
async fn test_expected_tables_exist() {
    let pool = init_memory_database().await.unwrap();

    for table in ["schema_version", "vehicles", "leads"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "Should have table: {}", table);
    }
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ecutune.db");

    let pool = init_database(&db_path).await.unwrap();
    let vehicle = ecutune_common::Vehicle::new("Diesel", "Audi", "A4", "2.0 TDI 150").unwrap();
    ecutune_common::vehicles::insert_vehicle(&pool, &vehicle).await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let count = ecutune_common::vehicles::count_vehicles(&pool).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_every_pooled_connection_has_pragmas() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("ecutune.db")).await.unwrap();

    // Hold several connections at once so the pool has to open new ones
    let mut conns = Vec::new();
    for _ in 0..3 {
        conns.push(pool.acquire().await.unwrap());
    }

    for conn in conns.iter_mut() {
        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);

        let busy_timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(busy_timeout, 5000);

        let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");
    }
}
