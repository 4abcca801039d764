//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database is properly configured
//! and accessible from the application. They need a running server, so
//! they only run with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool};
use sqlx::Row;

/// Test that verifies PostgreSQL is accessible and can answer queries
#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_database_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    // gen_random_uuid() backs approval ids
    let row = sqlx::query("SELECT gen_random_uuid() IS NOT NULL as ok")
        .fetch_one(&pool)
        .await?;
    let ok: bool = row.get("ok");
    assert!(ok, "gen_random_uuid() unavailable");

    Ok(())
}
