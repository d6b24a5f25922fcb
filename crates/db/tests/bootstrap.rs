use kazi_core::work_session::WorkSessionStatus;
use sqlx::PgPool;

/// Connect, migrate, verify the lookup seed matches the status enum.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    kazi_db::health_check(&pool).await.unwrap();

    let rows: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, name FROM work_session_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(rows.len(), WorkSessionStatus::ALL.len());
    for (id, name) in rows {
        let status = WorkSessionStatus::from_id(id)
            .unwrap_or_else(|| panic!("seeded status id {id} has no enum variant"));
        assert_eq!(status.name(), name, "status {id} name mismatch");
    }
}

/// Every business table the workflow touches exists after migration.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tables_exist(pool: PgPool) {
    for table in ["jobs", "job_applications", "work_sessions", "payment_releases"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
