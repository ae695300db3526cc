//! Database bootstrap checks. Require a reachable PostgreSQL via
//! `DATABASE_URL`; run with `cargo test -- --ignored`.

use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore]
async fn health_check_succeeds(pool: PgPool) {
    onboard_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore]
async fn document_tables_exist(pool: PgPool) {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name::TEXT FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_name IN ('pages', 'submissions') \
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();
    assert_eq!(names, ["pages", "submissions"]);
}
