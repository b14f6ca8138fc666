use sqlx::PgPool;
use time::OffsetDateTime;

/// Round-trips to the database and returns its clock.
pub(crate) async fn database_now(pool: &PgPool) -> Result<OffsetDateTime, sqlx::Error> {
    sqlx::query_scalar("SELECT now()").fetch_one(pool).await
}
