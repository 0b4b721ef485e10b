//! Apply the content schema: one PostgreSQL schema holding the four content tables.
//! Every statement is idempotent so this runs on each startup.

use crate::error::AppError;
use crate::models::{
    ARTIST_NAME_MAX, CONTACT_NAME_MAX, EMAIL_MAX, MEDIA_PATH_MAX, SLUG_MAX, TITLE_MAX, URL_MAX,
};
use crate::store::quoted as quote;
use sqlx::PgPool;

/// DDL statements for `schema`, in dependency order.
pub fn schema_statements(schema: &str) -> Vec<String> {
    let s = quote(schema);
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", s),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}."artists" (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR({ARTIST_NAME_MAX}) NOT NULL,
                bio TEXT NOT NULL DEFAULT '',
                slug VARCHAR({SLUG_MAX}) NOT NULL UNIQUE,
                image VARCHAR({MEDIA_PATH_MAX})
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}."books" (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR({TITLE_MAX}) NOT NULL,
                cover VARCHAR({MEDIA_PATH_MAX}) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                download_link VARCHAR({URL_MAX})
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}."posts" (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR({TITLE_MAX}) NOT NULL,
                image VARCHAR({MEDIA_PATH_MAX}),
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
            )
            "#
        ),
        format!(
            r#"CREATE INDEX IF NOT EXISTS "posts_created_at_idx" ON {s}."posts" (created_at DESC, id)"#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}."contact_messages" (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR({CONTACT_NAME_MAX}) NOT NULL,
                email VARCHAR({EMAIL_MAX}) NOT NULL,
                message TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
            )
            "#
        ),
        // created_at is set once on insert; updates keep the original value.
        format!(
            r#"
            CREATE OR REPLACE FUNCTION {s}."keep_created_at"() RETURNS trigger AS $$
            BEGIN
                NEW.created_at := OLD.created_at;
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql
            "#
        ),
        format!(r#"DROP TRIGGER IF EXISTS "posts_keep_created_at" ON {s}."posts""#),
        format!(
            r#"
            CREATE TRIGGER "posts_keep_created_at"
            BEFORE UPDATE ON {s}."posts"
            FOR EACH ROW EXECUTE FUNCTION {s}."keep_created_at"()
            "#
        ),
    ]
}

/// Create the schema, tables, index and trigger if missing.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for sql in schema_statements(schema) {
        tracing::debug!(sql = %sql.trim(), "migration");
        sqlx::query(&sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::info!(schema, "content schema ready");
    Ok(())
}
