//! PostgreSQL-backed content store.

use super::{ContentStore, Fixture, FixtureCounts};
use crate::error::{AppError, ConfigError};
use crate::models::{Artist, Book, ContactMessage, Post};
use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;
use url::Url;

/// Quote identifier for PostgreSQL.
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", quoted(&self.schema), quoted(name))
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn list_artists(&self) -> Result<Vec<Artist>, AppError> {
        let sql = format!(
            "SELECT id, name, bio, slug, image FROM {} ORDER BY id",
            self.table("artists")
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Artist>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_artist(&self, id: i64) -> Result<Option<Artist>, AppError> {
        let sql = format!(
            "SELECT id, name, bio, slug, image FROM {} WHERE id = $1",
            self.table("artists")
        );
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as::<_, Artist>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        let sql = format!(
            "SELECT id, title, cover, description, download_link FROM {} ORDER BY id",
            self.table("books")
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Book>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, AppError> {
        let sql = format!(
            "SELECT id, title, cover, description, download_link FROM {} WHERE id = $1",
            self.table("books")
        );
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let sql = format!(
            "SELECT id, title, image, content, created_at FROM {} ORDER BY created_at DESC, id ASC",
            self.table("posts")
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!(
            "SELECT id, title, image, content, created_at FROM {} WHERE id = $1",
            self.table("posts")
        );
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn load_fixture(&self, fixture: &Fixture) -> Result<FixtureCounts, AppError> {
        let mut counts = FixtureCounts::default();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO {} (name, bio, slug, image) VALUES ($1, $2, $3, $4)",
            self.table("artists")
        );
        for a in &fixture.artists {
            sqlx::query(&sql)
                .bind(&a.name)
                .bind(&a.bio)
                .bind(&a.slug)
                .bind(a.image.as_deref().filter(|s| !s.is_empty()))
                .execute(&mut *tx)
                .await
                .map_err(|e| unique_violation_as_validation(e, "slug", &a.slug))?;
            counts.artists += 1;
        }

        let sql = format!(
            "INSERT INTO {} (title, cover, description, download_link) VALUES ($1, $2, $3, $4)",
            self.table("books")
        );
        for b in &fixture.books {
            sqlx::query(&sql)
                .bind(&b.title)
                .bind(&b.cover)
                .bind(&b.description)
                .bind(b.download_link.as_deref().filter(|s| !s.is_empty()))
                .execute(&mut *tx)
                .await?;
            counts.books += 1;
        }

        // created_at comes from clock_timestamp(), so posts in one fixture keep file order.
        let sql = format!(
            "INSERT INTO {} (title, image, content) VALUES ($1, $2, $3)",
            self.table("posts")
        );
        for p in &fixture.posts {
            sqlx::query(&sql)
                .bind(&p.title)
                .bind(p.image.as_deref().filter(|s| !s.is_empty()))
                .bind(&p.content)
                .execute(&mut *tx)
                .await?;
            counts.posts += 1;
        }

        let sql = format!(
            "INSERT INTO {} (name, email, message) VALUES ($1, $2, $3)",
            self.table("contact_messages")
        );
        for m in &fixture.contact_messages {
            sqlx::query(&sql)
                .bind(&m.name)
                .bind(&m.email)
                .bind(&m.message)
                .execute(&mut *tx)
                .await?;
            counts.contact_messages += 1;
        }

        tx.commit().await?;
        Ok(counts)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, AppError> {
        let sql = format!(
            "SELECT id, name, email, message, timestamp FROM {} ORDER BY timestamp DESC, id ASC",
            self.table("contact_messages")
        );
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as::<_, ContactMessage>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn unique_violation_as_validation(e: sqlx::Error, field: &str, value: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation(format!("{} '{}' already exists", field, value))
        }
        _ => AppError::Db(e),
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| invalid_database_url(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn invalid_database_url(reason: String) -> AppError {
    ConfigError::InvalidValue {
        key: "DATABASE_URL",
        reason,
    }
    .into()
}

/// Split a connection URL into (URL of the `postgres` maintenance db, target db name).
fn parse_db_name_from_url(raw: &str) -> Result<(String, String), AppError> {
    let mut url = Url::parse(raw).map_err(|e| invalid_database_url(e.to_string()))?;
    let db_name = url.path().trim_start_matches('/').trim().to_string();
    if db_name.is_empty() {
        return Err(invalid_database_url("no database name in path".into()));
    }
    url.set_path("/postgres");
    Ok((url.into(), db_name))
}
