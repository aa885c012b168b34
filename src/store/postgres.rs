//! PostgreSQL book store. Each book is one row of `<schema>.books`: the content
//! fields as a JSONB document next to the id and timestamp columns.

use super::{parse_id, BookStore};
use crate::error::AppError;
use crate::model::{Book, BookDocument, BookPayload};
use crate::schema;
use crate::settings::DatabaseSettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use uuid::Uuid;

pub const BOOKS_TABLE: &str = "books";

const COLUMNS: &str = "id, document, created_at, updated_at";

type BookRow = (Uuid, Value, DateTime<Utc>, DateTime<Utc>);

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn row_to_book((id, document, created_at, updated_at): BookRow) -> Result<Book, AppError> {
    let doc: BookDocument = serde_json::from_value(document)?;
    Ok(Book::from_document(id, doc, created_at, updated_at))
}

pub struct PgBookStore {
    pool: PgPool,
    /// Schema-qualified, quoted table name.
    table: String,
}

impl PgBookStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgBookStore {
            pool,
            table: format!("{}.{}", quote_ident(schema), quote_ident(BOOKS_TABLE)),
        }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, payload: &BookPayload, now: DateTime<Utc>) -> Result<Book, AppError> {
        let doc = schema::prepare_new(payload, now)?;
        let sql = format!(
            "INSERT INTO {} (document, created_at, updated_at) VALUES ($1, $2, $2) RETURNING {}",
            self.table, COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        let row: BookRow = sqlx::query_as(&sql)
            .bind(serde_json::to_value(&doc)?)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        row_to_book(row)
    }

    async fn find_all(&self) -> Result<Vec<Book>, AppError> {
        let sql = format!("SELECT {} FROM {} ORDER BY created_at, id", COLUMNS, self.table);
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<BookRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_book).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, AppError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, self.table);
        tracing::debug!(sql = %sql, %id, "query");
        let row: Option<BookRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(row_to_book).transpose()
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: &BookPayload,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Book>, AppError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let mut tx = self.pool.begin().await?;
        let select = format!("SELECT {} FROM {} WHERE id = $1 FOR UPDATE", COLUMNS, self.table);
        tracing::debug!(sql = %select, %id, "query (tx)");
        let row: Option<BookRow> = sqlx::query_as(&select).bind(id).fetch_optional(&mut *tx).await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let existing = row_to_book(row)?;
        let merged = schema::prepare_update(&existing, payload, updated_at)?;

        let update = format!(
            "UPDATE {} SET document = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            self.table, COLUMNS
        );
        tracing::debug!(sql = %update, %id, "query (tx)");
        let row: BookRow = sqlx::query_as(&update)
            .bind(id)
            .bind(serde_json::to_value(merged.document())?)
            .bind(merged.updated_at)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        row_to_book(row).map(Some)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Book>, AppError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING {}", self.table, COLUMNS);
        tracing::debug!(sql = %sql, %id, "query");
        let row: Option<BookRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(row_to_book).transpose()
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Create `schema` and its books table if they do not exist. Ids default to
/// `gen_random_uuid()` when an insert omits them.
pub async fn ensure_books_table(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let q_schema = quote_ident(schema);
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", q_schema))
        .execute(pool)
        .await?;

    let table = format!("{}.{}", q_schema, quote_ident(BOOKS_TABLE));
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            document JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CHECK (created_at <= updated_at)
        )
        "#,
        table
    );
    sqlx::query(&ddl).execute(pool).await?;
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS books_created_at_idx ON {} (created_at, id)",
        table
    ))
    .execute(pool)
    .await?;
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid database url: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("database url: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim().to_string();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres{}", base, query), db_name))
}

/// Owns the connection pool for the lifetime of the process.
pub struct Database {
    pool: PgPool,
    schema: String,
}

impl Database {
    /// Open the pool and make sure the books table exists.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        let url = settings.url();
        tracing::info!(
            url = %settings.redacted_url(),
            max_connections = settings.max_connections,
            "store: connecting"
        );
        if settings.ensure_database {
            ensure_database_exists(&url).await?;
        }
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&url)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "store: error while trying to connect");
                AppError::Db(e)
            })?;
        tracing::info!("store: connected");
        ensure_books_table(&pool, &settings.schema).await?;
        Ok(Database {
            pool,
            schema: settings.schema.clone(),
        })
    }

    pub fn book_store(&self) -> PgBookStore {
        PgBookStore::new(self.pool.clone(), &self.schema)
    }

    pub fn is_connected(&self) -> bool {
        !self.pool.is_closed()
    }

    pub async fn close(&self) {
        tracing::info!("store: closing connection pool");
        self.pool.close().await;
        tracing::info!("store: connection closed");
    }
}
