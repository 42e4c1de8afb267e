use anyhow::{Context, Result};
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, QueryBuilder, Row};

use crate::model::{generate_id, Condition, Document, Query, Update};
use crate::store::traits::DocumentStore;

/// Document store over a single PostgreSQL JSONB table
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the documents table and its indexes
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS documents_shortid_idx ON documents (collection, (body->>'shortid'))",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create shortid index")?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn select<'a>(collection: &'a str, query: &Query) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
        builder.push_bind(collection);
        push_conditions(&mut builder, query);
        builder
    }
}

/// Equality predicates become JSONB containment, missing predicates a path probe
fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &Query) {
    for condition in &query.conditions {
        match condition {
            Condition::Eq { path, value } => {
                builder.push(" AND body @> ");
                builder.push_bind(Json(nest(path, value.clone())));
            }
            Condition::Missing { path } => {
                builder.push(" AND COALESCE(body #> ");
                builder.push_bind(path.clone());
                builder.push(", 'null'::jsonb) = 'null'::jsonb");
            }
        }
    }
}

/// `["folder", "shortid"]`, `"x"` becomes `{"folder": {"shortid": "x"}}`
fn nest(path: &[String], value: Value) -> Value {
    path.iter().rev().fold(value, |inner, segment| {
        let mut object = Map::new();
        object.insert(segment.clone(), inner);
        Value::Object(object)
    })
}

fn into_document(row: &sqlx::postgres::PgRow) -> Result<Document> {
    let Json(body): Json<Value> = row.try_get("body").context("Failed to read document body")?;
    match body {
        Value::Object(document) => Ok(document),
        other => anyhow::bail!("Stored document is not an object: {}", other),
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let mut builder = Self::select(collection, query);
        builder.push(" ORDER BY created_at, id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to query collection '{}'", collection))?;

        rows.iter().map(into_document).collect()
    }

    async fn find_one(&self, collection: &str, query: &Query) -> Result<Option<Document>> {
        let mut builder = Self::select(collection, query);
        builder.push(" ORDER BY created_at, id LIMIT 1");

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to query collection '{}'", collection))?;

        row.as_ref().map(into_document).transpose()
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<Document> {
        let id = match document.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = generate_id();
                document.insert("_id".to_string(), Value::String(id.clone()));
                id
            }
        };

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Json(Value::Object(document.clone())))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert into collection '{}'", collection))?;

        Ok(document)
    }

    async fn update(&self, collection: &str, query: &Query, update: &Update) -> Result<u64> {
        let mut builder = QueryBuilder::new("UPDATE documents SET body = body || ");
        builder.push_bind(Json(Value::Object(update.set.clone())));
        builder.push(" WHERE collection = ");
        builder.push_bind(collection);
        push_conditions(&mut builder, query);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update collection '{}'", collection))?;

        Ok(result.rows_affected())
    }

    async fn remove(&self, collection: &str, query: &Query) -> Result<u64> {
        let mut builder = QueryBuilder::new("DELETE FROM documents WHERE collection = ");
        builder.push_bind(collection);
        push_conditions(&mut builder, query);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove from collection '{}'", collection))?;

        Ok(result.rows_affected())
    }
}
