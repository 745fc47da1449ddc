//! Dataset and view-config catalog using SQLite.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use tileset_common::{escape_like, DatasetFilter, DatasetRecord, FileType, TileError, TileResult, ViewConf};

use crate::store::{DatasetStore, ViewConfStore};

/// Database connection pool and catalog operations.
pub struct Catalog {
    pool: SqlitePool,
}

impl Catalog {
    /// Create a new catalog connection from a database URL, creating the file
    /// if needed.
    ///
    /// Every pooled connection to an in-memory database is its own database,
    /// so memory URLs get a pool of exactly one connection for its whole life.
    pub async fn connect(database_url: &str) -> TileResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| TileError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| TileError::Database(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// A private, migrated in-memory catalog.
    pub async fn in_memory() -> TileResult<Self> {
        let catalog = Self::connect("sqlite::memory:").await?;
        catalog.migrate().await?;
        Ok(catalog)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> TileResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| TileError::Database(format!("Migration failed: {}", e)))?;
            }
        }

        Ok(())
    }

    /// Number of stored dataset records.
    pub async fn count_datasets(&self) -> TileResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM datasets")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TileError::Database(format!("Query failed: {}", e)))?;
        Ok(count.max(0) as u64)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DatasetStore for Catalog {
    async fn get_dataset(&self, uuid: &str) -> TileResult<Option<DatasetRecord>> {
        let row = sqlx::query_as::<_, DatasetRow>(&format!(
            "SELECT {} FROM datasets WHERE uuid = ?",
            DATASET_COLUMNS
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TileError::Database(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_datasets(&self, filter: &DatasetFilter) -> TileResult<Vec<DatasetRecord>> {
        let mut sql = format!("SELECT {} FROM datasets WHERE 1 = 1", DATASET_COLUMNS);
        let mut params: Vec<String> = Vec::new();

        if !filter.data_types.is_empty() {
            let placeholders = vec!["?"; filter.data_types.len()].join(", ");
            sql.push_str(&format!(" AND data_type IN ({})", placeholders));
            params.extend(filter.data_types.iter().cloned());
        }

        if let Some(file_type) = &filter.file_type {
            sql.push_str(" AND file_type = ?");
            params.push(file_type.as_str().to_string());
        }

        if let Some(file_name) = &filter.file_name {
            sql.push_str(" AND (file_path = ? OR file_path LIKE ? ESCAPE '\\')");
            params.push(file_name.clone());
            params.push(format!("%/{}", escape_like(file_name)));
        }

        sql.push_str(" ORDER BY created ASC, uuid ASC");

        let mut query = sqlx::query_as::<_, DatasetRow>(&sql);
        for param in &params {
            query = query.bind(param);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TileError::Database(format!("Query failed: {}", e)))?;

        // SQLite LIKE only folds ASCII case, so names are matched here.
        Ok(rows
            .into_iter()
            .map(DatasetRecord::from)
            .filter(|r| filter.matches_name(&r.name))
            .collect())
    }

    async fn create_dataset(&self, record: DatasetRecord) -> TileResult<DatasetRecord> {
        sqlx::query(
            r#"
            INSERT INTO datasets (
                uuid, name, file_path, file_type, data_type,
                coord_system, coord_system_2, owner, private, created
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.uuid)
        .bind(&record.name)
        .bind(&record.file_path)
        .bind(record.file_type.as_str())
        .bind(&record.data_type)
        .bind(&record.coord_system)
        .bind(&record.coord_system_2)
        .bind(&record.owner)
        .bind(record.private)
        .bind(record.created)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "tileset", &record.uuid))?;

        tracing::info!(
            uuid = %record.uuid,
            file_type = %record.file_type,
            owner = ?record.owner,
            "Registered dataset"
        );

        Ok(record)
    }

    async fn delete_dataset(&self, uuid: &str) -> TileResult<bool> {
        let result = sqlx::query("DELETE FROM datasets WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| TileError::Database(format!("Delete failed: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ViewConfStore for Catalog {
    async fn create_viewconf(&self, viewconf: ViewConf) -> TileResult<ViewConf> {
        let document = serde_json::to_string(&viewconf.document)?;

        sqlx::query("INSERT INTO viewconfs (uuid, document, created) VALUES (?, ?, ?)")
            .bind(&viewconf.uuid)
            .bind(document)
            .bind(viewconf.created)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, "view config", &viewconf.uuid))?;

        tracing::info!(uuid = %viewconf.uuid, "Stored view config");
        Ok(viewconf)
    }

    async fn get_viewconf(&self, uuid: &str) -> TileResult<Option<ViewConf>> {
        let row = sqlx::query_as::<_, ViewConfRow>(
            "SELECT uuid, document, created FROM viewconfs WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TileError::Database(format!("Query failed: {}", e)))?;

        match row {
            Some(row) => Ok(Some(ViewConf {
                uuid: row.uuid,
                document: serde_json::from_str(&row.document)?,
                created: row.created,
            })),
            None => Ok(None),
        }
    }
}

/// Map an insert failure, turning primary key collisions into `Conflict`.
fn insert_error(e: sqlx::Error, what: &str, uuid: &str) -> TileError {
    let unique = e
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        TileError::conflict(format!("{} with uuid {} already exists", what, uuid))
    } else {
        TileError::Database(format!("Insert failed: {}", e))
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

const DATASET_COLUMNS: &str = "uuid, name, file_path, file_type, data_type, \
     coord_system, coord_system_2, owner, private, created";

/// Internal row type for dataset queries.
#[derive(FromRow)]
struct DatasetRow {
    uuid: String,
    name: String,
    file_path: String,
    file_type: String,
    data_type: String,
    coord_system: String,
    coord_system_2: String,
    owner: Option<String>,
    private: bool,
    created: DateTime<Utc>,
}

impl From<DatasetRow> for DatasetRecord {
    fn from(row: DatasetRow) -> Self {
        DatasetRecord {
            uuid: row.uuid,
            name: row.name,
            file_path: row.file_path,
            file_type: FileType::parse(&row.file_type),
            data_type: row.data_type,
            coord_system: row.coord_system,
            coord_system_2: row.coord_system_2,
            owner: row.owner,
            private: row.private,
            created: row.created,
        }
    }
}

#[derive(FromRow)]
struct ViewConfRow {
    uuid: String,
    document: String,
    created: DateTime<Utc>,
}

/// Database schema SQL.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS datasets (
    uuid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    file_type TEXT NOT NULL,
    data_type TEXT NOT NULL DEFAULT '',
    coord_system TEXT NOT NULL DEFAULT '',
    coord_system_2 TEXT NOT NULL DEFAULT '',
    owner TEXT,
    private BOOLEAN NOT NULL DEFAULT 1,
    created TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_datasets_data_type ON datasets(data_type);
CREATE INDEX IF NOT EXISTS idx_datasets_file_path ON datasets(file_path);

CREATE TABLE IF NOT EXISTS viewconfs (
    uuid TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    created TEXT NOT NULL
);
"#;
