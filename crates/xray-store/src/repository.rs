//! TraceRepository - SQLite-based trace storage

use crate::error::{Result, StoreError};
use crate::rows::{format_ts, row_to_step, row_to_trace};
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use xray_core::{
    NewStep, NewTrace, Step, StepId, Trace, TraceId, TraceStatus, TraceStore, TraceWithSteps,
};

/// Repository for persisting traces and steps to SQLite
#[derive(Clone)]
pub struct TraceRepository {
    pool: SqlitePool,
}

impl TraceRepository {
    /// Create a new repository with the given connection pool
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a database file and run migrations
    pub async fn from_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let repo = Self { pool };
        repo.run_migrations().await?;

        info!("SQLite trace store initialized at {}", db_path.display());
        Ok(repo)
    }

    /// Create a new in-memory repository (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.run_migrations().await?;

        debug!("In-memory SQLite trace store initialized");
        Ok(repo)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS traces (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'RUNNING',
                metadata TEXT NOT NULL DEFAULT '{}',
                started_at TEXT NOT NULL,
                completed_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // seq records arrival order and breaks order_index ties
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS steps (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                trace_id TEXT NOT NULL,
                parent_step_id TEXT,
                step_name TEXT NOT NULL,
                status TEXT NOT NULL,
                input TEXT NOT NULL DEFAULT '{}',
                output TEXT NOT NULL DEFAULT '{}',
                reasoning TEXT,
                started_at TEXT NOT NULL,
                ended_at TEXT,
                order_index INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (trace_id) REFERENCES traces(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_traces_started
            ON traces(started_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_steps_trace_order
            ON steps(trace_id, order_index, seq)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Trace operations
    // =========================================================================

    /// Create a new trace in `RUNNING` status
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_trace(&self, request: &NewTrace) -> Result<Trace> {
        if request.name.trim().is_empty() {
            return Err(StoreError::InvalidInput("name is required".to_string()));
        }

        let trace = Trace {
            id: TraceId::new(Uuid::new_v4().to_string()),
            name: request.name.clone(),
            metadata: request.metadata.clone(),
            status: TraceStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
        };
        let metadata = serde_json::to_string(&trace.metadata)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO traces (id, name, status, metadata, started_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(trace.id.as_str())
        .bind(&trace.name)
        .bind(trace.status.as_str())
        .bind(metadata)
        .bind(format_ts(trace.started_at))
        .execute(&self.pool)
        .await?;

        debug!(trace_id = %trace.id, "created trace");
        Ok(trace)
    }

    /// Overwrite a trace's status and stamp its completion time
    #[instrument(skip(self))]
    pub async fn update_trace_status(&self, id: &TraceId, status: &TraceStatus) -> Result<Trace> {
        if status.as_str().trim().is_empty() {
            return Err(StoreError::InvalidInput("status is required".to_string()));
        }

        let result = sqlx::query(
            r#"
            UPDATE traces SET status = $1, completed_at = $2
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(format_ts(Utc::now()))
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("trace {id}")));
        }

        debug!(trace_id = %id, status = %status, "updated trace status");
        self.get_trace(id).await
    }

    /// Get a trace by ID
    #[instrument(skip(self))]
    pub async fn get_trace(&self, id: &TraceId) -> Result<Trace> {
        let row = sqlx::query(
            r#"
            SELECT id, name, status, metadata, started_at, completed_at
            FROM traces WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("trace {id}")))?;

        row_to_trace(row)
    }

    /// All traces, most recent first
    #[instrument(skip(self))]
    pub async fn list_traces(&self) -> Result<Vec<Trace>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, status, metadata, started_at, completed_at
            FROM traces
            ORDER BY started_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_trace).collect()
    }

    // =========================================================================
    // Step operations
    // =========================================================================

    /// Append a step to an existing trace
    ///
    /// A named parent must already exist in the same trace. Since steps are
    /// never updated, this also rules out cycles.
    #[instrument(
        skip(self, request),
        fields(trace_id = %request.trace_id, step = %request.step_name)
    )]
    pub async fn create_step(&self, request: &NewStep) -> Result<Step> {
        if request.step_name.trim().is_empty() {
            return Err(StoreError::InvalidInput("step_name is required".to_string()));
        }

        self.get_trace(&request.trace_id).await?;

        if let Some(parent) = &request.parent_step_id {
            let exists = sqlx::query("SELECT 1 FROM steps WHERE id = $1 AND trace_id = $2")
                .bind(parent.as_str())
                .bind(request.trace_id.as_str())
                .fetch_optional(&self.pool)
                .await?
                .is_some();
            if !exists {
                return Err(StoreError::InvalidInput(format!(
                    "parent step {parent} does not exist in trace {}",
                    request.trace_id
                )));
            }
        }

        let step = Step {
            id: StepId::new(Uuid::new_v4().to_string()),
            trace_id: request.trace_id.clone(),
            step_name: request.step_name.clone(),
            status: request.status.clone(),
            input: request.input.clone(),
            output: request.output.clone(),
            reasoning: request.reasoning.clone(),
            parent_step_id: request.parent_step_id.clone(),
            order_index: request.order_index,
            started_at: request.started_at.unwrap_or_else(Utc::now),
            ended_at: request.ended_at,
        };

        sqlx::query(
            r#"
            INSERT INTO steps (
                id, trace_id, parent_step_id, step_name, status,
                input, output, reasoning, started_at, ended_at, order_index
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9, $10, $11
            )
            "#,
        )
        .bind(step.id.as_str())
        .bind(step.trace_id.as_str())
        .bind(step.parent_step_id.as_ref().map(StepId::as_str))
        .bind(&step.step_name)
        .bind(&step.status)
        .bind(step.input.to_string())
        .bind(step.output.to_string())
        .bind(step.reasoning.as_deref())
        .bind(format_ts(step.started_at))
        .bind(step.ended_at.map(format_ts))
        .bind(step.order_index)
        .execute(&self.pool)
        .await?;

        debug!(step_id = %step.id, order_index = step.order_index, "created step");
        Ok(step)
    }

    /// Steps of a trace, by order index and then arrival
    #[instrument(skip(self))]
    pub async fn list_steps(&self, trace_id: &TraceId) -> Result<Vec<Step>> {
        let rows = sqlx::query(
            r#"
            SELECT id, trace_id, parent_step_id, step_name, status,
                   input, output, reasoning, started_at, ended_at, order_index
            FROM steps
            WHERE trace_id = $1
            ORDER BY order_index ASC, seq ASC
            "#,
        )
        .bind(trace_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_step).collect()
    }

    /// A trace and all of its steps
    pub async fn get_trace_detail(&self, id: &TraceId) -> Result<TraceWithSteps> {
        let trace = self.get_trace(id).await?;
        let steps = self.list_steps(id).await?;
        Ok(TraceWithSteps { trace, steps })
    }
}

#[async_trait::async_trait]
impl TraceStore for TraceRepository {
    async fn create_trace(&self, trace: &NewTrace) -> xray_core::Result<TraceId> {
        Ok(TraceRepository::create_trace(self, trace).await?.id)
    }

    async fn update_trace_status(
        &self,
        id: &TraceId,
        status: &TraceStatus,
    ) -> xray_core::Result<()> {
        TraceRepository::update_trace_status(self, id, status).await?;
        Ok(())
    }

    async fn create_step(&self, step: &NewStep) -> xray_core::Result<StepId> {
        Ok(TraceRepository::create_step(self, step).await?.id)
    }

    async fn list_traces(&self) -> xray_core::Result<Vec<Trace>> {
        Ok(TraceRepository::list_traces(self).await?)
    }

    async fn get_trace_detail(&self, id: &TraceId) -> xray_core::Result<TraceWithSteps> {
        Ok(TraceRepository::get_trace_detail(self, id).await?)
    }
}

/// Get the default data directory for X-Ray
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".xray"))
        .unwrap_or_else(|| PathBuf::from(".xray"))
}

/// Get the default database path
pub fn default_db_path() -> PathBuf {
    default_data_dir().join("xray.db")
}
