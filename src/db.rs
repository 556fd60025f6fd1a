//! SQLite-backed store for prediction summaries, one row per completed
//! detection run. Labels are kept as a JSON column; timestamps as RFC 3339.

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::Row;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::models::{Label, PredictionSummary};

pub trait PredictionRepository {
    fn add_prediction(
        &self,
        summary: &PredictionSummary,
    ) -> impl std::future::Future<Output = Result<()>>;

    fn get_prediction(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<PredictionSummary>>>;

    fn list_predictions(&self) -> impl std::future::Future<Output = Result<Vec<PredictionSummary>>>;
}

#[derive(Debug, Clone)]
pub struct PredictionDb {
    pool: SqlitePool,
}

impl PredictionDb {
    pub async fn new<P: AsRef<Path>>(db_file: P) -> Result<Self> {
        let connect_opts = SqliteConnectOptions::new()
            .filename(db_file.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_opts)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl PredictionRepository for PredictionDb {
    async fn add_prediction(&self, summary: &PredictionSummary) -> Result<()> {
        let id = summary.prediction_id.to_string();
        let labels_json =
            serde_json::to_string(&summary.labels).context("Failed to serialize labels")?;
        let created_at = summary
            .created_at
            .format(&Rfc3339)
            .context("Failed to format timestamp")?;

        sqlx::query(
            r#"INSERT INTO prediction
            (id, original_img_path, predicted_img_path, labels, created_at)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(id)
        .bind(&summary.original_img_path)
        .bind(&summary.predicted_img_path)
        .bind(labels_json)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_prediction(&self, id: Uuid) -> Result<Option<PredictionSummary>> {
        let row = sqlx::query(
            r#"SELECT id, original_img_path, predicted_img_path, labels, created_at
            FROM prediction WHERE id = $1"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_summary).transpose()
    }

    async fn list_predictions(&self) -> Result<Vec<PredictionSummary>> {
        sqlx::query(
            r#"SELECT id, original_img_path, predicted_img_path, labels, created_at
            FROM prediction ORDER BY created_at ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(row_to_summary)
        .collect()
    }
}

fn row_to_summary(row: SqliteRow) -> Result<PredictionSummary> {
    let id: String = row.try_get("id")?;
    let labels_json: String = row.try_get("labels")?;
    let created_at: String = row.try_get("created_at")?;

    let labels: Vec<Label> =
        serde_json::from_str(&labels_json).context("Invalid labels column")?;
    Ok(PredictionSummary {
        prediction_id: Uuid::parse_str(&id).context("Invalid prediction id column")?,
        original_img_path: row.try_get("original_img_path")?,
        predicted_img_path: row.try_get("predicted_img_path")?,
        labels,
        created_at: OffsetDateTime::parse(&created_at, &Rfc3339)
            .context("Invalid created_at column")?,
    })
}
