//! Postgres projection store

use async_trait::async_trait;
use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use projection_model::{NewProjection, Projection, ProjectionId, Sport};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::ProjectionStore;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projections (
    id UUID PRIMARY KEY,
    user_id TEXT NOT NULL,
    sport TEXT NOT NULL,
    player TEXT NOT NULL,
    metric TEXT NOT NULL,
    target NUMERIC NOT NULL,
    date DATE NOT NULL,
    actual NUMERIC,
    met BOOLEAN,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS projections_user_id_idx ON projections (user_id)";

const SELECT_COLUMNS: &str = "id, user_id, sport, player, metric, target, date, actual, met";

/// Projections in a Postgres `projections` table
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool to `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(database_url).await?;
        info!("Connected to projection database");
        Ok(Self { pool })
    }

    /// Use an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the projections table if it does not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_USER_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    async fn select(&self, user_id: &str, pending_only: bool) -> Result<Vec<Projection>> {
        let sql = if pending_only {
            format!(
                "SELECT {SELECT_COLUMNS} FROM projections WHERE user_id = $1 AND actual IS NULL ORDER BY created_at"
            )
        } else {
            format!("SELECT {SELECT_COLUMNS} FROM projections WHERE user_id = $1 ORDER BY created_at")
        };

        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        rows.iter().map(projection_from_row).collect()
    }
}

fn to_decimal(value: f64) -> Result<BigDecimal> {
    BigDecimal::from_f64(value).ok_or_else(|| StoreError::corrupt(format!("{value} is not representable as NUMERIC")))
}

fn from_decimal(value: &BigDecimal) -> Result<f64> {
    value.to_f64().ok_or_else(|| StoreError::corrupt(format!("{value} does not fit in f64")))
}

fn projection_from_row(row: &PgRow) -> Result<Projection> {
    let sport: String = row.try_get("sport")?;
    let sport = sport.parse::<Sport>().map_err(|e| StoreError::corrupt(e.to_string()))?;

    let target: BigDecimal = row.try_get("target")?;
    let actual: Option<BigDecimal> = row.try_get("actual")?;

    Ok(Projection {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        sport,
        player: row.try_get("player")?,
        metric: row.try_get("metric")?,
        target: from_decimal(&target)?,
        date: row.try_get("date")?,
        actual: actual.as_ref().map(from_decimal).transpose()?,
        met: row.try_get("met")?,
    })
}

#[async_trait]
impl ProjectionStore for PgStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Projection>> {
        self.select(user_id, false).await
    }

    async fn list_pending(&self, user_id: &str) -> Result<Vec<Projection>> {
        self.select(user_id, true).await
    }

    async fn create(&self, new: NewProjection) -> Result<Projection> {
        let projection = Projection::from_new(Uuid::new_v4(), new);

        sqlx::query(
            "INSERT INTO projections (id, user_id, sport, player, metric, target, date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(projection.id)
        .bind(&projection.user_id)
        .bind(projection.sport.code())
        .bind(&projection.player)
        .bind(&projection.metric)
        .bind(to_decimal(projection.target)?)
        .bind(projection.date)
        .execute(&self.pool)
        .await?;

        debug!(id = %projection.id, "Inserted projection");
        Ok(projection)
    }

    async fn delete(&self, user_id: &str, id: ProjectionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projections WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_result(&self, id: ProjectionId, actual: f64, met: bool) -> Result<()> {
        let result =
            sqlx::query("UPDATE projections SET actual = $1, met = $2 WHERE id = $3 AND actual IS NULL")
                .bind(to_decimal(actual)?)
                .bind(met)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            let existing = sqlx::query("SELECT id FROM projections WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            return Err(match existing {
                Some(_) => StoreError::AlreadyResolved { id },
                None => StoreError::NotFound { id },
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_decimal_conversion() {
        let decimal = to_decimal(24.5).unwrap();
        assert_eq!(from_decimal(&decimal).unwrap(), 24.5);
        assert!(to_decimal(f64::NAN).is_err());
    }

    /// Runs against a real database when PROJECTIONS_TEST_DATABASE_URL is set
    #[tokio::test]
    #[ignore]
    async fn test_round_trip_against_database() {
        let Ok(url) = std::env::var("PROJECTIONS_TEST_DATABASE_URL") else {
            return;
        };

        let store = PgStore::connect(&url, 2).await.unwrap();
        store.ensure_schema().await.unwrap();

        let user_id = format!("test-{}", Uuid::new_v4());
        let created = store
            .create(NewProjection {
                user_id: user_id.clone(),
                sport: Sport::Mlb,
                player: "Mookie Betts".to_string(),
                metric: "hits".to_string(),
                target: 1.0,
                date: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(store.list_pending(&user_id).await.unwrap().len(), 1);
        store.update_result(created.id, 2.0, true).await.unwrap();
        assert!(store.list_pending(&user_id).await.unwrap().is_empty());

        let second = store.update_result(created.id, 0.0, false).await;
        assert!(matches!(second, Err(StoreError::AlreadyResolved { .. })));
        let missing = store.update_result(Uuid::new_v4(), 0.0, false).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));

        let listed = store.list(&user_id).await.unwrap();
        assert_eq!(listed[0].actual, Some(2.0));
        assert_eq!(listed[0].met, Some(true));

        assert!(store.delete(&user_id, created.id).await.unwrap());
    }
}
