//! PostgreSQL gateway implementation.
//!
//! Implements [`CouplesGateway`] over a deadpool-postgres pool. Aggregate
//! queries go through the database's stored procedures
//! (`get_household_mutual_likes`, `get_household_activity_enhanced`),
//! pulled back as JSONB row arrays; everything else is plain row access
//! against `user_profiles` and `user_property_interactions`. Row-level
//! security and the trigger logic behind those tables live in the
//! database - this client only reads.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use nestmatch_core::{GatewayError, HouseholdId, LikeRow, PropertyId, Timestamp, UserId};
use nestmatch_storage::CouplesGateway;

use crate::config::DbConfig;

/// Gateway backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgGateway {
    pool: Pool,
}

impl PgGateway {
    /// Create a new gateway with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new gateway from configuration.
    pub fn from_config(config: &DbConfig) -> Result<Self, GatewayError> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> Result<deadpool_postgres::Object, GatewayError> {
        self.pool.get().await.map_err(pool_err)
    }

    /// Invoke a set-returning stored procedure and collect its rows into a
    /// single JSONB array.
    async fn call_rpc(
        &self,
        procedure: &str,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<JsonValue, GatewayError> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(sql, params)
            .await
            .map_err(|e| rpc_err(procedure, e))?;
        let json: Option<JsonValue> = row.get(0);
        Ok(json.unwrap_or(JsonValue::Array(Vec::new())))
    }
}

/// Log and convert a row-access error.
fn query_err(err: tokio_postgres::Error) -> GatewayError {
    tracing::error!("database query error: {err:?}");
    GatewayError::Query {
        reason: err.to_string(),
    }
}

/// Log and convert a stored-procedure error.
fn rpc_err(procedure: &str, err: tokio_postgres::Error) -> GatewayError {
    tracing::error!(procedure, "stored procedure error: {err:?}");
    GatewayError::Rpc {
        procedure: procedure.to_string(),
        reason: err.to_string(),
    }
}

/// Log and convert a connection pool error.
fn pool_err(err: deadpool_postgres::PoolError) -> GatewayError {
    tracing::error!("connection pool error: {err:?}");
    GatewayError::Pool {
        reason: err.to_string(),
    }
}

#[async_trait]
impl CouplesGateway for PgGateway {
    async fn household_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<HouseholdId>, GatewayError> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT household_id FROM user_profiles WHERE id = $1",
                &[&user_id],
            )
            .await
            .map_err(query_err)?;
        Ok(row.and_then(|r| r.get::<_, Option<Uuid>>(0)))
    }

    async fn mutual_likes_rollup(
        &self,
        household_id: HouseholdId,
    ) -> Result<JsonValue, GatewayError> {
        self.call_rpc(
            "get_household_mutual_likes",
            "SELECT COALESCE(jsonb_agg(t), '[]'::jsonb) \
             FROM get_household_mutual_likes($1) t",
            &[&household_id],
        )
        .await
    }

    async fn enhanced_activity(
        &self,
        household_id: HouseholdId,
        limit: i64,
        offset: i64,
    ) -> Result<JsonValue, GatewayError> {
        self.call_rpc(
            "get_household_activity_enhanced",
            "SELECT COALESCE(jsonb_agg(t), '[]'::jsonb) \
             FROM get_household_activity_enhanced($1, $2, $3) t",
            &[&household_id, &limit, &offset],
        )
        .await
    }

    async fn like_interactions(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<LikeRow>, GatewayError> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT i.property_id, i.user_id, i.created_at \
                 FROM user_property_interactions i \
                 JOIN user_profiles p ON p.id = i.user_id \
                 WHERE p.household_id = $1 AND i.interaction_type = 'like'",
                &[&household_id],
            )
            .await
            .map_err(query_err)?;
        Ok(rows
            .into_iter()
            .map(|row| LikeRow {
                property_id: row.get(0),
                user_id: row.get(1),
                created_at: row.get(2),
            })
            .collect())
    }

    async fn count_household_likes(
        &self,
        household_id: HouseholdId,
    ) -> Result<i64, GatewayError> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "SELECT COUNT(*) \
                 FROM user_property_interactions i \
                 JOIN user_profiles p ON p.id = i.user_id \
                 WHERE p.household_id = $1 AND i.interaction_type = 'like'",
                &[&household_id],
            )
            .await
            .map_err(query_err)?;
        Ok(row.get(0))
    }

    async fn recent_interaction_times(
        &self,
        household_id: HouseholdId,
        limit: i64,
    ) -> Result<Vec<Timestamp>, GatewayError> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT i.created_at \
                 FROM user_property_interactions i \
                 JOIN user_profiles p ON p.id = i.user_id \
                 WHERE p.household_id = $1 \
                 ORDER BY i.created_at DESC \
                 LIMIT $2",
                &[&household_id, &limit],
            )
            .await
            .map_err(query_err)?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn partner_likes_excluding(
        &self,
        household_id: HouseholdId,
        property_id: PropertyId,
        user_id: UserId,
    ) -> Result<Vec<UserId>, GatewayError> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT i.user_id \
                 FROM user_property_interactions i \
                 JOIN user_profiles p ON p.id = i.user_id \
                 WHERE p.household_id = $1 \
                   AND i.property_id = $2 \
                   AND i.interaction_type = 'like' \
                   AND i.user_id <> $3",
                &[&household_id, &property_id, &user_id],
            )
            .await
            .map_err(query_err)?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }
}
