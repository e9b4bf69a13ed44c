//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, the startup schema
//! migration, and the Postgres implementation of the QUESTFLOW store traits.

use async_trait::async_trait;
use deadpool_postgres::{Config, GenericClient, ManagerConfig, Pool, RecyclingMethod, Runtime};
use questflow_core::{
    new_entity_id, plan_claim, EntityKind, MilestoneTable, QuestCompletion, QuestError,
    QuestResult, ReferralClaim, ReferralEvent, ReferralLedger, StorageError, Ttrust, UserId,
    UserProfile, XP_PER_LEVEL,
};
use questflow_storage::{ProfileStore, QuestStore, ReferralStore};
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

use crate::error::{ApiError, ApiResult};

/// Schema applied by [`DbClient::migrate`].
pub const MIGRATION_SQL: &str = include_str!("../migrations/0001_init.sql");

const LEDGER_SQL: &str = "SELECT \
     (SELECT COUNT(*) FROM referral_events WHERE referrer_user_id = $1) AS referral_count, \
     (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM referral_claims WHERE user_id = $1) AS claimed";

const PROFILE_COLUMNS: &str = "id, user_id, display_name, xp, level, quests_completed, \
     social_profiles, created_at, updated_at";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait/create/recycle timeout for pooled connections
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "questflow".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from `QUESTFLOW_DB_*` environment
    /// variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("QUESTFLOW_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("QUESTFLOW_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("QUESTFLOW_DB_NAME").unwrap_or_else(|_| "questflow".to_string()),
            user: std::env::var("QUESTFLOW_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("QUESTFLOW_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("QUESTFLOW_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("QUESTFLOW_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        pool_cfg.timeouts.recycle = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Postgres-backed store.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Safe to run on every start.
    pub async fn migrate(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(MIGRATION_SQL).await?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }

    async fn get_conn(&self) -> QuestResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            tracing::error!("Connection pool error: {:?}", e);
            QuestError::from(StorageError::QueryFailed {
                reason: format!("connection pool: {}", e),
            })
        })
    }
}

// ============================================================================
// ERROR AND ROW MAPPING
// ============================================================================

fn query_failed(operation: &'static str) -> impl Fn(tokio_postgres::Error) -> QuestError {
    move |err| {
        tracing::error!(operation, error = ?err, "Database error");
        StorageError::QueryFailed {
            reason: format!("{}: {}", operation, err),
        }
        .into()
    }
}

fn transaction_failed(operation: &'static str) -> impl Fn(tokio_postgres::Error) -> QuestError {
    move |err| {
        tracing::error!(operation, error = ?err, "Transaction error");
        StorageError::TransactionFailed {
            reason: format!("{}: {}", operation, err),
        }
        .into()
    }
}

fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

fn corrupt(column: &str, reason: impl std::fmt::Display) -> QuestError {
    StorageError::QueryFailed {
        reason: format!("column {}: {}", column, reason),
    }
    .into()
}

fn get_u64(row: &Row, column: &str) -> QuestResult<u64> {
    let value: i64 = row.try_get(column).map_err(|e| corrupt(column, e))?;
    u64::try_from(value).map_err(|e| corrupt(column, e))
}

fn get_user_id(row: &Row, column: &str) -> QuestResult<UserId> {
    let value: String = row.try_get(column).map_err(|e| corrupt(column, e))?;
    UserId::parse(&value).map_err(|e| corrupt(column, e))
}

fn to_i64(value: u64, field: &str) -> QuestResult<i64> {
    i64::try_from(value).map_err(|e| corrupt(field, e))
}

fn row_to_profile(row: &Row) -> QuestResult<UserProfile> {
    Ok(UserProfile {
        id: row.try_get("id").map_err(|e| corrupt("id", e))?,
        user_id: get_user_id(row, "user_id")?,
        display_name: row
            .try_get("display_name")
            .map_err(|e| corrupt("display_name", e))?,
        xp: get_u64(row, "xp")?,
        level: get_u64(row, "level")?,
        quests_completed: get_u64(row, "quests_completed")?,
        social_profiles: row
            .try_get("social_profiles")
            .map_err(|e| corrupt("social_profiles", e))?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("created_at", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("updated_at", e))?,
    })
}

fn row_to_claim(row: &Row) -> QuestResult<ReferralClaim> {
    let amount: i32 = row.try_get("amount").map_err(|e| corrupt("amount", e))?;
    let amount = u64::try_from(amount).map_err(|e| corrupt("amount", e))?;
    Ok(ReferralClaim {
        id: row.try_get("id").map_err(|e| corrupt("id", e))?,
        user_id: get_user_id(row, "user_id")?,
        amount: Ttrust::from_hundredths(amount),
        referral_count: get_u64(row, "referral_count")?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("created_at", e))?,
    })
}

async fn load_ledger<C>(client: &C, user_id: &UserId) -> QuestResult<ReferralLedger>
where
    C: GenericClient + Sync,
{
    let row = client
        .query_one(LEDGER_SQL, &[&user_id.as_str()])
        .await
        .map_err(query_failed("referral_ledger"))?;
    let claimed = get_u64(&row, "claimed")?;
    Ok(ReferralLedger::new(
        get_u64(&row, "referral_count")?,
        Ttrust::from_hundredths(claimed),
    ))
}

// ============================================================================
// STORE IMPLEMENTATION
// ============================================================================

#[async_trait]
impl ReferralStore for DbClient {
    async fn referral_ledger(&self, user_id: &UserId) -> QuestResult<ReferralLedger> {
        let conn = self.get_conn().await?;
        load_ledger(&conn, user_id).await
    }

    async fn referral_event_insert(&self, event: &ReferralEvent) -> QuestResult<()> {
        let conn = self.get_conn().await?;
        let result = conn
            .execute(
                "INSERT INTO referral_events (id, referrer_user_id, referred_user_id, created_at) \
                 VALUES ($1, $2, $3, $4)",
                &[
                    &event.id,
                    &event.referrer_user_id.as_str(),
                    &event.referred_user_id.as_str(),
                    &event.created_at,
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StorageError::Conflict {
                entity: EntityKind::ReferralEvent,
                key: format!("{} -> {}", event.referrer_user_id, event.referred_user_id),
            }
            .into()),
            Err(e) => Err(query_failed("referral_event_insert")(e)),
        }
    }

    async fn referral_claim_list(&self, user_id: &UserId) -> QuestResult<Vec<ReferralClaim>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT id, user_id, amount, referral_count, created_at \
                 FROM referral_claims WHERE user_id = $1 ORDER BY created_at, id",
                &[&user_id.as_str()],
            )
            .await
            .map_err(query_failed("referral_claim_list"))?;
        rows.iter().map(row_to_claim).collect()
    }

    /// Runs in one transaction holding a per-user advisory lock, so a second
    /// claim for the same user waits and then sees the first claim's row.
    async fn referral_claim(
        &self,
        user_id: &UserId,
        table: &MilestoneTable,
    ) -> QuestResult<ReferralClaim> {
        let mut conn = self.get_conn().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(transaction_failed("begin"))?;

        tx.execute(
            "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))",
            &[&user_id.as_str()],
        )
        .await
        .map_err(transaction_failed("advisory_lock"))?;

        // Dropping `tx` on the error path rolls back.
        let plan = plan_claim(&load_ledger(&tx, user_id).await?, table)?;

        let amount = i32::try_from(plan.amount.hundredths()).map_err(|_| {
            QuestError::from(questflow_core::RewardsError::AmountOutOfRange {
                hundredths: plan.amount.hundredths(),
            })
        })?;
        let referral_count = to_i64(plan.referral_count, "referral_count")?;

        let row = tx
            .query_one(
                "INSERT INTO referral_claims (id, user_id, amount, referral_count) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, user_id, amount, referral_count, created_at",
                &[&new_entity_id(), &user_id.as_str(), &amount, &referral_count],
            )
            .await
            .map_err(query_failed("referral_claim_insert"))?;
        let claim = row_to_claim(&row)?;

        tx.commit().await.map_err(transaction_failed("commit"))?;
        Ok(claim)
    }
}

#[async_trait]
impl ProfileStore for DbClient {
    async fn profile_get(&self, user_id: &UserId) -> QuestResult<Option<UserProfile>> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS);
        let row = conn
            .query_opt(sql.as_str(), &[&user_id.as_str()])
            .await
            .map_err(query_failed("profile_get"))?;
        row.as_ref().map(row_to_profile).transpose()
    }

    async fn profile_insert(&self, profile: &UserProfile) -> QuestResult<()> {
        let conn = self.get_conn().await?;
        let result = conn
            .execute(
                "INSERT INTO user_profiles \
                 (id, user_id, display_name, xp, level, quests_completed, social_profiles, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &profile.id,
                    &profile.user_id.as_str(),
                    &profile.display_name,
                    &to_i64(profile.xp, "xp")?,
                    &to_i64(profile.level, "level")?,
                    &to_i64(profile.quests_completed, "quests_completed")?,
                    &profile.social_profiles,
                    &profile.created_at,
                    &profile.updated_at,
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StorageError::Conflict {
                entity: EntityKind::UserProfile,
                key: profile.user_id.to_string(),
            }
            .into()),
            Err(e) => Err(query_failed("profile_insert")(e)),
        }
    }

    async fn profile_record_quest(
        &self,
        user_id: &UserId,
        quest: QuestCompletion,
    ) -> QuestResult<UserProfile> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE user_profiles SET \
                 xp = xp + $2, \
                 level = (xp + $2) / $3, \
                 quests_completed = quests_completed + 1, \
                 updated_at = now() \
             WHERE user_id = $1 \
             RETURNING {}",
            PROFILE_COLUMNS
        );
        let row = conn
            .query_opt(
                sql.as_str(),
                &[
                    &user_id.as_str(),
                    &to_i64(quest.xp(), "xp")?,
                    &to_i64(XP_PER_LEVEL, "xp_per_level")?,
                ],
            )
            .await
            .map_err(query_failed("profile_record_quest"))?;

        match row {
            Some(row) => row_to_profile(&row),
            None => Err(StorageError::NotFound {
                entity: EntityKind::UserProfile,
                key: user_id.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl QuestStore for DbClient {
    async fn ping(&self) -> QuestResult<()> {
        let conn = self.get_conn().await?;
        conn.execute("SELECT 1", &[])
            .await
            .map_err(query_failed("ping"))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "questflow");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_migration_creates_every_table() {
        for table in ["users", "referral_events", "referral_claims", "user_profiles"] {
            assert!(
                MIGRATION_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "missing table {}",
                table
            );
        }
        assert!(MIGRATION_SQL.contains("referral_events_pair_uidx"));
    }

    #[test]
    fn test_pool_creation_is_lazy() {
        // deadpool connects on first checkout, so building a pool needs no server.
        let client = DbClient::from_config(&DbConfig::default());
        assert!(client.is_ok());
    }
}
