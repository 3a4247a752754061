//! PostgreSQL implementation of EntitlementRepository.
//!
//! One row per user. The payment history and the cancellation request live
//! in JSONB columns next to the scalar entitlement fields, so a record is
//! always read and written as a unit.

use crate::domain::entitlement::{CancellationRequest, EmbeddedPaymentEntry, Plan, UserEntitlement};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::EntitlementRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

const SELECT_COLUMNS: &str = r#"
    SELECT user_id, user_name, user_email, plan, is_pro,
           trial_start_date, trial_end_date, trial_redeemed_at, subscription_end_date,
           payment_history, cancellation_request, version, created_at, updated_at
    FROM user_entitlements
"#;

/// PostgreSQL implementation of the EntitlementRepository port.
pub struct PostgresEntitlementRepository {
    pool: PgPool,
}

impl PostgresEntitlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, predicate: &str) -> Result<Vec<UserEntitlement>, DomainError> {
        let sql = format!("{SELECT_COLUMNS} {predicate} ORDER BY created_at ASC");
        let rows: Vec<EntitlementRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list entitlements", e))?;

        rows.into_iter().map(UserEntitlement::try_from).collect()
    }
}

/// Database row representation of an entitlement record.
#[derive(Debug, sqlx::FromRow)]
struct EntitlementRow {
    user_id: String,
    user_name: String,
    user_email: String,
    plan: String,
    is_pro: bool,
    trial_start_date: Option<DateTime<Utc>>,
    trial_end_date: Option<DateTime<Utc>>,
    trial_redeemed_at: Option<DateTime<Utc>>,
    subscription_end_date: Option<DateTime<Utc>>,
    payment_history: Json<Vec<EmbeddedPaymentEntry>>,
    cancellation_request: Option<Json<CancellationRequest>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EntitlementRow> for UserEntitlement {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        let plan = Plan::parse(&row.plan).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid plan value: {}", row.plan),
            )
        })?;
        let version = u64::try_from(row.version).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid version value: {}", row.version),
            )
        })?;

        Ok(UserEntitlement {
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            user_name: row.user_name,
            user_email: row.user_email,
            plan,
            is_pro: row.is_pro,
            trial_start_date: row.trial_start_date.map(Timestamp::from_datetime),
            trial_end_date: row.trial_end_date.map(Timestamp::from_datetime),
            trial_redeemed_at: row.trial_redeemed_at.map(Timestamp::from_datetime),
            subscription_end_date: row.subscription_end_date.map(Timestamp::from_datetime),
            payment_history: row.payment_history.0,
            cancellation_request: row.cancellation_request.map(|json| json.0),
            version,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn version_param(version: u64) -> Result<i64, DomainError> {
    i64::try_from(version).map_err(|_| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("Version {} is out of range", version),
        )
    })
}

#[async_trait]
impl EntitlementRepository for PostgresEntitlementRepository {
    async fn create(&self, record: &UserEntitlement) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_entitlements (
                user_id, user_name, user_email, plan, is_pro,
                trial_start_date, trial_end_date, trial_redeemed_at, subscription_end_date,
                payment_history, cancellation_request, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(&record.user_name)
        .bind(&record.user_email)
        .bind(record.plan.as_str())
        .bind(record.is_pro)
        .bind(record.trial_start_date.map(|t| *t.as_datetime()))
        .bind(record.trial_end_date.map(|t| *t.as_datetime()))
        .bind(record.trial_redeemed_at.map(|t| *t.as_datetime()))
        .bind(record.subscription_end_date.map(|t| *t.as_datetime()))
        .bind(Json(&record.payment_history))
        .bind(record.cancellation_request.as_ref().map(Json))
        .bind(version_param(record.version)?)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("user_entitlements_pkey") {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        format!("Entitlement for {} already exists", record.user_id),
                    );
                }
            }
            db_error("Failed to create entitlement", e)
        })?;

        Ok(())
    }

    async fn update(&self, record: &UserEntitlement) -> Result<u64, DomainError> {
        let new_version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE user_entitlements SET
                user_name = $2,
                user_email = $3,
                plan = $4,
                is_pro = $5,
                trial_start_date = $6,
                trial_end_date = $7,
                trial_redeemed_at = $8,
                subscription_end_date = $9,
                payment_history = $10,
                cancellation_request = $11,
                updated_at = $12,
                version = version + 1
            WHERE user_id = $1 AND version = $13
            RETURNING version
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(&record.user_name)
        .bind(&record.user_email)
        .bind(record.plan.as_str())
        .bind(record.is_pro)
        .bind(record.trial_start_date.map(|t| *t.as_datetime()))
        .bind(record.trial_end_date.map(|t| *t.as_datetime()))
        .bind(record.trial_redeemed_at.map(|t| *t.as_datetime()))
        .bind(record.subscription_end_date.map(|t| *t.as_datetime()))
        .bind(Json(&record.payment_history))
        .bind(record.cancellation_request.as_ref().map(Json))
        .bind(record.updated_at.as_datetime())
        .bind(version_param(record.version)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update entitlement", e))?;

        if let Some(version) = new_version {
            return u64::try_from(version).map_err(|_| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid version value: {}", version),
                )
            });
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_entitlements WHERE user_id = $1)")
                .bind(record.user_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to update entitlement", e))?;

        if exists {
            Err(DomainError::conflict(format!(
                "Entitlement for {} was modified concurrently",
                record.user_id
            )))
        } else {
            Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("No entitlement for {}", record.user_id),
            ))
        }
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserEntitlement>, DomainError> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = $1");
        let row: Option<EntitlementRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find entitlement", e))?;

        row.map(UserEntitlement::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<UserEntitlement>, DomainError> {
        self.fetch_where("").await
    }

    async fn list_with_pending_payments(&self) -> Result<Vec<UserEntitlement>, DomainError> {
        self.fetch_where(
            r#"WHERE payment_history @> '[{"type": "subscription", "status": "pending"}]'::jsonb"#,
        )
        .await
    }

    async fn list_with_pending_cancellations(
        &self,
    ) -> Result<Vec<UserEntitlement>, DomainError> {
        self.fetch_where("WHERE cancellation_request ->> 'status' = 'pending'")
            .await
    }
}
