//! PostgreSQL implementation of PaymentRecordRepository.

use crate::domain::entitlement::PaidPlan;
use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentEntryId, PaymentRecordId, Timestamp, UserId,
};
use crate::domain::ledger::{PaymentRecord, RecordStatus};
use crate::ports::PaymentRecordRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PaymentRecordRepository port.
pub struct PostgresPaymentRecordRepository {
    pool: PgPool,
}

impl PostgresPaymentRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a canonical payment record.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRecordRow {
    id: Uuid,
    entry_id: Option<Uuid>,
    user_id: String,
    user_name: String,
    user_email: String,
    transaction_id: String,
    method: String,
    amount: i64,
    status: String,
    plan_type: Option<String>,
    date: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRecordRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRecordRow) -> Result<Self, Self::Error> {
        let status = RecordStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", row.status),
            )
        })?;
        let plan_type = row
            .plan_type
            .as_deref()
            .map(|s| {
                PaidPlan::parse(s).ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid plan_type value: {}", s),
                    )
                })
            })
            .transpose()?;

        Ok(PaymentRecord {
            id: PaymentRecordId::from_uuid(row.id),
            entry_id: row.entry_id.map(PaymentEntryId::from_uuid),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            user_name: row.user_name,
            user_email: row.user_email,
            transaction_id: row.transaction_id,
            method: row.method,
            amount: row.amount,
            status,
            plan_type,
            date: Timestamp::from_datetime(row.date),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn not_found(id: &PaymentRecordId) -> DomainError {
    DomainError::new(
        ErrorCode::PaymentRecordNotFound,
        format!("Payment record {} not found", id),
    )
}

#[async_trait]
impl PaymentRecordRepository for PostgresPaymentRecordRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_records (
                id, entry_id, user_id, user_name, user_email, transaction_id,
                method, amount, status, plan_type, date, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.entry_id.map(|id| *id.as_uuid()))
        .bind(record.user_id.as_str())
        .bind(&record.user_name)
        .bind(&record.user_email)
        .bind(&record.transaction_id)
        .bind(&record.method)
        .bind(record.amount)
        .bind(record.status.as_str())
        .bind(record.plan_type.map(|p| p.to_string()))
        .bind(record.date.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert payment record", e))?;

        Ok(())
    }

    async fn find_by_entry(
        &self,
        user_id: &UserId,
        entry_id: &PaymentEntryId,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRecordRow> = sqlx::query_as(
            r#"
            SELECT id, entry_id, user_id, user_name, user_email, transaction_id,
                   method, amount, status, plan_type, date, updated_at
            FROM payment_records
            WHERE user_id = $1 AND entry_id = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(entry_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find payment record", e))?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn find_by_transaction(
        &self,
        user_id: &UserId,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRecordRow> = sqlx::query_as(
            r#"
            SELECT id, entry_id, user_id, user_name, user_email, transaction_id,
                   method, amount, status, plan_type, date, updated_at
            FROM payment_records
            WHERE user_id = $1 AND transaction_id = $2
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find payment record", e))?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: &PaymentRecordId,
        status: RecordStatus,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE payment_records SET status = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update payment record", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: &PaymentRecordId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM payment_records WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete payment record", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<PaymentRecord>, DomainError> {
        let rows: Vec<PaymentRecordRow> = sqlx::query_as(
            r#"
            SELECT id, entry_id, user_id, user_name, user_email, transaction_id,
                   method, amount, status, plan_type, date, updated_at
            FROM payment_records
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list payment records", e))?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}
