use chrono::{DateTime, Utc};
use common::models::TradeAttempt;
use sqlx::PgPool;
use uuid::Uuid;

pub struct TransactionsRepository;

impl TransactionsRepository {
    pub async fn insert(
        pool: &PgPool,
        attempt: &TradeAttempt,
        transaction_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
                INSERT INTO transaction_logs (
                    transaction_id, account_id, ticker, action, price, created_at, status, error_message
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(transaction_id)
        .bind(&attempt.account_id)
        .bind(&attempt.ticker)
        .bind(attempt.action.as_str())
        .bind(attempt.price)
        .bind(at)
        .bind(attempt.decision.status())
        .bind(attempt.reason.as_deref())
        .execute(pool)
        .await?;
        Ok(())
    }
}
