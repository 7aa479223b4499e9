use chrono::{DateTime, Utc};
use common::models::SignalInsert;
use sqlx::PgPool;

pub struct SignalsRepository;

/// `(ticker, signal, target_price, created_at)` as stored.
pub type SignalRow = (String, String, f64, DateTime<Utc>);

impl SignalsRepository {
    pub async fn insert(pool: &PgPool, signal: &SignalInsert) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
                INSERT INTO trade_signals (created_at, ticker, signal, target_price)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(signal.created_at)
        .bind(&signal.ticker)
        .bind(signal.kind.as_str())
        .bind(signal.price)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn fetch_today(pool: &PgPool) -> Result<Vec<SignalRow>, sqlx::Error> {
        sqlx::query_as::<_, SignalRow>(
            r#"
                SELECT ticker, signal, target_price, created_at
                FROM trade_signals
                WHERE created_at::date = CURRENT_DATE
                ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn delete_older_than(pool: &PgPool, days: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM trade_signals WHERE created_at < NOW() - make_interval(days => $1)",
        )
        .bind(days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_today(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trade_signals WHERE created_at::date = CURRENT_DATE")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
