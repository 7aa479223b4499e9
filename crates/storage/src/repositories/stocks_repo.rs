use sqlx::PgPool;

pub struct StocksRepository;

impl StocksRepository {
    pub async fn active_tickers(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT ticker FROM stocks WHERE is_active ORDER BY ticker")
            .fetch_all(pool)
            .await
    }
}
