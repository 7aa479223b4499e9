use common::models::Account;
use sqlx::PgPool;

pub struct AccountsRepository;

impl AccountsRepository {
    pub async fn active(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT account_id, account_name FROM accounts WHERE is_active ORDER BY account_id",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Account { id, name })
            .collect())
    }
}
