use common::identity::IdentityError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Could not obtain database access token: {0}")]
    Token(#[from] IdentityError),
    #[error("Unreadable row in {table}: {detail}")]
    CorruptRow { table: &'static str, detail: String },
}
