pub mod accounts_repo;
pub mod signals_repo;
pub mod stocks_repo;
pub mod transactions_repo;

pub use accounts_repo::AccountsRepository;
pub use signals_repo::{SignalRow, SignalsRepository};
pub use stocks_repo::StocksRepository;
pub use transactions_repo::TransactionsRepository;
