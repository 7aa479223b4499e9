pub mod account;
pub mod analysis;
pub mod signal;
pub mod transaction;

pub use account::Account;
pub use analysis::AnalysisRow;
pub use signal::{Signal, SignalInsert, SignalKind, UnknownSignalKind};
pub use transaction::{TradeAttempt, TradeDecision};
