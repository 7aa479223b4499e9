pub mod execution_service;
pub mod market_clock;
