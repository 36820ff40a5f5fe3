//! 거래소 REST 커넥터.

pub mod bybit;
