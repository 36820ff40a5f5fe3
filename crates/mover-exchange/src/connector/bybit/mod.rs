//! Bybit v5 공개 시장 데이터 API.

mod client;

pub use client::{
    BybitClient, BybitConfig, BybitInstrument, BybitPriceFilter, BybitTicker, InstrumentsPage,
    KlinePage, KlineQuery, TickersPage, DEFAULT_BASE_URL,
};
pub(crate) use client::parse_candle;
