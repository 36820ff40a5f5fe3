//! 차트용 캔들 시계열 조회.

use mover_analytics::chart_params;
use mover_core::{Candle, KlineInterval, Lookback};
use mover_exchange::MarketDataProvider;
use serde::Serialize;
use tracing::info;

use crate::error::{AnalysisError, Result};

/// 차트 시계열.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub symbol: String,
    pub interval: KlineInterval,
    pub limit: u32,
    /// 시간 오름차순 캔들
    pub candles: Vec<Candle>,
}

/// 조회 기간에 맞는 간격/개수로 차트 캔들 조회.
///
/// 재시도 후에도 실패하면 빈 차트 대신 [`AnalysisError::Chart`]를 반환합니다.
pub async fn load_chart(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    lookback: &Lookback,
) -> Result<ChartSeries> {
    let symbol = symbol.trim().to_uppercase();
    let params = chart_params(lookback);

    let candles = provider
        .fetch_kline_series(&symbol, params.interval, params.limit)
        .await
        .map_err(|source| AnalysisError::Chart {
            symbol: symbol.clone(),
            source,
        })?;

    info!(
        symbol = %symbol,
        interval = %params.interval,
        requested = params.limit,
        received = candles.len(),
        "차트 캔들 조회 완료"
    );

    Ok(ChartSeries {
        symbol,
        interval: params.interval,
        limit: params.limit,
        candles,
    })
}
