//! 변동률 분석 실행.
//!
//! # 처리 흐름
//!
//! ```text
//! 카탈로그 + 유니버스 선택 → 심볼 목록
//!   → 시세 스냅샷 (24시간이면 여기서 계산 종료)
//!   → 분석 창 해석 + 스케줄러 + 과거 캔들 조회
//!   → 심볼별 결과 (Priced / Skipped)
//!   → 코호트 집계
//! ```
//!
//! 카탈로그/시세 실패는 실행 전체를 중단시키고,
//! 심볼 단위 실패는 `Skipped` 결과로 남아 ignored 목록에 반영됩니다.

use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use mover_analytics::{
    build_market_cohort, build_watchlist_cohorts, evaluate_candle_path, evaluate_ticker_path,
    index_tickers, listed_after_cutoff, timeframe_label, AnalysisWindow, MarketCohortInput,
};
use mover_core::{
    ChangeRecord, Clock, Cohort, Lookback, SkipReason, SymbolOutcome, UniverseSelection,
};
use mover_exchange::MarketDataProvider;
use serde::Serialize;
use tracing::{debug, info};

use super::scheduler::{process_with_concurrency, ProgressFn};
use super::universe::resolve_universe;
use crate::config::{AnalyzerConfig, DEFAULT_MAJOR_SYMBOLS};
use crate::error::{AnalysisError, Result};
use crate::stats::RunStats;

/// 기본 동시 조회 수.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 30;

/// 분석 요청.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// 조회 기간
    pub lookback: Lookback,
    /// 분석 대상
    pub selection: UniverseSelection,
}

/// 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// 타임프레임 라벨
    pub timeframe: String,
    /// 조회 기간
    pub lookback: Lookback,
    /// 코호트 (시장 1개 또는 관심종목 long/short 2개)
    pub cohorts: Vec<Cohort>,
    /// 실행 통계
    pub stats: RunStats,
}

/// 변동률 분석기.
///
/// Provider와 시계를 주입받아 한 번의 분석을 처음부터 끝까지 수행합니다.
pub struct MoversAnalyzer {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn Clock>,
    concurrency_limit: usize,
    quote_coin: String,
    major_symbols: Vec<String>,
}

impl MoversAnalyzer {
    /// 기본 설정으로 분석기 생성.
    pub fn new(provider: Arc<dyn MarketDataProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            clock,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            quote_coin: "USDT".to_string(),
            major_symbols: mover_core::parse_exclusion_list(DEFAULT_MAJOR_SYMBOLS),
        }
    }

    /// 설정 파일 값으로 분석기 생성.
    pub fn from_config(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn Clock>,
        config: &AnalyzerConfig,
    ) -> Self {
        Self::new(provider, clock)
            .with_concurrency_limit(config.fetch.concurrency_limit)
            .with_quote_coin(&config.exchange.quote_coin)
            .with_major_symbols(config.universe.major_symbols.clone())
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_quote_coin(mut self, quote_coin: impl Into<String>) -> Self {
        self.quote_coin = quote_coin.into();
        self
    }

    pub fn with_major_symbols(mut self, majors: Vec<String>) -> Self {
        self.major_symbols = majors;
        self
    }

    /// 분석 1회 실행.
    ///
    /// `on_progress`는 과거 캔들 조회 단계에서만 호출됩니다 (24시간 조회는 호출 없음).
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<AnalysisReport> {
        let started = Instant::now();
        let now = self.clock.now();
        let lookback = request.lookback;
        let window = AnalysisWindow::resolve(&lookback, now);
        let timeframe = timeframe_label(lookback.hours());

        info!(
            provider = self.provider.provider_name(),
            timeframe = %timeframe,
            interval = %window.interval,
            target = %window.target,
            "변동률 분석 시작"
        );

        let instruments = self
            .provider
            .fetch_instruments()
            .await
            .map_err(AnalysisError::Catalog)?;

        let universe = resolve_universe(
            &request.selection,
            &instruments,
            &self.major_symbols,
            &self.quote_coin,
        );
        if universe.is_empty() {
            return Err(AnalysisError::NoSymbols);
        }

        let tickers = self
            .provider
            .fetch_tickers()
            .await
            .map_err(AnalysisError::Ticker)?;
        let ticker_index = index_tickers(&tickers);
        let launch_times: HashMap<&str, i64> = instruments
            .iter()
            .map(|i| (i.symbol.as_str(), i.launch_time))
            .collect();

        let mut stats = RunStats::new(universe.len());
        let candle_requests = AtomicUsize::new(0);

        let outcomes: Vec<SymbolOutcome> = if lookback.is_24h() {
            universe
                .iter()
                .map(|symbol| {
                    let launch = launch_times.get(symbol.as_str()).copied().unwrap_or(0);
                    if listed_after_cutoff(launch, window.cutoff) {
                        SymbolOutcome::skipped(symbol.as_str(), SkipReason::ListedAfterCutoff)
                    } else {
                        evaluate_ticker_path(symbol, ticker_index.get(symbol.as_str()).copied())
                    }
                })
                .collect()
        } else {
            let provider = self.provider.as_ref();
            let ticker_index = &ticker_index;
            let launch_times = &launch_times;
            let window = &window;
            let candle_requests = &candle_requests;

            process_with_concurrency(
                universe.clone(),
                self.concurrency_limit,
                move |symbol: String| async move {
                    let launch = launch_times.get(symbol.as_str()).copied().unwrap_or(0);
                    if listed_after_cutoff(launch, window.cutoff) {
                        return Ok::<_, Infallible>(Some(SymbolOutcome::skipped(
                            symbol,
                            SkipReason::ListedAfterCutoff,
                        )));
                    }
                    let Some(ticker) = ticker_index.get(symbol.as_str()).copied() else {
                        return Ok(Some(SymbolOutcome::skipped(symbol, SkipReason::MissingTicker)));
                    };

                    candle_requests.fetch_add(1, Ordering::Relaxed);
                    let candle = provider
                        .fetch_kline_at(&symbol, window.interval, window.target)
                        .await;
                    Ok(Some(evaluate_candle_path(
                        &symbol,
                        Some(ticker),
                        candle.as_ref(),
                        window,
                    )))
                },
                on_progress,
            )
            .await
        };

        for outcome in &outcomes {
            if let Some(reason) = outcome.skip_reason() {
                debug!(symbol = outcome.symbol(), reason = %reason, "심볼 제외");
            }
            stats.record(outcome);
        }
        stats.candle_requests = candle_requests.into_inner();

        let records: Vec<ChangeRecord> = outcomes
            .iter()
            .filter_map(|o| o.record().cloned())
            .collect();

        let cohorts = match &request.selection {
            UniverseSelection::Market { excluded_roots } => {
                let input = MarketCohortInput {
                    requested: &universe,
                    excluded_roots,
                    majors: &self.major_symbols,
                    quote_coin: &self.quote_coin,
                    timeframe: &timeframe,
                };
                vec![build_market_cohort(&input, &records)]
            }
            UniverseSelection::Watchlist(watchlist) => {
                build_watchlist_cohorts(watchlist, &records, &timeframe)
            }
        };

        stats.elapsed = started.elapsed();
        stats.log_summary(&format!("{timeframe} 변동률 분석"));

        Ok(AnalysisReport {
            timeframe,
            lookback,
            cohorts,
            stats,
        })
    }
}
