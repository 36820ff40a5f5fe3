//! 변동률 분석 계산 모듈.
//!
//! 네트워크 I/O 없이 순수 계산만 담당합니다.
//!
//! - [`window`]: 조회 기간 → 캔들 간격/기준 시각/허용 오차
//! - [`change`]: 시세와 캔들로부터 심볼별 변동률 계산
//! - [`aggregator`]: 코호트 통계, 순위 테이블, ignored 집합
//! - [`label`]: 타임프레임 표시 문자열

pub mod aggregator;
pub mod change;
pub mod label;
pub mod window;

pub use aggregator::{
    build_market_cohort, build_watchlist_cohorts, cohort_stats, mean, median, rank,
    MarketCohortInput, TABLE_SIZE,
};
pub use change::{
    candle_change_percent, evaluate_candle_path, evaluate_ticker_path, index_tickers,
    listed_after_cutoff, round_percent, ticker_change_percent,
};
pub use label::timeframe_label;
pub use window::{chart_params, AnalysisWindow, ChartParams};
