//! 분석 실행 모듈.

pub mod analysis;
pub mod chart;
pub mod scheduler;
pub mod universe;

pub use analysis::{AnalysisReport, AnalysisRequest, MoversAnalyzer, DEFAULT_CONCURRENCY_LIMIT};
pub use chart::{load_chart, ChartSeries};
pub use scheduler::{process_with_concurrency, ProgressFn};
pub use universe::{resolve_universe, select_market_symbols};
