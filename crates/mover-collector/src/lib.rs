//! 무기한 선물 변동률 분석 실행기.
//!
//! 거래소 데이터 조회, 동시성 제한 스케줄링, 코호트 집계를 하나의 실행 흐름으로 묶고
//! `mover` CLI에 결과를 제공합니다.

pub mod config;
pub mod error;
pub mod modules;
pub mod output;
pub mod stats;

pub use config::AnalyzerConfig;
pub use error::{AnalysisError, Result};
pub use modules::{AnalysisReport, AnalysisRequest, ChartSeries, MoversAnalyzer};
pub use output::OutputFormat;
pub use stats::RunStats;
