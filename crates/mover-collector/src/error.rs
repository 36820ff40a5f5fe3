//! 에러 타입 정의.

use mover_core::ValidationError;
use mover_exchange::ExchangeError;
use thiserror::Error;

/// 분석 실행 에러.
///
/// 심볼 단위의 누락(캔들 없음, 허용 오차 초과 등)은 에러가 아니라
/// `SymbolOutcome::Skipped` 값으로 전달됩니다.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 입력 검증 실패 (네트워크 호출 전)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// 종목 카탈로그 조회 실패 (실행 전체 중단)
    #[error("Instrument catalog fetch failed: {0}")]
    Catalog(#[source] ExchangeError),

    /// 시세 스냅샷 조회 실패 (실행 전체 중단)
    #[error("Ticker snapshot fetch failed: {0}")]
    Ticker(#[source] ExchangeError),

    /// 차트 시계열 조회 실패 (재시도 소진)
    #[error("Chart fetch failed for {symbol}: {source}")]
    Chart {
        symbol: String,
        #[source]
        source: ExchangeError,
    },

    /// 분석할 심볼이 없음
    #[error("No symbols to analyze")]
    NoSymbols,

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 파일 입출력 에러
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 결과 직렬화 에러
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, AnalysisError>;
