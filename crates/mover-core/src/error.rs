//! 입력 검증 에러.

use thiserror::Error;

/// 분석 시작 전 사용자 입력 검증 에러.
///
/// 네트워크 호출 이전에 발생하며, 발생 즉시 사용자에게 표시됩니다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// 타임프레임 값이 양수가 아니거나 숫자가 아님
    #[error("Timeframe must be positive: {0}")]
    InvalidTimeframe(String),

    /// 타임프레임이 최대 허용 기간(1년)을 초과
    #[error("Timeframe cannot exceed 1 year ({hours} hours requested)")]
    TimeframeTooLong { hours: f64 },

    /// 지원하지 않는 타임프레임 단위
    #[error("Invalid timeframe unit: {0} (expected m, h or d)")]
    InvalidUnit(String),

    /// 관심종목 JSON 형식 오류
    #[error("Invalid watchlist: {0}")]
    InvalidWatchlist(String),

    /// long/short 관심종목이 모두 없음
    #[error("Watchlist must contain \"long_watchlist\" or \"short_watchlist\"")]
    EmptyWatchlist,
}
