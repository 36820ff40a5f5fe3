//! 분석 결과 타입.
//!
//! ```text
//! SymbolOutcome (심볼별 처리 결과)
//! ├── Priced(ChangeRecord)     → 코호트 구성원
//! └── Skipped { reason }       → ignored_symbols
//!
//! Cohort
//! ├── members / stats          // 통계 대상 변동률
//! ├── tables                   // 순위 테이블 (1개 또는 상승/하락 2개)
//! ├── major_movers             // 주요 종목 (시장 코호트 전용)
//! └── ignored_symbols          // 요청했지만 결과가 없는 심볼
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 심볼 하나의 변동률.
///
/// 한 번의 분석 실행 동안만 존재하며 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// 심볼
    pub symbol: String,
    /// 변동률 (%, 소수 둘째 자리 반올림)
    pub change_percent: Decimal,
}

impl ChangeRecord {
    /// 새 변동률 레코드 생성.
    pub fn new(symbol: impl Into<String>, change_percent: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            change_percent,
        }
    }
}

/// 심볼이 결과에서 빠진 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 조회 구간 시작 이후 상장 (조회 전 제외)
    ListedAfterCutoff,
    /// 시세 스냅샷에 심볼 없음
    MissingTicker,
    /// 과거 캔들을 얻지 못함 (데이터 없음 또는 재시도 소진)
    NoCandle,
    /// 캔들 시각이 허용 오차를 벗어남
    StaleCandle,
    /// 기준 가격이 0
    ZeroReference,
}

impl SkipReason {
    /// 로그용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListedAfterCutoff => "listed_after_cutoff",
            Self::MissingTicker => "missing_ticker",
            Self::NoCandle => "no_candle",
            Self::StaleCandle => "stale_candle",
            Self::ZeroReference => "zero_reference",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 심볼별 처리 결과.
///
/// 누락 사유를 명시적인 값으로 남겨 ignored 계산과 통계가 같은 신호를 사용합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    /// 변동률 계산 성공
    Priced(ChangeRecord),
    /// 결과에서 제외
    Skipped {
        /// 심볼
        symbol: String,
        /// 제외 사유
        reason: SkipReason,
    },
}

impl SymbolOutcome {
    /// 제외 결과 생성.
    pub fn skipped(symbol: impl Into<String>, reason: SkipReason) -> Self {
        Self::Skipped {
            symbol: symbol.into(),
            reason,
        }
    }

    /// 대상 심볼.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Priced(record) => &record.symbol,
            Self::Skipped { symbol, .. } => symbol,
        }
    }

    /// 성공한 경우 변동률 레코드.
    pub fn record(&self) -> Option<&ChangeRecord> {
        match self {
            Self::Priced(record) => Some(record),
            Self::Skipped { .. } => None,
        }
    }

    /// 제외된 경우 사유.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Priced(_) => None,
            Self::Skipped { reason, .. } => Some(*reason),
        }
    }
}

/// 코호트 집계 통계.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortStats {
    /// 산술 평균 (빈 코호트는 0)
    pub mean: Decimal,
    /// 중앙값 (빈 코호트는 0)
    pub median: Decimal,
    /// 상승 종목 수 (변동률 > 0)
    pub gainer_count: usize,
    /// 하락 종목 수 (변동률 < 0)
    pub loser_count: usize,
}

/// 순위 테이블 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankedTableKind {
    /// 10개 이하 코호트의 전체 순위 (내림차순)
    Performance,
    /// 상위 10개 (내림차순)
    Gainers,
    /// 하위 10개 (오름차순, 가장 큰 하락부터)
    Losers,
}

impl RankedTableKind {
    /// 테이블 제목.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Gainers => "Top 10 Gainers",
            Self::Losers => "Top 10 Losers",
        }
    }
}

/// 순위 테이블.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTable {
    /// 테이블 종류
    pub kind: RankedTableKind,
    /// 순위 순서의 행
    pub rows: Vec<ChangeRecord>,
}

/// 코호트 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortKind {
    /// 전체 시장
    Market,
    /// long 관심종목
    LongWatchlist,
    /// short 관심종목
    ShortWatchlist,
}

impl CohortKind {
    /// 표시 이름.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Market => "Full Market Analysis",
            Self::LongWatchlist => "Long Watchlist",
            Self::ShortWatchlist => "Short Watchlist",
        }
    }
}

/// 함께 분석/순위화되는 심볼 그룹의 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    /// 코호트 종류
    pub kind: CohortKind,
    /// 표시 이름
    pub label: String,
    /// 타임프레임 라벨 (예: "4 Hours")
    pub timeframe: String,
    /// 통계 대상 레코드 (유니버스 순서)
    pub members: Vec<ChangeRecord>,
    /// 결과가 없는 요청 심볼 (제외 사유 구분 없음)
    pub ignored_symbols: Vec<String>,
    /// 순위 테이블
    pub tables: Vec<RankedTable>,
    /// 집계 통계
    pub stats: CohortStats,
    /// 주요 종목 변동률 (시장 코호트 전용)
    pub major_movers: Vec<ChangeRecord>,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn outcome_accessors() {
        let priced = SymbolOutcome::Priced(ChangeRecord::new("BTCUSDT", dec!(1.25)));
        assert_eq!(priced.symbol(), "BTCUSDT");
        assert_eq!(priced.record().map(|r| r.change_percent), Some(dec!(1.25)));
        assert_eq!(priced.skip_reason(), None);

        let skipped = SymbolOutcome::skipped("NEWUSDT", SkipReason::ListedAfterCutoff);
        assert_eq!(skipped.symbol(), "NEWUSDT");
        assert!(skipped.record().is_none());
        assert_eq!(skipped.skip_reason(), Some(SkipReason::ListedAfterCutoff));
    }

    #[test]
    fn skip_reason_serializes_snake_case() {
        let json = serde_json::to_string(&SkipReason::StaleCandle).unwrap();
        assert_eq!(json, "\"stale_candle\"");
    }
}
