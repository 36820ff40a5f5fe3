//! 분석 실행 통계.

use std::time::Duration;

use mover_core::{SkipReason, SymbolOutcome};
use serde::{Deserialize, Serialize};

/// 분석 실행 통계
///
/// 화면에 보이는 ignored 목록은 사유를 구분하지 않으며,
/// 사유별 개수는 이 통계로만 남습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// 요청 심볼 수
    pub requested: usize,
    /// 변동률 계산 성공 수
    pub priced: usize,
    /// 조회 구간 이후 상장
    pub listed_after_cutoff: usize,
    /// 시세 없음
    pub missing_ticker: usize,
    /// 캔들 없음 (데이터 없음 또는 재시도 소진)
    pub no_candle: usize,
    /// 허용 오차 초과 캔들
    pub stale_candle: usize,
    /// 기준 가격 0
    pub zero_reference: usize,
    /// 과거 캔들 조회 횟수
    pub candle_requests: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunStats {
    /// 새 통계 객체 생성
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// 심볼 처리 결과 반영
    pub fn record(&mut self, outcome: &SymbolOutcome) {
        match outcome.skip_reason() {
            None => self.priced += 1,
            Some(SkipReason::ListedAfterCutoff) => self.listed_after_cutoff += 1,
            Some(SkipReason::MissingTicker) => self.missing_ticker += 1,
            Some(SkipReason::NoCandle) => self.no_candle += 1,
            Some(SkipReason::StaleCandle) => self.stale_candle += 1,
            Some(SkipReason::ZeroReference) => self.zero_reference += 1,
        }
    }

    /// 제외된 심볼 총합
    pub fn skipped(&self) -> usize {
        self.listed_after_cutoff
            + self.missing_ticker
            + self.no_candle
            + self.stale_candle
            + self.zero_reference
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            (self.priced as f64 / self.requested as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            requested = self.requested,
            priced = self.priced,
            skipped = self.skipped(),
            listed_after_cutoff = self.listed_after_cutoff,
            missing_ticker = self.missing_ticker,
            no_candle = self.no_candle,
            stale_candle = self.stale_candle,
            zero_reference = self.zero_reference,
            candle_requests = self.candle_requests,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "분석 완료"
        );
    }
}
