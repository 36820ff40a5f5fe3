//! 조회 기간 해석.
//!
//! 같은 조회 기간이라도 용도에 따라 다른 캔들 간격을 사용합니다.
//!
//! | 조회 기간 | 차트 간격 | 분석 간격 | 허용 오차 |
//! |-----------|-----------|-----------|-----------|
//! | ≤ 1h      | 1분       | 5분       | 20분      |
//! | ≤ 6h      | 5분       | 5분       | 20분      |
//! | ≤ 24h     | 15분      | 5분       | 20분      |
//! | ≤ 168h    | 1시간     | 1시간     | 2시간     |
//! | ≤ 720h    | 일봉      | 1시간     | 2시간     |
//! | 그 이상   | 일봉      | 일봉      | 3일       |

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use mover_core::{Candle, KlineInterval, Lookback};

/// 차트 캔들 개수 하한.
pub const MIN_CHART_CANDLES: u32 = 20;
/// 차트 캔들 개수 상한 (API 최대값).
pub const MAX_CHART_CANDLES: u32 = 1000;

/// 1분봉 차트 최대 캔들 수.
const MINUTE_CHART_CAP: f64 = 200.0;

// =============================================================================
// 차트
// =============================================================================

/// 차트 조회 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartParams {
    pub interval: KlineInterval,
    pub limit: u32,
}

/// 차트 간격과 캔들 개수 결정 (화면당 약 100~200개 목표).
pub fn chart_params(lookback: &Lookback) -> ChartParams {
    let hours = lookback.hours();
    let minutes = hours * 60.0;

    let (interval, count) = if hours <= 1.0 {
        (KlineInterval::Minute1, minutes.min(MINUTE_CHART_CAP))
    } else if hours <= 6.0 {
        (KlineInterval::Minute5, minutes / 5.0)
    } else if hours <= 24.0 {
        (KlineInterval::Minute15, minutes / 15.0)
    } else if hours <= 168.0 {
        (KlineInterval::Hour1, hours)
    } else {
        (KlineInterval::Day1, hours / 24.0)
    };

    let limit = (count.ceil() as u32).clamp(MIN_CHART_CANDLES, MAX_CHART_CANDLES);
    ChartParams { interval, limit }
}

// =============================================================================
// 분석
// =============================================================================

/// 변동률 분석용 조회 창.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisWindow {
    /// 과거 캔들 간격
    pub interval: KlineInterval,
    /// 기준 캔들 시각 (분 단위 절삭된 현재 시각 - 조회 기간)
    pub target: DateTime<Utc>,
    /// 허용 오차
    pub tolerance: TimeDelta,
    /// 상장 시각 기준선 (현재 시각 - 조회 기간). 이후 상장 종목은 제외
    pub cutoff: DateTime<Utc>,
}

impl AnalysisWindow {
    /// 조회 기간과 현재 시각으로 분석 창 계산.
    pub fn resolve(lookback: &Lookback, now: DateTime<Utc>) -> Self {
        let interval = Self::interval_for(lookback.hours());
        let duration = lookback.duration();
        let truncated = now.duration_trunc(TimeDelta::minutes(1)).unwrap_or(now);

        Self {
            interval,
            target: truncated - duration,
            tolerance: Self::tolerance_for(interval),
            cutoff: now - duration,
        }
    }

    /// 분석용 캔들 간격.
    pub fn interval_for(hours: f64) -> KlineInterval {
        if hours <= 24.0 {
            KlineInterval::Minute5
        } else if hours <= 720.0 {
            KlineInterval::Hour1
        } else {
            KlineInterval::Day1
        }
    }

    /// 간격별 허용 오차 (캔들 길이의 약 3~4배). 미설정 간격은 1시간.
    pub fn tolerance_for(interval: KlineInterval) -> TimeDelta {
        match interval {
            KlineInterval::Minute5 => TimeDelta::minutes(20),
            KlineInterval::Hour1 => TimeDelta::hours(2),
            KlineInterval::Day1 => TimeDelta::days(3),
            _ => TimeDelta::hours(1),
        }
    }

    /// 허용되는 캔들 시작 시각의 상한 (epoch 밀리초).
    pub fn latest_accepted_millis(&self) -> i64 {
        (self.target + self.tolerance).timestamp_millis()
    }

    /// 캔들이 기준 시각 + 허용 오차 이내에 시작하는지 여부.
    pub fn accepts(&self, candle: &Candle) -> bool {
        candle.time_millis() <= self.latest_accepted_millis()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    fn lookback(hours: f64) -> Lookback {
        Lookback::from_hours(hours).unwrap()
    }

    fn candle_at(time: DateTime<Utc>) -> Candle {
        Candle {
            time: time.timestamp(),
            open: Decimal::ONE,
            high: Decimal::ONE,
            low: Decimal::ONE,
            close: Decimal::ONE,
        }
    }

    #[test]
    fn chart_params_by_threshold() {
        assert_eq!(
            chart_params(&lookback(1.0)),
            ChartParams { interval: KlineInterval::Minute1, limit: 60 }
        );
        assert_eq!(
            chart_params(&lookback(4.0)),
            ChartParams { interval: KlineInterval::Minute5, limit: 48 }
        );
        assert_eq!(
            chart_params(&lookback(24.0)),
            ChartParams { interval: KlineInterval::Minute15, limit: 96 }
        );
        assert_eq!(
            chart_params(&lookback(168.0)),
            ChartParams { interval: KlineInterval::Hour1, limit: 168 }
        );
        assert_eq!(
            chart_params(&lookback(720.0)),
            ChartParams { interval: KlineInterval::Day1, limit: 30 }
        );
    }

    #[test]
    fn chart_limit_is_clamped() {
        // 10분 → 10개지만 하한 20
        assert_eq!(chart_params(&lookback(10.0 / 60.0)).limit, MIN_CHART_CANDLES);
        // 8760시간 → 365개 일봉
        assert_eq!(chart_params(&lookback(8760.0)).limit, 365);
        // 30시간 → 30개 1시간봉
        assert_eq!(chart_params(&lookback(30.0)).limit, 30);
        assert_eq!(chart_params(&lookback(2.5)).limit, 30);
    }

    #[test]
    fn analysis_interval_and_tolerance() {
        assert_eq!(AnalysisWindow::interval_for(0.5), KlineInterval::Minute5);
        assert_eq!(AnalysisWindow::interval_for(24.0), KlineInterval::Minute5);
        assert_eq!(AnalysisWindow::interval_for(48.0), KlineInterval::Hour1);
        assert_eq!(AnalysisWindow::interval_for(720.0), KlineInterval::Hour1);
        assert_eq!(AnalysisWindow::interval_for(721.0), KlineInterval::Day1);

        assert_eq!(
            AnalysisWindow::tolerance_for(KlineInterval::Minute5),
            TimeDelta::minutes(20)
        );
        assert_eq!(
            AnalysisWindow::tolerance_for(KlineInterval::Hour1),
            TimeDelta::hours(2)
        );
        assert_eq!(
            AnalysisWindow::tolerance_for(KlineInterval::Day1),
            TimeDelta::days(3)
        );
        assert_eq!(
            AnalysisWindow::tolerance_for(KlineInterval::Minute15),
            TimeDelta::hours(1)
        );
    }

    #[test]
    fn target_is_minute_truncated() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap();
        let window = AnalysisWindow::resolve(&lookback(4.0), now);

        assert_eq!(window.target, Utc.with_ymd_and_hms(2024, 3, 1, 8, 34, 0).unwrap());
        assert_eq!(window.cutoff, Utc.with_ymd_and_hms(2024, 3, 1, 8, 34, 56).unwrap());
        assert_eq!(window.interval, KlineInterval::Minute5);
    }

    #[test]
    fn candle_beyond_tolerance_is_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let window = AnalysisWindow::resolve(&lookback(48.0), now);
        assert_eq!(window.tolerance, TimeDelta::hours(2));

        let target = window.target;
        assert!(window.accepts(&candle_at(target)));
        assert!(window.accepts(&candle_at(target + TimeDelta::hours(2))));
        assert!(!window.accepts(&candle_at(target + TimeDelta::hours(3))));
        // 기준보다 이른 캔들은 허용
        assert!(window.accepts(&candle_at(target - TimeDelta::hours(5))));
    }
}
