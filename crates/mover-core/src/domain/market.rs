//! 거래소 중립 시장 데이터 타입.
//!
//! 거래소별 serde 타입은 거래소 크레이트 내부에 유지되며,
//! 변환을 거쳐 이 타입으로 전달됩니다.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// 종목 / 시세
// =============================================================================

/// 거래 가능한 무기한 선물 종목.
///
/// 카탈로그 캐시가 만료될 때만 새로 조회되며, 조회 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// 심볼 (예: BTCUSDT)
    pub symbol: String,
    /// 상장 시각 (epoch 밀리초, 0이면 미상)
    pub launch_time: i64,
    /// 최소 호가 단위 (표시 정밀도 용도)
    pub tick_size: Decimal,
}

impl Instrument {
    /// 호가 단위 기준 가격 표시 소수 자릿수.
    pub fn price_precision(&self) -> u32 {
        self.tick_size.normalize().scale()
    }
}

/// 실시간 시세 스냅샷 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// 심볼
    pub symbol: String,
    /// 최근 체결가
    pub last_price: Decimal,
    /// 24시간 변동률 (비율, 0.0534 = 5.34%)
    pub price_24h_pcnt: Decimal,
}

// =============================================================================
// 캔들
// =============================================================================

/// OHLC 캔들.
///
/// 조회 호출 단위로 생성되며 호출 이후에는 캐시되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시각 (unix 초)
    pub time: i64,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
}

impl Candle {
    /// 캔들 시작 시각 (epoch 밀리초).
    pub fn time_millis(&self) -> i64 {
        self.time * 1000
    }
}

/// 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineInterval {
    /// 1분봉
    Minute1,
    /// 5분봉
    Minute5,
    /// 15분봉
    Minute15,
    /// 1시간봉
    Hour1,
    /// 일봉
    Day1,
}

impl KlineInterval {
    /// 거래소 API 표기 (`1`, `5`, `15`, `60`, `D`).
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1",
            Self::Minute5 => "5",
            Self::Minute15 => "15",
            Self::Hour1 => "60",
            Self::Day1 => "D",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn price_precision_follows_tick_size() {
        let instrument = Instrument {
            symbol: "DOGEUSDT".to_string(),
            launch_time: 0,
            tick_size: dec!(0.00001),
        };
        assert_eq!(instrument.price_precision(), 5);

        let instrument = Instrument {
            tick_size: dec!(0.10),
            ..instrument
        };
        assert_eq!(instrument.price_precision(), 1);
    }

    #[test]
    fn interval_api_strings() {
        assert_eq!(KlineInterval::Minute5.as_api_str(), "5");
        assert_eq!(KlineInterval::Hour1.to_string(), "60");
        assert_eq!(KlineInterval::Day1.to_string(), "D");
    }
}
