//! 분석 대상 유니버스와 조회 기간.
//!
//! 외부 입력(타임프레임 문자열, 관심종목 JSON)은 이 모듈의 타입으로 검증된 뒤에만
//! 분석 파이프라인에 들어갑니다.

use std::{collections::HashSet, str::FromStr};

use chrono::TimeDelta;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// 최대 조회 기간 (시간, 약 1년).
pub const MAX_LOOKBACK_HOURS: f64 = 8760.0;

// =============================================================================
// Lookback
// =============================================================================

/// 검증된 조회 기간 (양수, 최대 8760시간).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lookback {
    hours: f64,
}

impl Lookback {
    /// 시간 단위 조회 기간 생성.
    pub fn from_hours(hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(ValidationError::InvalidTimeframe(hours.to_string()));
        }
        if hours > MAX_LOOKBACK_HOURS {
            return Err(ValidationError::TimeframeTooLong { hours });
        }
        Ok(Self { hours })
    }

    /// 값과 단위(`m`, `h`, `d`)로부터 조회 기간 생성.
    pub fn parse(value: &str, unit: &str) -> Result<Self, ValidationError> {
        let num: f64 = value
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidTimeframe(value.to_string()))?;
        if !num.is_finite() || num <= 0.0 {
            return Err(ValidationError::InvalidTimeframe(value.to_string()));
        }

        let hours = match unit.trim() {
            "m" => num / 60.0,
            "h" => num,
            "d" => num * 24.0,
            other => return Err(ValidationError::InvalidUnit(other.to_string())),
        };

        Self::from_hours(hours)
    }

    /// 시간 단위 값.
    pub fn hours(&self) -> f64 {
        self.hours
    }

    /// 정확히 24시간인지 여부 (시세 스냅샷 경로 사용).
    pub fn is_24h(&self) -> bool {
        self.hours == 24.0
    }

    /// 조회 기간 길이.
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::milliseconds((self.hours * 3_600_000.0).round() as i64)
    }
}

impl FromStr for Lookback {
    type Err = ValidationError;

    /// `"90m"`, `"4h"`, `"7d"` 형식 파싱. 단위가 없으면 시간으로 간주합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.char_indices().last() {
            Some((idx, c)) if c.is_ascii_alphabetic() => {
                Self::parse(&s[..idx], &c.to_ascii_lowercase().to_string())
            }
            Some(_) => Self::parse(s, "h"),
            None => Err(ValidationError::InvalidTimeframe(String::new())),
        }
    }
}

// =============================================================================
// Watchlist
// =============================================================================

/// 검증된 관심종목 목록.
///
/// 원본 JSON은 `long_watchlist`, `short_watchlist` 두 개의 선택적 객체를 가지며,
/// 각 객체의 키가 심볼입니다 (값은 분석에 사용하지 않음).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Watchlist {
    long: Option<Vec<String>>,
    short: Option<Vec<String>>,
}

impl Watchlist {
    /// long/short 심볼 목록으로 직접 생성.
    pub fn new(long: Option<Vec<String>>, short: Option<Vec<String>>) -> Result<Self, ValidationError> {
        if long.is_none() && short.is_none() {
            return Err(ValidationError::EmptyWatchlist);
        }
        Ok(Self { long, short })
    }

    /// JSON 문자열 파싱 및 검증.
    pub fn from_json_str(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationError::InvalidWatchlist(e.to_string()))?;
        Self::from_value(&value)
    }

    /// JSON 값 검증.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidationError::InvalidWatchlist("Invalid JSON format".to_string()))?;

        let keys = |field: &str| {
            obj.get(field)
                .and_then(Value::as_object)
                .map(|m| m.keys().cloned().collect::<Vec<_>>())
        };

        Self::new(keys("long_watchlist"), keys("short_watchlist"))
    }

    /// long 관심종목 심볼.
    pub fn long_symbols(&self) -> &[String] {
        self.long.as_deref().unwrap_or_default()
    }

    /// short 관심종목 심볼.
    pub fn short_symbols(&self) -> &[String] {
        self.short.as_deref().unwrap_or_default()
    }

    /// long ∪ short (중복 제거, long 우선 순서).
    pub fn union_symbols(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.long_symbols()
            .iter()
            .chain(self.short_symbols())
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect()
    }
}

// =============================================================================
// UniverseSelection
// =============================================================================

/// 분석 대상 선택 방식.
#[derive(Debug, Clone, PartialEq)]
pub enum UniverseSelection {
    /// 전체 시장 (제외할 심볼 루트 목록)
    Market {
        /// 제외 루트 (예: "BTC", "ETH")
        excluded_roots: Vec<String>,
    },
    /// 관심종목
    Watchlist(Watchlist),
}

/// 쉼표 구분 제외 목록 파싱 (공백 제거, 대문자 변환, 빈 항목 제거).
pub fn parse_exclusion_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
