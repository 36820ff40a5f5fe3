//! 환경변수 기반 설정 모듈.

use std::{sync::Arc, time::Duration};

use mover_core::{parse_exclusion_list, Clock, MarketCache, MarketCacheConfig};
use mover_exchange::{
    connector::bybit::{BybitClient, BybitConfig, DEFAULT_BASE_URL},
    BybitMarketProvider, RetryConfig,
};

use crate::error::AnalysisError;
use crate::Result;

/// 기본 제외 심볼 루트.
pub const DEFAULT_EXCLUDED: &str = "BTC, ETH, ETHBTC, PAXG, RLUSD, SOL, USD1, USDC, USDE, XAUT";

/// 기본 주요 종목 (시장 분석에 항상 포함).
pub const DEFAULT_MAJOR_SYMBOLS: &str = "BTCUSDT, ETHUSDT, SOLUSDT";

/// 분석기 전체 설정
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// 거래소 설정
    pub exchange: ExchangeSettings,
    /// 조회 설정
    pub fetch: FetchConfig,
    /// 캐시 설정
    pub cache: CacheSettings,
    /// 유니버스 설정
    pub universe: UniverseConfig,
}

/// 거래소 설정
#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    /// REST API 기본 URL
    pub base_url: String,
    /// 결제 통화 (카탈로그 필터)
    pub quote_coin: String,
}

/// 과거 캔들 조회 설정
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// 동시 조회 수 (기본 30)
    pub concurrency_limit: usize,
    /// 요청당 최대 시도 횟수 (기본 3)
    pub retry_max_attempts: u32,
    /// 시도 간 고정 대기 (밀리초, 기본 300)
    pub retry_delay_ms: u64,
}

/// 캐시 TTL 설정
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// 종목 카탈로그 TTL (초, 기본 1시간)
    pub instruments_ttl_secs: u64,
    /// 시세 스냅샷 TTL (초, 기본 15초)
    pub tickers_ttl_secs: u64,
}

/// 분석 대상 설정
#[derive(Debug, Clone)]
pub struct UniverseConfig {
    /// 시장 분석 제외 루트 (CLI `--exclude`로 덮어쓰기 가능)
    pub excluded_roots: Vec<String>,
    /// 항상 포함되는 주요 종목
    pub major_symbols: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::from_source(|_| None)
    }
}

impl AnalyzerConfig {
    /// 환경변수에서 설정 로드 (`.env` 파일이 있으면 먼저 적용)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_source(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// 키 조회 함수로부터 설정 구성 (파싱 실패 시 기본값 사용)
    fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            exchange: ExchangeSettings {
                base_url: lookup("BYBIT_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                quote_coin: lookup("ANALYZER_QUOTE_COIN")
                    .map(|v| v.trim().to_uppercase())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "USDT".to_string()),
            },
            fetch: FetchConfig {
                concurrency_limit: parse_or(&lookup, "ANALYZER_CONCURRENCY_LIMIT", 30),
                retry_max_attempts: parse_or(&lookup, "ANALYZER_RETRY_MAX_ATTEMPTS", 3),
                retry_delay_ms: parse_or(&lookup, "ANALYZER_RETRY_DELAY_MS", 300),
            },
            cache: CacheSettings {
                instruments_ttl_secs: parse_or(&lookup, "ANALYZER_INSTRUMENTS_TTL_SECS", 3600),
                tickers_ttl_secs: parse_or(&lookup, "ANALYZER_TICKERS_TTL_SECS", 15),
            },
            universe: UniverseConfig {
                excluded_roots: parse_exclusion_list(
                    &lookup("ANALYZER_EXCLUDED").unwrap_or_else(|| DEFAULT_EXCLUDED.to_string()),
                ),
                major_symbols: parse_exclusion_list(
                    &lookup("ANALYZER_MAJOR_SYMBOLS")
                        .unwrap_or_else(|| DEFAULT_MAJOR_SYMBOLS.to_string()),
                ),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        let url = self.exchange.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AnalysisError::Config(format!(
                "BYBIT_API_URL must be an http(s) URL: {url:?}"
            )));
        }
        if self.fetch.retry_max_attempts == 0 {
            return Err(AnalysisError::Config(
                "ANALYZER_RETRY_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// 캔들 조회 재시도 정책 (고정 간격)
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::fixed(
            self.fetch.retry_max_attempts,
            Duration::from_millis(self.fetch.retry_delay_ms),
        )
    }

    /// 캐시 TTL 설정
    pub fn cache_config(&self) -> MarketCacheConfig {
        MarketCacheConfig {
            instruments_ttl: Duration::from_secs(self.cache.instruments_ttl_secs),
            tickers_ttl: Duration::from_secs(self.cache.tickers_ttl_secs),
        }
    }

    /// 설정에 맞는 Bybit Provider 생성
    pub fn build_provider(&self, clock: Arc<dyn Clock>) -> BybitMarketProvider {
        let client = Arc::new(BybitClient::new(BybitConfig::new(
            self.exchange.base_url.trim(),
        )));
        let cache = Arc::new(MarketCache::new(self.cache_config(), clock));

        BybitMarketProvider::new(client, cache)
            .with_retry_config(self.retry_config())
            .with_quote_coin(&self.exchange.quote_coin)
    }
}

/// 값을 파싱 (없거나 실패 시 기본값 사용)
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AnalyzerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AnalyzerConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.exchange.base_url, "https://api.bybit.com");
        assert_eq!(config.exchange.quote_coin, "USDT");
        assert_eq!(config.fetch.concurrency_limit, 30);
        assert_eq!(config.fetch.retry_max_attempts, 3);
        assert_eq!(config.retry_config().base_delay, Duration::from_millis(300));
        assert_eq!(config.cache_config().instruments_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache_config().tickers_ttl, Duration::from_secs(15));
        assert_eq!(config.universe.excluded_roots.len(), 10);
        assert_eq!(
            config.universe.major_symbols,
            vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]
        );
    }

    #[test]
    fn overrides_and_parse_fallback() {
        let config = config_from(&[
            ("ANALYZER_CONCURRENCY_LIMIT", "8"),
            ("ANALYZER_RETRY_DELAY_MS", "not-a-number"),
            ("ANALYZER_EXCLUDED", "doge, pepe"),
            ("ANALYZER_QUOTE_COIN", "usdc"),
        ]);
        assert_eq!(config.fetch.concurrency_limit, 8);
        assert_eq!(config.fetch.retry_delay_ms, 300);
        assert_eq!(config.universe.excluded_roots, vec!["DOGE", "PEPE"]);
        assert_eq!(config.exchange.quote_coin, "USDC");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = config_from(&[("BYBIT_API_URL", "api.bybit.com")]);
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));

        let config = config_from(&[("ANALYZER_RETRY_MAX_ATTEMPTS", "0")]);
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));

        assert!(AnalyzerConfig::default().validate().is_ok());
    }
}
