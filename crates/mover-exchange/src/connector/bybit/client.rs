use std::str::FromStr;

use mover_core::{Candle, Instrument, KlineInterval, TickerEntry};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::debug;

use crate::ExchangeError;

// ============================================================================
// 설정
// ============================================================================

/// Bybit 공개 API 기본 URL.
pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";

const INSTRUMENTS_ENDPOINT: &str = "/v5/market/instruments-info";
const TICKERS_ENDPOINT: &str = "/v5/market/tickers";
const KLINE_ENDPOINT: &str = "/v5/market/kline";

/// 카탈로그 페이지 크기 (API 최대값).
const INSTRUMENTS_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub struct BybitConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 상품 카테고리 (무기한 선물: linear)
    pub category: String,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            category: "linear".to_string(),
        }
    }
}

impl BybitConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

/// 공통 응답 봉투: `{retCode, retMsg, result}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitEnvelope {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitPriceFilter {
    pub tick_size: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitInstrument {
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub launch_time: String,
    #[serde(default)]
    pub price_filter: Option<BybitPriceFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentsPage {
    #[serde(default)]
    pub list: Vec<BybitInstrument>,
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitTicker {
    pub symbol: String,
    #[serde(default)]
    pub last_price: String,
    #[serde(rename = "price24hPcnt", default)]
    pub price_24h_pcnt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickersPage {
    #[serde(default)]
    pub list: Vec<BybitTicker>,
}

/// 캔들 목록. 각 행은 `[startTime(ms), open, high, low, close, volume, turnover]`.
#[derive(Debug, Clone, Deserialize)]
pub struct KlinePage {
    #[serde(default)]
    pub list: Vec<Vec<String>>,
}

/// 캔들 조회 조건.
#[derive(Debug, Clone)]
pub struct KlineQuery {
    pub symbol: String,
    pub interval: KlineInterval,
    /// 시작 시각 (epoch 밀리초)
    pub start: Option<i64>,
    pub limit: u32,
}

// ============================================================================
// 변환
// ============================================================================

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| ExchangeError::ParseError(format!("{field}={raw:?}: {e}")))
}

impl BybitInstrument {
    /// 거래 중 상태 여부.
    pub fn is_trading(&self) -> bool {
        self.status == "Trading"
    }

    /// 도메인 종목으로 변환.
    ///
    /// 상장 시각과 호가 단위는 표시/제외 판단 보조 정보이므로
    /// 없거나 비정상이면 0으로 대체하고 종목은 유지합니다.
    pub fn to_instrument(&self) -> Instrument {
        let launch_time = self.launch_time.parse::<i64>().unwrap_or(0);
        let tick_size = self
            .price_filter
            .as_ref()
            .and_then(|filter| match parse_decimal("tickSize", &filter.tick_size) {
                Ok(tick) => Some(tick),
                Err(e) => {
                    debug!(symbol = %self.symbol, error = %e, "호가 단위 파싱 실패, 0으로 대체");
                    None
                }
            })
            .unwrap_or(Decimal::ZERO);

        Instrument {
            symbol: self.symbol.clone(),
            launch_time,
            tick_size,
        }
    }
}

impl BybitTicker {
    pub fn to_entry(&self) -> Result<TickerEntry, ExchangeError> {
        Ok(TickerEntry {
            symbol: self.symbol.clone(),
            last_price: parse_decimal("lastPrice", &self.last_price)?,
            price_24h_pcnt: parse_decimal("price24hPcnt", &self.price_24h_pcnt)?,
        })
    }
}

/// 캔들 행 파싱. 시각은 밀리초 → 초로 변환합니다.
pub(crate) fn parse_candle(row: &[String]) -> Result<Candle, ExchangeError> {
    if row.len() < 5 {
        return Err(ExchangeError::ParseError(format!(
            "kline row has {} fields, expected at least 5",
            row.len()
        )));
    }
    let start_ms = row[0]
        .parse::<i64>()
        .map_err(|e| ExchangeError::ParseError(format!("startTime={:?}: {e}", row[0])))?;

    Ok(Candle {
        time: start_ms / 1000,
        open: parse_decimal("open", &row[1])?,
        high: parse_decimal("high", &row[2])?,
        low: parse_decimal("low", &row[3])?,
        close: parse_decimal("close", &row[4])?,
    })
}

// ============================================================================
// Bybit 클라이언트
// ============================================================================

/// Bybit v5 공개 시장 데이터 REST 클라이언트.
///
/// 재시도와 캐시는 상위 Provider에서 처리하며, 여기서는 요청 1회만 수행합니다.
pub struct BybitClient {
    client: Client,
    config: BybitConfig,
}

impl BybitClient {
    pub fn new(config: BybitConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ExchangeError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: BybitEnvelope = response.json().await?;
        if envelope.ret_code != 0 {
            debug!(
                endpoint,
                ret_code = envelope.ret_code,
                ret_msg = %envelope.ret_msg,
                "Bybit API 에러 응답"
            );
            return Err(ExchangeError::Api {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }

        serde_json::from_value(envelope.result).map_err(|e| ExchangeError::ParseError(e.to_string()))
    }

    /// 종목 카탈로그 한 페이지 조회 (GET /v5/market/instruments-info).
    pub async fn get_instruments_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<InstrumentsPage, ExchangeError> {
        let mut query = vec![
            ("category", self.config.category.clone()),
            ("limit", INSTRUMENTS_PAGE_LIMIT.to_string()),
        ];
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            query.push(("cursor", cursor.to_string()));
        }
        self.get(INSTRUMENTS_ENDPOINT, &query).await
    }

    /// 전체 시세 조회 (GET /v5/market/tickers).
    pub async fn get_tickers(&self) -> Result<TickersPage, ExchangeError> {
        self.get(TICKERS_ENDPOINT, &[("category", self.config.category.clone())])
            .await
    }

    /// 캔들 조회 (GET /v5/market/kline).
    pub async fn get_kline(&self, query: &KlineQuery) -> Result<KlinePage, ExchangeError> {
        if query.limit == 0 {
            return Err(ExchangeError::InvalidRequest(
                "kline limit must be positive".to_string(),
            ));
        }

        let mut params = vec![
            ("category", self.config.category.clone()),
            ("symbol", query.symbol.clone()),
            ("interval", query.interval.as_api_str().to_string()),
        ];
        if let Some(start) = query.start {
            params.push(("start", start.to_string()));
        }
        params.push(("limit", query.limit.to_string()));

        self.get(KLINE_ENDPOINT, &params).await
    }
}
