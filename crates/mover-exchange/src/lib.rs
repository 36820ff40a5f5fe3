//! 거래소 시장 데이터 커넥터.
//!
//! # 모듈 구성
//!
//! - [`connector`]: 거래소 REST 클라이언트 (Bybit v5)
//! - [`provider`]: 캐시/재시도가 적용된 [`MarketDataProvider`] 구현
//! - [`retry`]: 교체 가능한 재시도 정책

pub mod connector;
pub mod provider;
pub mod retry;

use thiserror::Error;

pub use provider::{BybitMarketProvider, MarketDataProvider};
pub use retry::{with_retry, RetryConfig};

/// 거래소 호출 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExchangeError {
    /// 전송 계층 실패 (연결, 타임아웃 등)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 성공이 아닌 HTTP 상태 코드
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// API 레벨 에러 (retCode != 0)
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// 응답 파싱 실패
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 잘못된 요청 인자 (재시도해도 결과가 같음)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ExchangeError {
    /// 재시도 대상 여부.
    ///
    /// 전송 실패, HTTP 에러, API 에러만 재시도합니다.
    /// 파싱 실패와 잘못된 요청은 같은 요청을 반복해도 결과가 같습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::HttpStatus { .. } | Self::Api { .. }
        )
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ExchangeError::NetworkError("reset".into()).is_retryable());
        assert!(ExchangeError::HttpStatus {
            status: 502,
            body: String::new()
        }
        .is_retryable());
        assert!(ExchangeError::Api {
            code: 10006,
            message: "Too many visits".into()
        }
        .is_retryable());
        assert!(!ExchangeError::InvalidRequest("limit".into()).is_retryable());
        assert!(!ExchangeError::ParseError("close=\"x\"".into()).is_retryable());
    }
}
