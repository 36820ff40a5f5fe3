//! 무기한 선물 변동률 분석의 공용 도메인 타입과 캐시 인프라.
//!
//! # 모듈 구성
//!
//! - [`cache`]: 주입 가능한 시계를 사용하는 TTL 캐시 ([`TtlCache`], [`MarketCache`])
//! - [`domain`]: 종목/시세/캔들, 분석 결과(코호트), 분석 대상 유니버스 타입
//! - [`error`]: 네트워크 호출 전에 걸러지는 입력 검증 에러

pub mod cache;
pub mod domain;
pub mod error;

pub use cache::{Clock, ManualClock, MarketCache, MarketCacheConfig, SystemClock, TtlCache};
pub use domain::*;
pub use error::ValidationError;
