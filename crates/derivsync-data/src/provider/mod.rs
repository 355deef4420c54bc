//! 데이터 Provider 모듈.
//!
//! 외부 프로바이더에서 시계열 데이터를 가져오는 클라이언트들을 정의합니다.
//!
//! ## Coinglass
//! - `CoinglassClient`: Coinglass Open API v3 클라이언트 (API 키 필요)
//! - 선물 OHLC, 펀딩비 OHLC, 합산 미결제약정 히스토리
//! - 분당 30회 요청 한도를 공유 rate limiter로 집행
//!
//! ## Deribit
//! - `DeribitClient`: Deribit public API 클라이언트
//! - 만기 캘린더로 종목명을 해석하여 만기별 선물 종가 스냅샷 조회

pub mod coinglass;
pub mod deribit;
pub mod rate_limit;

pub use coinglass::{
    CoinglassClient, CoinglassFundingSource, CoinglassOhlcSource, CoinglassOpenInterestSource,
};
pub use deribit::{DeribitClient, TenorInstrument};
pub use rate_limit::RateLimiter;
