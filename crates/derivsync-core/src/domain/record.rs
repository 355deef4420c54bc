//! 시계열 레코드 타입.
//!
//! 이 모듈은 시계열 종류별 표준 레코드 구조체를 정의합니다:
//! - `OhlcRecord` - 선물 OHLC 캔들
//! - `FundingRateRecord` - 펀딩비 OHLC
//! - `OpenInterestRecord` - 거래소 합산 미결제약정
//! - `FuturesPriceRecord` - 만기별 선물 가격 스냅샷
//!
//! 모든 레코드는 초 단위 Unix 타임스탬프를 유일한 정렬 키로 사용하며,
//! UTC datetime은 타임스탬프에서 파생됩니다 (독립적으로 변경 불가).

use crate::domain::expiry::Tenor;
use crate::types::Interval;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 초 단위 Unix 타임스탬프를 UTC datetime으로 변환합니다.
pub fn timestamp_to_utc(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0).single().unwrap_or_default()
}

/// 시계열 레코드 공통 trait.
///
/// 타임스탬프는 시리즈 내 유일한 정렬 키이며, `utc()`는 타임스탬프의
/// 순수 함수입니다.
pub trait SeriesRecord: Send + Sync {
    /// 초 단위 Unix 타임스탬프.
    fn timestamp(&self) -> i64;

    /// 타임스탬프에서 파생된 UTC datetime.
    fn utc(&self) -> DateTime<Utc> {
        timestamp_to_utc(self.timestamp())
    }
}

/// 선물 OHLC 캔들 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcRecord {
    /// 거래소 이름
    pub exchange: String,
    /// 심볼 (예: "BTCUSDT")
    pub symbol: String,
    /// 프로바이더의 선물 상품 키
    pub future: String,
    /// 인터벌
    pub interval: Interval,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 초 단위 Unix 타임스탬프
    pub t: i64,
}

impl SeriesRecord for OhlcRecord {
    fn timestamp(&self) -> i64 {
        self.t
    }
}

/// 펀딩비 OHLC 레코드.
///
/// 펀딩비 역시 인터벌 단위의 OHLC 형태로 제공됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingRateRecord {
    /// 거래소 이름
    pub exchange: String,
    /// 심볼
    pub symbol: String,
    /// 인터벌
    pub interval: Interval,
    /// 시가 펀딩비
    pub open: Decimal,
    /// 최고 펀딩비
    pub high: Decimal,
    /// 최저 펀딩비
    pub low: Decimal,
    /// 종가 펀딩비
    pub close: Decimal,
    /// 초 단위 Unix 타임스탬프
    pub t: i64,
}

impl SeriesRecord for FundingRateRecord {
    fn timestamp(&self) -> i64 {
        self.t
    }
}

/// 거래소 합산 미결제약정 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenInterestRecord {
    /// 심볼 (예: "BTC")
    pub symbol: String,
    /// 인터벌
    pub interval: Interval,
    /// 합산 미결제약정 (해당 캔들의 종가 기준)
    pub aggregated: Decimal,
    /// 데이터 출처
    pub source: String,
    /// 초 단위 Unix 타임스탬프
    pub t: i64,
}

impl SeriesRecord for OpenInterestRecord {
    fn timestamp(&self) -> i64 {
        self.t
    }
}

/// 만기별 선물 가격 스냅샷 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesPriceRecord {
    /// 기초 자산 (예: "BTC", "ETH")
    pub asset: String,
    /// 거래 종목명 (예: "BTC-29NOV24", "BTC-PERPETUAL")
    pub instrument: String,
    /// 만기 구분
    pub tenor: Tenor,
    /// 만기일 (perpetual은 없음)
    pub expiration: Option<NaiveDate>,
    /// 스냅샷 시점의 종가
    pub price: Decimal,
    /// 초 단위 Unix 타임스탬프
    pub t: i64,
}

impl SeriesRecord for FuturesPriceRecord {
    fn timestamp(&self) -> i64 {
        self.t
    }
}
