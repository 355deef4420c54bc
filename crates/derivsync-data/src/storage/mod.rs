//! PostgreSQL 시계열 저장소.
//!
//! 시리즈 키의 필터를 테이블 컬럼으로 사상하고, 워터마크 조회
//! (MIN/MAX)와 UNNEST 배열 바인딩 기반 벌크 삽입을 제공합니다.
//!
//! ## 기대 테이블
//!
//! ```sql
//! CREATE TABLE ohlc_history (
//!     exchange TEXT NOT NULL,
//!     symbol TEXT NOT NULL,
//!     coinglass_future TEXT NOT NULL,
//!     interval TEXT NOT NULL,
//!     open NUMERIC NOT NULL,
//!     high NUMERIC NOT NULL,
//!     low NUMERIC NOT NULL,
//!     close NUMERIC NOT NULL,
//!     t BIGINT NOT NULL,
//!     utc TIMESTAMPTZ NOT NULL,
//!     UNIQUE (exchange, symbol, coinglass_future, interval, t)
//! );
//!
//! CREATE TABLE funding_rate (
//!     exchange TEXT NOT NULL,
//!     symbol TEXT NOT NULL,
//!     interval TEXT NOT NULL,
//!     open NUMERIC NOT NULL,
//!     high NUMERIC NOT NULL,
//!     low NUMERIC NOT NULL,
//!     close NUMERIC NOT NULL,
//!     t BIGINT NOT NULL,
//!     utc TIMESTAMPTZ NOT NULL,
//!     UNIQUE (exchange, symbol, interval, t)
//! );
//!
//! CREATE TABLE open_interest (
//!     symbol TEXT NOT NULL,
//!     interval TEXT NOT NULL,
//!     aggregated_open_interest NUMERIC NOT NULL,
//!     source TEXT NOT NULL,
//!     "timestamp" BIGINT NOT NULL,
//!     utc TIMESTAMPTZ NOT NULL,
//!     UNIQUE (symbol, interval, "timestamp")
//! );
//!
//! CREATE TABLE deribit_futures (
//!     asset TEXT NOT NULL,
//!     instrument TEXT NOT NULL,
//!     tenor TEXT NOT NULL,
//!     expiration DATE,
//!     price NUMERIC NOT NULL,
//!     unix_timestamp BIGINT NOT NULL,
//!     utc TIMESTAMPTZ NOT NULL,
//!     UNIQUE (asset, tenor, unix_timestamp)
//! );
//! ```

mod filter;
mod funding_rate;
mod futures_price;
mod ohlc;
mod open_interest;

pub use funding_rate::FundingRateStore;
pub use futures_price::FuturesPriceStore;
pub use ohlc::OhlcStore;
pub use open_interest::OpenInterestStore;
