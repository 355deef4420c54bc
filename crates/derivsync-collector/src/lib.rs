//! Standalone derivatives data collector for DerivSync.
//!
//! 이 crate는 파생상품 시계열을 독립적으로 수집하는 바이너리를 제공합니다:
//! - 선물 OHLC 히스토리 동기화
//! - 펀딩비 히스토리 동기화
//! - 거래소 합산 미결제약정 동기화
//! - 만기별 선물 가격 스냅샷 (만기 캘린더 기반)

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::CollectionStats;
