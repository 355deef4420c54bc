//! 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 외부 프로바이더 클라이언트 (Coinglass, Deribit)
//! - 프로바이더 공유 rate limiter
//! - PostgreSQL 시계열 저장소
//! - 증분 동기화 엔진 (갭 탐지 + 중복 제거 + 워터마크 이후 채움)

pub mod provider;
pub mod storage;
pub mod sync;

// 프로바이더 재내보내기
pub use provider::{
    CoinglassClient, CoinglassFundingSource, CoinglassOhlcSource, CoinglassOpenInterestSource,
    DeribitClient, RateLimiter, TenorInstrument,
};

// 저장소 재내보내기
pub use storage::{FundingRateStore, FuturesPriceStore, OhlcStore, OpenInterestStore};

// 동기화 엔진 재내보내기
pub use sync::{SyncEngine, SyncOutcome, SyncRange};
