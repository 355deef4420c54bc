//! 에러 타입 정의.

use std::fmt;

use derivsync_core::SyncError;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 설정 에러
    Config(String),
    /// 동기화 에러 (프로바이더 또는 저장소)
    Sync(SyncError),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Sync(e) => write!(f, "Sync error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<SyncError> for CollectorError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
