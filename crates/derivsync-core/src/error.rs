//! 동기화 시스템의 에러 타입.
//!
//! 이 모듈은 동기화 패스 전반에서 사용되는 중앙 에러 타입을 정의합니다.
//! 에러는 항상 시리즈 단위입니다: 한 시리즈의 실패가 같은 실행의 다른
//! 시리즈 동기화를 중단시켜서는 안 됩니다.

use thiserror::Error;

use crate::domain::{SourceError, StoreError};

/// 동기화 패스 에러.
#[derive(Debug, Error)]
pub enum SyncError {
    /// 설정 에러 (프로세스 시작 시 치명적, 복구 불가)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 소스 에러
    #[error(transparent)]
    Source(#[from] SourceError),

    /// 저장소 에러
    #[error(transparent)]
    Store(#[from] StoreError),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 동기화 작업을 위한 Result 타입.
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// 복구 가능한 에러인지 확인합니다.
    ///
    /// 복구 가능한 에러는 해당 시리즈만 건너뛰고 실행을 계속하거나,
    /// 호출자가 백오프 후 재시도할 수 있습니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::Source(
                SourceError::RateLimited(_) | SourceError::NoData(_) | SourceError::Transport(_)
            )
        )
    }

    /// 치명적인 에러인지 확인합니다.
    ///
    /// 설정 누락은 프로세스 시작을, 저장소 불일치는 해당 동기화 패스를
    /// 중단시켜야 합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_) | SyncError::Store(StoreError::Inconsistency(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverable() {
        let rate_limited = SyncError::Source(SourceError::RateLimited("30/min".to_string()));
        assert!(rate_limited.is_recoverable());

        let no_data = SyncError::Source(SourceError::NoData("empty window".to_string()));
        assert!(no_data.is_recoverable());

        let config = SyncError::Config("COINGLASS_API_KEY not set".to_string());
        assert!(!config.is_recoverable());
    }

    #[test]
    fn test_error_fatal() {
        let inconsistency =
            SyncError::Store(StoreError::Inconsistency("partial insert".to_string()));
        assert!(inconsistency.is_fatal());

        let transport = SyncError::Source(SourceError::Transport("timeout".to_string()));
        assert!(!transport.is_fatal());
    }
}
