//! 시계열 저장소 추상화.
//!
//! 논리적 시계열 단위의 범위 조회와 일괄 삽입만 노출하는 좁은
//! 인터페이스입니다. 각 저장소 구현이 `SeriesKey`의 필드를 자신의
//! 컬럼으로 해석합니다.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::record::SeriesRecord;
use crate::types::SeriesKey;

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 데이터베이스 연결 에러
    #[error("저장소 연결 에러: {0}")]
    Connection(String),

    /// 쿼리 실행 에러
    #[error("쿼리 에러: {0}")]
    Query(String),

    /// 삽입 에러
    #[error("삽입 에러: {0}")]
    Insert(String),

    /// 저장소 불일치 (배치가 부분 적용되었거나 워터마크가 역행함).
    /// 해당 동기화 패스에 치명적이며, 조용히 진행해서는 안 됩니다.
    #[error("저장소 불일치: {0}")]
    Inconsistency(String),
}

/// 시계열 저장소 trait.
///
/// `bulk_insert`는 all-or-nothing이어야 합니다. 배치의 일부만 적용되어
/// `max_timestamp`가 실제로 저장되지 않은 레코드를 가리키게 되어서는
/// 안 됩니다.
#[async_trait]
pub trait TimeSeriesStore<R: SeriesRecord>: Send + Sync {
    /// 시리즈에 저장된 최소 타임스탬프를 반환합니다. 비어 있으면 None.
    async fn min_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError>;

    /// 시리즈에 저장된 최대 타임스탬프(워터마크)를 반환합니다. 비어 있으면 None.
    async fn max_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError>;

    /// 레코드를 한 배치로 삽입하고 삽입된 행 수를 반환합니다.
    async fn bulk_insert(&self, records: &[R]) -> Result<usize, StoreError>;
}
