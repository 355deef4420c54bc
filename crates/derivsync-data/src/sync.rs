//! 증분 동기화 엔진.
//!
//! 저장소의 워터마크(저장된 최대 타임스탬프)와 목표 시각을 비교하여
//! 비어 있는 구간만 프로바이더에서 가져와 채웁니다. 워터마크 이하의
//! 레코드는 삽입 전에 걸러내므로 같은 시리즈를 반복 동기화해도
//! 중복이 생기지 않습니다.
//!
//! # 알고리즘
//!
//! 1. 저장소에서 시리즈의 MIN/MAX 타임스탬프를 조회합니다.
//! 2. MAX가 목표 시각보다 이후면 가져올 것이 없으므로 프로바이더를
//!    호출하지 않고 종료합니다.
//! 3. MAX를 시작점으로 프로바이더에서 레코드를 가져옵니다.
//!    (저장소가 비어 있으면 시작점 없이 프로바이더 기본 구간)
//! 4. 타임스탬프가 MAX보다 큰 레코드만 남깁니다 (엄격 비교).
//! 5. 남은 레코드를 단일 벌크 삽입으로 저장하고, 삽입 수가 제출 수와
//!    다르면 불일치 에러를 반환합니다.

use std::marker::PhantomData;
use std::sync::Arc;

use derivsync_core::{
    MarketDataSource, SeriesKey, SeriesRecord, SourceError, StoreError, SyncResult,
    TimeSeriesStore,
};

/// 저장소에 존재하는 시리즈의 타임스탬프 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRange {
    /// 저장된 최소 타임스탬프 (비어 있으면 None)
    pub min: Option<i64>,
    /// 저장된 최대 타임스탬프 (워터마크)
    pub max: Option<i64>,
}

/// 시리즈 한 번 동기화의 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// 워터마크가 목표 시각 이후라 프로바이더를 호출하지 않음
    UpToDate,
    /// 프로바이더가 요청 구간에 데이터 없음을 보고함
    NoData,
    /// 가져온 레코드가 모두 워터마크 이하라 삽입할 것이 없음
    NothingToInsert,
    /// 새 레코드를 삽입함
    Inserted {
        /// 삽입한 레코드 수
        count: usize,
        /// 삽입한 레코드의 최소 타임스탬프
        first: i64,
        /// 삽입한 레코드의 최대 타임스탬프
        last: i64,
    },
}

/// 프로바이더와 저장소를 연결하는 증분 동기화 엔진.
///
/// 레코드 타입별로 소스/저장소 구현을 받아 동작하며, 엔진 자체는
/// 특정 프로바이더나 테이블을 알지 못합니다.
pub struct SyncEngine<R, S, T>
where
    R: SeriesRecord,
    S: MarketDataSource<R>,
    T: TimeSeriesStore<R>,
{
    source: Arc<S>,
    store: Arc<T>,
    _record: PhantomData<fn() -> R>,
}

impl<R, S, T> SyncEngine<R, S, T>
where
    R: SeriesRecord,
    S: MarketDataSource<R>,
    T: TimeSeriesStore<R>,
{
    /// 새 엔진 생성.
    pub fn new(source: Arc<S>, store: Arc<T>) -> Self {
        Self {
            source,
            store,
            _record: PhantomData,
        }
    }

    /// 저장소에 존재하는 시리즈의 타임스탬프 범위를 조회합니다.
    pub async fn stored_range(&self, series: &SeriesKey) -> SyncResult<SyncRange> {
        let min = self.store.min_timestamp(series).await?;
        let max = self.store.max_timestamp(series).await?;
        Ok(SyncRange { min, max })
    }

    /// 시리즈를 목표 시각까지 동기화합니다.
    ///
    /// # Arguments
    /// * `series` - 동기화할 시리즈
    /// * `end_time` - 목표 시각 (Unix 초, 보통 현재 시각)
    pub async fn sync(&self, series: &SeriesKey, end_time: i64) -> SyncResult<SyncOutcome> {
        let range = self.stored_range(series).await?;
        tracing::debug!(
            series = %series,
            stored_min = ?range.min,
            stored_max = ?range.max,
            end_time = end_time,
            "동기화 시작"
        );

        // 워터마크가 목표 시각 이후면 가져올 것이 없음
        if let Some(max) = range.max {
            if max > end_time {
                tracing::info!(series = %series, watermark = max, "이미 최신 상태");
                return Ok(SyncOutcome::UpToDate);
            }
        }

        let records = match self
            .source
            .fetch(series, range.max, Some(end_time), None)
            .await
        {
            Ok(records) => records,
            Err(SourceError::NoData(reason)) => {
                tracing::info!(series = %series, reason = reason, "프로바이더에 데이터 없음");
                return Ok(SyncOutcome::NoData);
            }
            Err(e) => return Err(e.into()),
        };

        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            tracing::debug!(
                series = %series,
                count = records.len(),
                data_min = first.timestamp(),
                data_max = last.timestamp(),
                "프로바이더 응답 수신"
            );
        }

        // 워터마크 이하 레코드 제거 (엄격 비교)
        let fresh: Vec<R> = match range.max {
            Some(max) => records.into_iter().filter(|r| r.timestamp() > max).collect(),
            None => records,
        };

        if fresh.is_empty() {
            tracing::info!(series = %series, "워터마크 이후의 새 레코드 없음");
            return Ok(SyncOutcome::NothingToInsert);
        }

        let first = fresh.iter().map(|r| r.timestamp()).min().unwrap_or(0);
        let last = fresh.iter().map(|r| r.timestamp()).max().unwrap_or(0);

        let inserted = self.store.bulk_insert(&fresh).await?;
        if inserted != fresh.len() {
            return Err(StoreError::Inconsistency(format!(
                "{}: 제출 {}건 중 {}건만 삽입됨",
                series,
                fresh.len(),
                inserted
            ))
            .into());
        }

        tracing::info!(
            series = %series,
            inserted = inserted,
            first = first,
            last = last,
            "동기화 완료"
        );
        Ok(SyncOutcome::Inserted {
            count: inserted,
            first,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestRecord {
        t: i64,
    }

    impl SeriesRecord for TestRecord {
        fn timestamp(&self) -> i64 {
            self.t
        }
    }

    /// 설정된 응답을 반환하고 호출 인자를 기록하는 소스.
    struct MockSource {
        records: Vec<TestRecord>,
        error: Option<SourceError>,
        calls: Mutex<Vec<(Option<i64>, Option<i64>)>>,
    }

    impl MockSource {
        fn with_records(timestamps: &[i64]) -> Self {
            Self {
                records: timestamps.iter().map(|&t| TestRecord { t }).collect(),
                error: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_error(error: SourceError) -> Self {
            Self {
                records: Vec::new(),
                error: Some(error),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn fetch_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MarketDataSource<TestRecord> for MockSource {
        async fn fetch(
            &self,
            _series: &SeriesKey,
            start: Option<i64>,
            end: Option<i64>,
            _limit: Option<u32>,
        ) -> Result<Vec<TestRecord>, SourceError> {
            self.calls.lock().unwrap().push((start, end));
            if let Some(error) = &self.error {
                return Err(match error {
                    SourceError::NoData(m) => SourceError::NoData(m.clone()),
                    SourceError::RateLimited(m) => SourceError::RateLimited(m.clone()),
                    SourceError::Transport(m) => SourceError::Transport(m.clone()),
                    SourceError::Api(m) => SourceError::Api(m.clone()),
                    SourceError::Parse(m) => SourceError::Parse(m.clone()),
                    SourceError::InvalidSeries(m) => SourceError::InvalidSeries(m.clone()),
                });
            }
            Ok(self.records.clone())
        }
    }

    /// 타임스탬프를 메모리에 쌓는 저장소.
    struct MockStore {
        rows: Mutex<Vec<i64>>,
        // Some(n)이면 벌크 삽입이 최대 n건만 반영된 것처럼 동작
        insert_cap: Option<usize>,
    }

    impl MockStore {
        fn empty() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                insert_cap: None,
            }
        }

        fn with_rows(timestamps: &[i64]) -> Self {
            Self {
                rows: Mutex::new(timestamps.to_vec()),
                insert_cap: None,
            }
        }

        fn with_insert_cap(cap: usize) -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                insert_cap: Some(cap),
            }
        }
    }

    #[async_trait]
    impl TimeSeriesStore<TestRecord> for MockStore {
        async fn min_timestamp(&self, _series: &SeriesKey) -> Result<Option<i64>, StoreError> {
            Ok(self.rows.lock().unwrap().iter().min().copied())
        }

        async fn max_timestamp(&self, _series: &SeriesKey) -> Result<Option<i64>, StoreError> {
            Ok(self.rows.lock().unwrap().iter().max().copied())
        }

        async fn bulk_insert(&self, records: &[TestRecord]) -> Result<usize, StoreError> {
            let take = self.insert_cap.unwrap_or(records.len()).min(records.len());
            let mut rows = self.rows.lock().unwrap();
            for record in &records[..take] {
                rows.push(record.t);
            }
            Ok(take)
        }
    }

    fn engine(
        source: MockSource,
        store: MockStore,
    ) -> (
        SyncEngine<TestRecord, MockSource, MockStore>,
        Arc<MockSource>,
        Arc<MockStore>,
    ) {
        let source = Arc::new(source);
        let store = Arc::new(store);
        (
            SyncEngine::new(source.clone(), store.clone()),
            source,
            store,
        )
    }

    fn series() -> SeriesKey {
        SeriesKey::new("BTCUSDT")
    }

    #[tokio::test]
    async fn test_empty_store_fetches_without_start() {
        let (engine, source, store) =
            engine(MockSource::with_records(&[100, 200, 300]), MockStore::empty());

        let outcome = engine.sync(&series(), 1000).await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Inserted {
                count: 3,
                first: 100,
                last: 300
            }
        );
        // 저장소가 비어 있으면 시작점 없이 호출
        assert_eq!(source.calls.lock().unwrap()[0], (None, Some(1000)));
        assert_eq!(*store.rows.lock().unwrap(), vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn test_up_to_date_skips_fetch() {
        let (engine, source, _store) = engine(
            MockSource::with_records(&[100]),
            MockStore::with_rows(&[100, 2000]),
        );

        let outcome = engine.sync(&series(), 1000).await.unwrap();

        assert_eq!(outcome, SyncOutcome::UpToDate);
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_watermark_filter_is_strict() {
        // 프로바이더가 워터마크(200)와 같은 레코드를 포함해 반환
        let (engine, source, store) = engine(
            MockSource::with_records(&[100, 200, 300, 400]),
            MockStore::with_rows(&[100, 200]),
        );

        let outcome = engine.sync(&series(), 1000).await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Inserted {
                count: 2,
                first: 300,
                last: 400
            }
        );
        // 워터마크를 시작점으로 호출
        assert_eq!(source.calls.lock().unwrap()[0], (Some(200), Some(1000)));
        assert_eq!(*store.rows.lock().unwrap(), vec![100, 200, 300, 400]);
    }

    #[tokio::test]
    async fn test_repeat_sync_is_idempotent() {
        let (engine, _source, store) = engine(
            MockSource::with_records(&[100, 200, 300]),
            MockStore::empty(),
        );

        let first = engine.sync(&series(), 1000).await.unwrap();
        assert!(matches!(first, SyncOutcome::Inserted { count: 3, .. }));

        // 같은 응답을 다시 받아도 전부 워터마크 이하라 삽입되지 않음
        let second = engine.sync(&series(), 1000).await.unwrap();
        assert_eq!(second, SyncOutcome::NothingToInsert);
        assert_eq!(store.rows.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_no_data_maps_to_outcome() {
        let (engine, _source, store) = engine(
            MockSource::with_error(SourceError::NoData("empty".into())),
            MockStore::empty(),
        );

        let outcome = engine.sync(&series(), 1000).await.unwrap();

        assert_eq!(outcome, SyncOutcome::NoData);
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_propagates_as_error() {
        let (engine, _source, _store) = engine(
            MockSource::with_error(SourceError::RateLimited("limit".into())),
            MockStore::empty(),
        );

        let result = engine.sync(&series(), 1000).await;
        let error = result.unwrap_err();
        assert!(error.is_recoverable());
    }

    #[tokio::test]
    async fn test_partial_insert_is_inconsistency() {
        let (engine, _source, _store) = engine(
            MockSource::with_records(&[100, 200, 300]),
            MockStore::with_insert_cap(2),
        );

        let result = engine.sync(&series(), 1000).await;
        let error = result.unwrap_err();
        assert!(error.is_fatal());
    }

    #[tokio::test]
    async fn test_watermark_advances_monotonically() {
        let (engine, _source, store) = engine(
            MockSource::with_records(&[100, 200, 300]),
            MockStore::with_rows(&[100]),
        );

        engine.sync(&series(), 1000).await.unwrap();
        let range = engine.stored_range(&series()).await.unwrap();
        assert_eq!(range, SyncRange { min: Some(100), max: Some(300) });
        assert_eq!(store.rows.lock().unwrap().len(), 3);
    }
}
