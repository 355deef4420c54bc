//! Coinglass 소스와 동기화 엔진의 통합 테스트.
//!
//! mockito로 Coinglass API를 흉내 내고, 메모리 저장소에 대해 실제
//! 소스 어댑터와 엔진을 돌려 전체 동기화 흐름을 검증합니다.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal_macros::dec;

use derivsync_core::{Interval, OhlcRecord, SeriesKey, StoreError, TimeSeriesStore};
use derivsync_data::{CoinglassClient, CoinglassOhlcSource, SyncEngine, SyncOutcome};

/// 테스트용 메모리 저장소.
struct MemStore {
    rows: Mutex<Vec<OhlcRecord>>,
}

impl MemStore {
    fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TimeSeriesStore<OhlcRecord> for MemStore {
    async fn min_timestamp(&self, _series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().map(|r| r.t).min())
    }

    async fn max_timestamp(&self, _series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().map(|r| r.t).max())
    }

    async fn bulk_insert(&self, records: &[OhlcRecord]) -> Result<usize, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        rows.extend_from_slice(records);
        Ok(records.len())
    }
}

fn series() -> SeriesKey {
    SeriesKey::new("BTCUSDT")
        .with_exchange("Binance")
        .with_interval(Interval::H4)
        .with_product("btcusdt_perp")
}

#[tokio::test]
async fn test_sync_inserts_then_reports_nothing_new() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/futures/btcusdt_perp/ohlc-history")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"code":"0","msg":"success","data":[
                {"t":1730678400,"o":"70000","h":"71000","l":"69500","c":"70500"},
                {"t":1730692800,"o":"70500","h":"70800","l":"70000","c":"70200"},
                {"t":1730707200,"o":"70200","h":"70600","l":"69900","c":"70400"}
            ]}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let client = Arc::new(CoinglassClient::with_base_url("test-key", server.url()));
    let source = Arc::new(CoinglassOhlcSource::new(client));
    let store = Arc::new(MemStore::new());
    let engine = SyncEngine::new(source, store.clone());

    // 첫 패스: 전부 삽입
    let outcome = engine.sync(&series(), 1730710000).await.unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Inserted {
            count: 3,
            first: 1730678400,
            last: 1730707200
        }
    );
    {
        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].open, dec!(70000));
        assert_eq!(rows[2].close, dec!(70400));
        assert_eq!(rows[0].exchange, "Binance");
        assert_eq!(rows[0].future, "btcusdt_perp");
    }

    // 두 번째 패스: 같은 응답이지만 전부 워터마크 이하
    let outcome = engine.sync(&series(), 1730710000).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NothingToInsert);
    assert_eq!(store.rows.lock().unwrap().len(), 3);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_sync_skips_fetch_when_up_to_date() {
    let mut server = mockito::Server::new_async().await;
    // 호출되면 안 되는 엔드포인트
    let mock = server
        .mock("GET", "/futures/btcusdt_perp/ohlc-history")
        .match_query(mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = Arc::new(CoinglassClient::with_base_url("test-key", server.url()));
    let source = Arc::new(CoinglassOhlcSource::new(client));
    let store = Arc::new(MemStore::new());

    // 목표 시각보다 이후의 워터마크를 심어 둠
    store
        .bulk_insert(&[OhlcRecord {
            exchange: "Binance".to_string(),
            symbol: "BTCUSDT".to_string(),
            future: "btcusdt_perp".to_string(),
            interval: Interval::H4,
            open: dec!(70000),
            high: dec!(70000),
            low: dec!(70000),
            close: dec!(70000),
            t: 1730900000,
        }])
        .await
        .unwrap();

    let engine = SyncEngine::new(source, store.clone());
    let outcome = engine.sync(&series(), 1730710000).await.unwrap();

    assert_eq!(outcome, SyncOutcome::UpToDate);
    mock.assert_async().await;
}
