//! 선물 OHLC 동기화 모듈.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;

use derivsync_core::SeriesKey;
use derivsync_data::{CoinglassClient, CoinglassOhlcSource, OhlcStore, SyncEngine};

use crate::modules::parse_symbols;
use crate::{CollectionStats, CollectorConfig, Result};

/// 카탈로그의 선물 시리즈별로 OHLC 히스토리를 동기화합니다.
pub async fn sync_ohlc(
    pool: &PgPool,
    config: &CollectorConfig,
    symbols: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("OHLC 동기화 시작");

    let target = parse_symbols(&symbols);
    let series_list: Vec<_> = config
        .catalog
        .futures
        .iter()
        .filter(|entry| match &target {
            Some(symbols) => symbols.contains(&entry.symbol),
            None => true,
        })
        .collect();

    if series_list.is_empty() {
        tracing::warn!("동기화할 시리즈가 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = Arc::new(CoinglassClient::from_env()?);
    let source = Arc::new(CoinglassOhlcSource::new(client));
    let store = Arc::new(OhlcStore::new(pool.clone()));
    let engine = SyncEngine::new(source, store);

    let end_time = Utc::now().timestamp();

    for (idx, entry) in series_list.iter().enumerate() {
        stats.total += 1;

        let series = SeriesKey::new(&entry.symbol)
            .with_exchange(&config.sync.exchange)
            .with_interval(config.sync.interval)
            .with_product(&entry.future);

        tracing::debug!(
            series = %series,
            progress = format!("{}/{}", idx + 1, series_list.len()),
            "동기화 시작"
        );

        match engine.sync(&series, end_time).await {
            Ok(outcome) => {
                stats.record(&outcome);
                tracing::info!(series = %series, outcome = ?outcome, "시리즈 동기화 완료");
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                stats.errors += 1;
                tracing::error!(series = %series, error = %e, "시리즈 동기화 실패");
            }
        }

        // Rate limiting
        tokio::time::sleep(config.sync.request_delay()).await;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
