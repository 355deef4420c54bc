//! 합산 미결제약정 동기화 모듈.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;

use derivsync_core::SeriesKey;
use derivsync_data::{CoinglassClient, CoinglassOpenInterestSource, OpenInterestStore, SyncEngine};

use crate::modules::parse_symbols;
use crate::{CollectionStats, CollectorConfig, Result};

/// 기초자산별로 거래소 합산 미결제약정 히스토리를 동기화합니다.
pub async fn sync_open_interest(
    pool: &PgPool,
    config: &CollectorConfig,
    symbols: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("미결제약정 동기화 시작");

    let target = parse_symbols(&symbols);
    let symbol_list: Vec<&String> = config
        .catalog
        .open_interest
        .iter()
        .filter(|symbol| match &target {
            Some(symbols) => symbols.contains(symbol),
            None => true,
        })
        .collect();

    if symbol_list.is_empty() {
        tracing::warn!("동기화할 심볼이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = Arc::new(CoinglassClient::from_env()?);
    let source = Arc::new(CoinglassOpenInterestSource::new(client));
    let store = Arc::new(OpenInterestStore::new(pool.clone()));
    let engine = SyncEngine::new(source, store);

    let end_time = Utc::now().timestamp();

    for (idx, symbol) in symbol_list.iter().enumerate() {
        stats.total += 1;

        let series = SeriesKey::new(symbol.as_str()).with_interval(config.sync.interval);

        tracing::debug!(
            series = %series,
            progress = format!("{}/{}", idx + 1, symbol_list.len()),
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
