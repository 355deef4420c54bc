//! 만기별 선물 가격 스냅샷 모듈.
//!
//! 만기 캘린더로 자산별 전체 구분의 종목명을 해석하고, Deribit에서
//! 각 종목의 최근 종가를 조회하여 저장합니다. 시각이 워터마크 이하인
//! 스냅샷은 삽입하지 않으므로 반복 실행해도 중복이 생기지 않습니다.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;

use derivsync_core::{
    FuturesPriceRecord, SeriesKey, SourceError, StoreError, SyncError, TimeSeriesStore,
};
use derivsync_data::{DeribitClient, FuturesPriceStore, TenorInstrument};

use crate::modules::parse_symbols;
use crate::{CollectionStats, CollectorConfig, Result};

/// 자산별 만기 구분 종목의 가격 스냅샷을 수집합니다.
pub async fn snapshot_futures(
    pool: &PgPool,
    config: &CollectorConfig,
    assets: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("선물 가격 스냅샷 시작");

    let target = parse_symbols(&assets);
    let asset_list: Vec<&String> = config
        .catalog
        .snapshot_assets
        .iter()
        .filter(|asset| match &target {
            Some(assets) => assets.contains(asset),
            None => true,
        })
        .collect();

    if asset_list.is_empty() {
        tracing::warn!("스냅샷 대상 자산이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = Arc::new(DeribitClient::new());
    let store = FuturesPriceStore::new(pool.clone());

    let now = Utc::now();
    let today = now.date_naive();
    let end = now.timestamp();

    for asset in asset_list {
        let instruments = TenorInstrument::for_asset(asset, today);
        tracing::debug!(
            asset = asset.as_str(),
            instruments = instruments.len(),
            "종목명 해석 완료"
        );

        // 실제 상장된 종목만 조회 (캘린더의 주간/월간 만기 중 일부는
        // 상장되지 않을 수 있음)
        let listed = match client.instruments(asset).await {
            Ok(names) => Some(names),
            Err(e) => {
                tracing::warn!(asset = asset.as_str(), error = %e, "종목 목록 조회 실패, 전체 시도");
                None
            }
        };

        for instrument in instruments {
            stats.total += 1;

            if let Some(listed) = &listed {
                if !listed.contains(&instrument.name) {
                    stats.success += 1;
                    stats.no_data += 1;
                    tracing::debug!(instrument = instrument.name, "상장되지 않은 종목, 건너뜀");
                    continue;
                }
            }

            let series = SeriesKey::new(asset.as_str()).with_product(instrument.tenor.as_str());

            let (tick, price) = match client.latest_close(&instrument.name, end).await {
                Ok(snapshot) => snapshot,
                Err(SourceError::NoData(reason)) => {
                    stats.success += 1;
                    stats.no_data += 1;
                    tracing::debug!(instrument = instrument.name, reason = reason, "데이터 없음");
                    continue;
                }
                Err(e) => {
                    stats.errors += 1;
                    tracing::error!(instrument = instrument.name, error = %e, "조회 실패");
                    continue;
                }
            };

            // 워터마크 이하의 스냅샷은 건너뜀
            let watermark = match store.max_timestamp(&series).await {
                Ok(watermark) => watermark,
                Err(e) => {
                    note_store_error(e, &mut stats, &instrument.name)?;
                    continue;
                }
            };
            if watermark.is_some_and(|max| tick <= max) {
                stats.success += 1;
                stats.up_to_date += 1;
                tracing::debug!(instrument = instrument.name, tick = tick, "이미 최신 상태");
                continue;
            }

            let record = FuturesPriceRecord {
                asset: asset.to_string(),
                instrument: instrument.name.clone(),
                tenor: instrument.tenor,
                expiration: instrument.expiration,
                price,
                t: tick,
            };

            let inserted = match store.bulk_insert(&[record]).await {
                Ok(inserted) => inserted,
                Err(e) => {
                    note_store_error(e, &mut stats, &instrument.name)?;
                    continue;
                }
            };
            stats.success += 1;
            stats.total_records += inserted;
            tracing::info!(
                instrument = instrument.name,
                tick = tick,
                price = %price,
                "스냅샷 저장 완료"
            );

            // Rate limiting
            tokio::time::sleep(config.sync.request_delay()).await;
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 저장소 에러를 분류합니다.
///
/// 치명적인 에러(저장소 불일치)는 되돌려 실행을 중단하고, 그 외에는
/// 통계에 기록한 뒤 다음 종목으로 계속 진행할 수 있게 합니다.
fn note_store_error(
    error: StoreError,
    stats: &mut CollectionStats,
    instrument: &str,
) -> Result<()> {
    let error = SyncError::from(error);
    if error.is_fatal() {
        return Err(error.into());
    }
    stats.errors += 1;
    tracing::error!(instrument = instrument, error = %error, "저장소 접근 실패");
    Ok(())
}
