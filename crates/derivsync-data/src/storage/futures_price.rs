//! 만기별 선물 가격 스냅샷 저장소 (`deribit_futures` 테이블).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use derivsync_core::{FuturesPriceRecord, SeriesKey, SeriesRecord, StoreError, TimeSeriesStore};

use super::filter::{bound_timestamp, map_filters, Bound};

const TABLE: &str = "deribit_futures";
const TS_COLUMN: &str = "unix_timestamp";

fn column_for(key: &str) -> Option<&'static str> {
    match key {
        // 시리즈 키의 symbol은 기초자산, product는 만기 구분
        "symbol" => Some("asset"),
        "product" => Some("tenor"),
        _ => None,
    }
}

/// 만기별 선물 가격 스냅샷 저장소.
pub struct FuturesPriceStore {
    pool: PgPool,
}

impl FuturesPriceStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSeriesStore<FuturesPriceRecord> for FuturesPriceStore {
    async fn min_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Min, &mapped).await
    }

    async fn max_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Max, &mapped).await
    }

    async fn bulk_insert(&self, records: &[FuturesPriceRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut assets: Vec<String> = Vec::with_capacity(records.len());
        let mut instruments: Vec<String> = Vec::with_capacity(records.len());
        let mut tenors: Vec<String> = Vec::with_capacity(records.len());
        let mut expirations: Vec<Option<NaiveDate>> = Vec::with_capacity(records.len());
        let mut prices: Vec<Decimal> = Vec::with_capacity(records.len());
        let mut timestamps: Vec<i64> = Vec::with_capacity(records.len());
        let mut utcs: Vec<DateTime<Utc>> = Vec::with_capacity(records.len());

        for record in records {
            assets.push(record.asset.clone());
            instruments.push(record.instrument.clone());
            tenors.push(record.tenor.as_str().to_string());
            expirations.push(record.expiration);
            prices.push(record.price);
            timestamps.push(record.t);
            utcs.push(record.utc());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO deribit_futures
                (asset, instrument, tenor, expiration, price, unix_timestamp, utc)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::date[],
                $5::numeric[], $6::bigint[], $7::timestamptz[]
            )
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&assets)
        .bind(&instruments)
        .bind(&tenors)
        .bind(&expirations)
        .bind(&prices)
        .bind(&timestamps)
        .bind(&utcs)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Insert(e.to_string()))?;

        let inserted = result.rows_affected() as usize;
        tracing::debug!(table = TABLE, inserted = inserted, "벌크 삽입 완료");
        Ok(inserted)
    }
}
