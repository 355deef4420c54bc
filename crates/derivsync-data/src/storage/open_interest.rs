//! 합산 미결제약정 저장소 (`open_interest` 테이블).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use derivsync_core::{OpenInterestRecord, SeriesKey, SeriesRecord, StoreError, TimeSeriesStore};

use super::filter::{bound_timestamp, map_filters, Bound};

const TABLE: &str = "open_interest";
const TS_COLUMN: &str = "timestamp";

fn column_for(key: &str) -> Option<&'static str> {
    match key {
        "symbol" => Some("symbol"),
        "interval" => Some("interval"),
        _ => None,
    }
}

/// 합산 미결제약정 시계열 저장소.
pub struct OpenInterestStore {
    pool: PgPool,
}

impl OpenInterestStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSeriesStore<OpenInterestRecord> for OpenInterestStore {
    async fn min_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Min, &mapped).await
    }

    async fn max_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Max, &mapped).await
    }

    async fn bulk_insert(&self, records: &[OpenInterestRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut symbols: Vec<String> = Vec::with_capacity(records.len());
        let mut intervals: Vec<String> = Vec::with_capacity(records.len());
        let mut values: Vec<Decimal> = Vec::with_capacity(records.len());
        let mut sources: Vec<String> = Vec::with_capacity(records.len());
        let mut timestamps: Vec<i64> = Vec::with_capacity(records.len());
        let mut utcs: Vec<DateTime<Utc>> = Vec::with_capacity(records.len());

        for record in records {
            symbols.push(record.symbol.clone());
            intervals.push(record.interval.as_str().to_string());
            values.push(record.aggregated);
            sources.push(record.source.clone());
            timestamps.push(record.t);
            utcs.push(record.utc());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO open_interest
                (symbol, interval, aggregated_open_interest, source, "timestamp", utc)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::numeric[],
                $4::text[], $5::bigint[], $6::timestamptz[]
            )
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&symbols)
        .bind(&intervals)
        .bind(&values)
        .bind(&sources)
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
