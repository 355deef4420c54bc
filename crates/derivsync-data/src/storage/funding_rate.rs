//! 펀딩비 저장소 (`funding_rate` 테이블).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use derivsync_core::{FundingRateRecord, SeriesKey, SeriesRecord, StoreError, TimeSeriesStore};

use super::filter::{bound_timestamp, map_filters, Bound};

const TABLE: &str = "funding_rate";
const TS_COLUMN: &str = "t";

fn column_for(key: &str) -> Option<&'static str> {
    match key {
        "exchange" => Some("exchange"),
        "symbol" => Some("symbol"),
        "interval" => Some("interval"),
        _ => None,
    }
}

/// 펀딩비 시계열 저장소.
pub struct FundingRateStore {
    pool: PgPool,
}

impl FundingRateStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSeriesStore<FundingRateRecord> for FundingRateStore {
    async fn min_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Min, &mapped).await
    }

    async fn max_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Max, &mapped).await
    }

    async fn bulk_insert(&self, records: &[FundingRateRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut exchanges: Vec<String> = Vec::with_capacity(records.len());
        let mut symbols: Vec<String> = Vec::with_capacity(records.len());
        let mut intervals: Vec<String> = Vec::with_capacity(records.len());
        let mut opens: Vec<Decimal> = Vec::with_capacity(records.len());
        let mut highs: Vec<Decimal> = Vec::with_capacity(records.len());
        let mut lows: Vec<Decimal> = Vec::with_capacity(records.len());
        let mut closes: Vec<Decimal> = Vec::with_capacity(records.len());
        let mut timestamps: Vec<i64> = Vec::with_capacity(records.len());
        let mut utcs: Vec<DateTime<Utc>> = Vec::with_capacity(records.len());

        for record in records {
            exchanges.push(record.exchange.clone());
            symbols.push(record.symbol.clone());
            intervals.push(record.interval.as_str().to_string());
            opens.push(record.open);
            highs.push(record.high);
            lows.push(record.low);
            closes.push(record.close);
            timestamps.push(record.t);
            utcs.push(record.utc());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO funding_rate
                (exchange, symbol, interval, open, high, low, close, t, utc)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[],
                $4::numeric[], $5::numeric[], $6::numeric[], $7::numeric[],
                $8::bigint[], $9::timestamptz[]
            )
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&exchanges)
        .bind(&symbols)
        .bind(&intervals)
        .bind(&opens)
        .bind(&highs)
        .bind(&lows)
        .bind(&closes)
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
