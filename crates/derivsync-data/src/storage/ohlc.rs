//! 선물 OHLC 저장소 (`ohlc_history` 테이블).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use derivsync_core::{OhlcRecord, SeriesKey, SeriesRecord, StoreError, TimeSeriesStore};

use super::filter::{bound_timestamp, map_filters, Bound};

const TABLE: &str = "ohlc_history";
const TS_COLUMN: &str = "t";

fn column_for(key: &str) -> Option<&'static str> {
    match key {
        "exchange" => Some("exchange"),
        "symbol" => Some("symbol"),
        "interval" => Some("interval"),
        "product" => Some("coinglass_future"),
        _ => None,
    }
}

/// 선물 OHLC 시계열 저장소.
pub struct OhlcStore {
    pool: PgPool,
}

impl OhlcStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSeriesStore<OhlcRecord> for OhlcStore {
    async fn min_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Min, &mapped).await
    }

    async fn max_timestamp(&self, series: &SeriesKey) -> Result<Option<i64>, StoreError> {
        let mapped = map_filters(&series.filters(), column_for)?;
        bound_timestamp(&self.pool, TABLE, TS_COLUMN, Bound::Max, &mapped).await
    }

    async fn bulk_insert(&self, records: &[OhlcRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut exchanges: Vec<String> = Vec::with_capacity(records.len());
        let mut symbols: Vec<String> = Vec::with_capacity(records.len());
        let mut futures: Vec<String> = Vec::with_capacity(records.len());
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
            futures.push(record.future.clone());
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
            INSERT INTO ohlc_history
                (exchange, symbol, coinglass_future, interval,
                 open, high, low, close, t, utc)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[],
                $5::numeric[], $6::numeric[], $7::numeric[], $8::numeric[],
                $9::bigint[], $10::timestamptz[]
            )
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&exchanges)
        .bind(&symbols)
        .bind(&futures)
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
