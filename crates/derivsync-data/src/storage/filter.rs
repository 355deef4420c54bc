//! 시리즈 필터의 컬럼 사상과 워터마크 조회.
//!
//! 시리즈 키의 필터는 중립 키("symbol", "exchange", "interval",
//! "product")로 표현되므로, 각 저장소가 자기 테이블의 컬럼명으로
//! 사상한 뒤 공통 MIN/MAX 쿼리를 실행합니다.

use derivsync_core::StoreError;
use sqlx::PgPool;

/// 워터마크 경계 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    Min,
    Max,
}

impl Bound {
    fn as_sql(&self) -> &'static str {
        match self {
            Bound::Min => "MIN",
            Bound::Max => "MAX",
        }
    }
}

/// 중립 필터 키를 테이블 컬럼명으로 사상합니다.
///
/// 사상되지 않는 키가 있으면 시리즈 키가 이 저장소와 맞지 않는
/// 것이므로 에러를 반환합니다.
pub(crate) fn map_filters(
    filters: &[(&'static str, String)],
    column_for: fn(&str) -> Option<&'static str>,
) -> Result<Vec<(&'static str, String)>, StoreError> {
    filters
        .iter()
        .map(|(key, value)| {
            column_for(key)
                .map(|column| (column, value.clone()))
                .ok_or_else(|| StoreError::Query(format!("지원하지 않는 필터 키: {}", key)))
        })
        .collect()
}

/// 워터마크 조회 SQL을 생성합니다.
pub(crate) fn bound_sql(table: &str, ts_column: &str, bound: Bound, columns: &[&str]) -> String {
    let mut sql = format!(
        "SELECT {}(\"{}\") FROM {}",
        bound.as_sql(),
        ts_column,
        table
    );
    for (i, column) in columns.iter().enumerate() {
        let keyword = if i == 0 { " WHERE" } else { " AND" };
        sql.push_str(&format!("{} {} = ${}", keyword, column, i + 1));
    }
    sql
}

/// 필터 조건에 맞는 행들의 MIN/MAX 타임스탬프를 조회합니다.
///
/// 조건에 맞는 행이 없으면 None을 반환합니다.
pub(crate) async fn bound_timestamp(
    pool: &PgPool,
    table: &str,
    ts_column: &str,
    bound: Bound,
    mapped: &[(&'static str, String)],
) -> Result<Option<i64>, StoreError> {
    let columns: Vec<&str> = mapped.iter().map(|(column, _)| *column).collect();
    let sql = bound_sql(table, ts_column, bound, &columns);

    let mut query = sqlx::query_scalar::<_, Option<i64>>(&sql);
    for (_, value) in mapped {
        query = query.bind(value);
    }

    query
        .fetch_one(pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_for(key: &str) -> Option<&'static str> {
        match key {
            "symbol" => Some("symbol"),
            "product" => Some("coinglass_future"),
            _ => None,
        }
    }

    #[test]
    fn test_bound_sql_no_filters() {
        assert_eq!(
            bound_sql("ohlc_history", "t", Bound::Max, &[]),
            "SELECT MAX(\"t\") FROM ohlc_history"
        );
    }

    #[test]
    fn test_bound_sql_with_filters() {
        assert_eq!(
            bound_sql("ohlc_history", "t", Bound::Min, &["exchange", "symbol"]),
            "SELECT MIN(\"t\") FROM ohlc_history WHERE exchange = $1 AND symbol = $2"
        );
    }

    #[test]
    fn test_map_filters_renames_columns() {
        let filters = vec![
            ("symbol", "BTCUSDT".to_string()),
            ("product", "btcusdt_perp".to_string()),
        ];
        let mapped = map_filters(&filters, column_for).unwrap();
        assert_eq!(
            mapped,
            vec![
                ("symbol", "BTCUSDT".to_string()),
                ("coinglass_future", "btcusdt_perp".to_string()),
            ]
        );
    }

    #[test]
    fn test_map_filters_rejects_unknown_key() {
        let filters = vec![("exchange", "Binance".to_string())];
        assert!(matches!(
            map_filters(&filters, column_for),
            Err(StoreError::Query(_))
        ));
    }
}
