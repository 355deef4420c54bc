//! 데이터 수집 모듈.

pub mod funding_sync;
pub mod futures_snapshot;
pub mod ohlc_sync;
pub mod open_interest_sync;

pub use funding_sync::sync_funding;
pub use futures_snapshot::snapshot_futures;
pub use ohlc_sync::sync_ohlc;
pub use open_interest_sync::sync_open_interest;

/// 쉼표로 구분된 심볼 목록을 파싱합니다.
pub(crate) fn parse_symbols(symbols: &Option<String>) -> Option<Vec<String>> {
    symbols.as_ref().map(|s| {
        s.split(',')
            .map(|sym| sym.trim().to_string())
            .filter(|sym| !sym.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols() {
        assert_eq!(parse_symbols(&None), None);
        assert_eq!(
            parse_symbols(&Some("BTCUSDT, ETHUSDT".to_string())),
            Some(vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()])
        );
        assert_eq!(parse_symbols(&Some("".to_string())), Some(vec![]));
    }
}
