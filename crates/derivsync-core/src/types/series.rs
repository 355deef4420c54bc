//! 논리적 시계열 식별 키.
//!
//! 하나의 시계열은 심볼과 선택적인 거래소/인터벌/상품 키의 조합으로
//! 식별됩니다. 저장소는 이 키를 동등 비교 필터의 논리곱으로 해석합니다.

use crate::types::Interval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 시계열 식별 키.
///
/// 불변 값 타입입니다. 저장소의 범위 조회(`min_timestamp`/`max_timestamp`)에
/// 전달되는 필터 집합이며, 각 저장소 구현이 필드를 자신의 컬럼으로 해석합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// 심볼 (예: "BTCUSDT", "BTC")
    pub symbol: String,
    /// 거래소 (예: "Binance")
    pub exchange: Option<String>,
    /// 인터벌
    pub interval: Option<Interval>,
    /// 프로바이더 상품 키 (예: Coinglass future 이름, Deribit 종목명)
    pub product: Option<String>,
}

impl SeriesKey {
    /// 심볼만으로 새 키를 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: None,
            interval: None,
            product: None,
        }
    }

    /// 거래소를 지정합니다.
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// 인터벌을 지정합니다.
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// 상품 키를 지정합니다.
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// 설정된 필드를 (키, 값) 필터 쌍으로 반환합니다.
    ///
    /// 키는 중립적인 이름("symbol", "exchange", "interval", "product")이며
    /// 저장소 구현이 실제 컬럼명으로 해석합니다. 리플렉션 기반 속성 조회는
    /// 사용하지 않습니다.
    pub fn filters(&self) -> Vec<(&'static str, String)> {
        let mut filters = vec![("symbol", self.symbol.clone())];
        if let Some(exchange) = &self.exchange {
            filters.push(("exchange", exchange.clone()));
        }
        if let Some(interval) = &self.interval {
            filters.push(("interval", interval.as_str().to_string()));
        }
        if let Some(product) = &self.product {
            filters.push(("product", product.clone()));
        }
        filters
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)?;
        if let Some(exchange) = &self.exchange {
            write!(f, "@{}", exchange)?;
        }
        if let Some(product) = &self.product {
            write!(f, "/{}", product)?;
        }
        if let Some(interval) = &self.interval {
            write!(f, ":{}", interval)?;
        }
        Ok(())
    }
}
