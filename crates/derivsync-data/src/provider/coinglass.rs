//! Coinglass Open API v3 클라이언트.
//!
//! Coinglass에서 파생상품 시계열 데이터를 수집합니다.
//!
//! # 지원 데이터
//!
//! - 선물 OHLC 히스토리 (`/futures/{future}/ohlc-history`)
//! - 펀딩비 OHLC 히스토리 (`/futures/fundingRate/ohlc-history`)
//! - 거래소 합산 미결제약정 히스토리
//!   (`/futures/openInterest/ohlc-aggregated-history`)
//! - 지원 코인 목록 (`/futures/supported-coins`)
//!
//! # 응답 형식과 한도
//!
//! 모든 응답은 `{code, msg, data}` 봉투로 감싸져 있으며 code "0"이
//! 성공입니다. 한 번의 호출로 최대 4500개의 레코드를 반환하고, 분당
//! 30회 요청 한도는 클라이언트 내부의 공유 rate limiter가 집행합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use derivsync_data::provider::coinglass::CoinglassClient;
//!
//! let client = CoinglassClient::from_env()?;
//! let records = client
//!     .ohlc_history("Binance", "BTCUSDT", "btcusdt_perp", Interval::H4, None, Some(end), None)
//!     .await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use derivsync_core::{
    Interval, MarketDataSource, OhlcRecord, FundingRateRecord, OpenInterestRecord, SeriesKey,
    SourceError, SyncError,
};

use crate::provider::rate_limit::RateLimiter;

/// Coinglass Open API 클라이언트.
pub struct CoinglassClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: RateLimiter,
}

impl CoinglassClient {
    /// API Base URL.
    pub const BASE_URL: &'static str = "https://open-api-v3.coinglass.com/api";
    /// 분당 요청 한도.
    pub const RATE_LIMIT_PER_MIN: u32 = 30;
    /// 호출당 기본 최대 레코드 수.
    pub const RESPONSE_LIMIT: u32 = 4500;
    /// API 키 환경변수 이름.
    pub const API_KEY_ENV: &'static str = "COINGLASS_API_KEY";

    /// 새로운 Coinglass API 클라이언트 생성.
    ///
    /// # Arguments
    /// * `api_key` - Coinglass API 인증키
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, Self::BASE_URL)
    }

    /// Base URL을 지정하여 생성 (테스트용).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: base_url.into(),
            limiter: RateLimiter::per_minute(Self::RATE_LIMIT_PER_MIN),
        }
    }

    /// 환경변수에서 API 키를 읽어 클라이언트 생성.
    ///
    /// `COINGLASS_API_KEY`가 설정되어 있지 않으면 설정 에러를 반환합니다
    /// (프로세스 시작 시 치명적).
    pub fn from_env() -> Result<Self, SyncError> {
        let api_key = std::env::var(Self::API_KEY_ENV).map_err(|_| {
            SyncError::Config(format!("{} 환경변수가 설정되지 않았습니다", Self::API_KEY_ENV))
        })?;
        Ok(Self::new(api_key))
    }

    /// GET 요청을 보내고 응답 봉투에서 data를 꺼냅니다.
    async fn get_data(&self, path: &str, params: &[(&str, String)]) -> Result<Value, SourceError> {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(path = path, "Coinglass API 호출");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("accept", "application/json")
            .header("CG-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited(format!(
                "분당 {}회 한도 초과",
                Self::RATE_LIMIT_PER_MIN
            )));
        }
        if !response.status().is_success() {
            return Err(SourceError::Transport(format!(
                "HTTP {}: {}",
                response.status(),
                path
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        // code는 문자열 또는 숫자로 올 수 있음
        let code = body
            .get("code")
            .map(value_to_string)
            .unwrap_or_else(|| "missing".to_string());
        if code != "0" {
            let msg = body
                .get("msg")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown");
            return Err(SourceError::Api(format!("code {}: {}", code, msg)));
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| SourceError::NoData(format!("{} 응답에 data가 없습니다", path)))
    }

    /// 레코드 배열 data를 꺼내고, 비어 있으면 NoData로 보고합니다.
    async fn get_rows(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, SourceError> {
        let data = self.get_data(path, params).await?;
        let rows = data
            .as_array()
            .cloned()
            .ok_or_else(|| SourceError::Parse(format!("{} 응답의 data가 배열이 아닙니다", path)))?;
        if rows.is_empty() {
            return Err(SourceError::NoData(format!("{} 요청 구간에 데이터 없음", path)));
        }
        Ok(rows)
    }

    /// 선물 거래가 지원되는 코인 목록 조회.
    pub async fn supported_coins(&self) -> Result<Vec<String>, SourceError> {
        let data = self.get_data("/futures/supported-coins", &[]).await?;
        serde_json::from_value(data).map_err(|e| SourceError::Parse(e.to_string()))
    }

    /// 선물 OHLC 히스토리 조회.
    ///
    /// # Arguments
    /// * `exchange` - 거래소 이름 (예: "Binance")
    /// * `symbol` - 심볼 (예: "BTCUSDT")
    /// * `future` - Coinglass 선물 상품 키
    /// * `interval` - 인터벌
    /// * `start`/`end` - 조회 구간 (초 단위, 선택)
    /// * `limit` - 최대 레코드 수 (기본 4500)
    #[allow(clippy::too_many_arguments)]
    pub async fn ohlc_history(
        &self,
        exchange: &str,
        symbol: &str,
        future: &str,
        interval: Interval,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<OhlcRecord>, SourceError> {
        let path = format!("/futures/{}/ohlc-history", future);
        let params = window_params(
            &[
                ("exchange", exchange.to_string()),
                ("symbol", symbol.to_string()),
                ("interval", interval.as_str().to_string()),
            ],
            start,
            end,
            limit,
        );

        let rows = self.get_rows(&path, &params).await?;
        rows.iter()
            .map(|row| {
                Ok(OhlcRecord {
                    exchange: exchange.to_string(),
                    symbol: symbol.to_string(),
                    future: future.to_string(),
                    interval,
                    open: field_decimal(row, "o")?,
                    high: field_decimal(row, "h")?,
                    low: field_decimal(row, "l")?,
                    close: field_decimal(row, "c")?,
                    t: field_i64(row, "t")?,
                })
            })
            .collect()
    }

    /// 펀딩비 OHLC 히스토리 조회.
    pub async fn funding_rate_history(
        &self,
        exchange: &str,
        symbol: &str,
        interval: Interval,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<FundingRateRecord>, SourceError> {
        let params = window_params(
            &[
                ("exchange", exchange.to_string()),
                ("symbol", symbol.to_string()),
                ("interval", interval.as_str().to_string()),
            ],
            start,
            end,
            limit,
        );

        let rows = self
            .get_rows("/futures/fundingRate/ohlc-history", &params)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(FundingRateRecord {
                    exchange: exchange.to_string(),
                    symbol: symbol.to_string(),
                    interval,
                    open: field_decimal(row, "o")?,
                    high: field_decimal(row, "h")?,
                    low: field_decimal(row, "l")?,
                    close: field_decimal(row, "c")?,
                    t: field_i64(row, "t")?,
                })
            })
            .collect()
    }

    /// 거래소 합산 미결제약정 히스토리 조회.
    ///
    /// 응답은 OHLC 캔들 형태이며, 표준 레코드의 합산 값은 캔들의
    /// 종가(`c`)로 정의합니다.
    pub async fn aggregated_open_interest_history(
        &self,
        symbol: &str,
        interval: Interval,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<OpenInterestRecord>, SourceError> {
        let params = window_params(
            &[
                ("symbol", symbol.to_string()),
                ("interval", interval.as_str().to_string()),
            ],
            start,
            end,
            limit,
        );

        let rows = self
            .get_rows("/futures/openInterest/ohlc-aggregated-history", &params)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(OpenInterestRecord {
                    symbol: symbol.to_string(),
                    interval,
                    aggregated: field_decimal(row, "c")?,
                    source: "coinglass".to_string(),
                    t: field_i64(row, "t")?,
                })
            })
            .collect()
    }
}

/// 공통 파라미터에 조회 구간과 limit을 붙입니다.
fn window_params(
    base: &[(&'static str, String)],
    start: Option<i64>,
    end: Option<i64>,
    limit: Option<u32>,
) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = base.to_vec();
    params.push((
        "limit",
        limit.unwrap_or(CoinglassClient::RESPONSE_LIMIT).to_string(),
    ));
    if let Some(start) = start {
        params.push(("startTime", start.to_string()));
    }
    if let Some(end) = end {
        params.push(("endTime", end.to_string()));
    }
    params
}

/// JSON 값을 문자열로 변환 (문자열/숫자 모두 허용).
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 레코드 필드를 Decimal로 파싱 (문자열/숫자 모두 허용).
fn field_decimal(row: &Value, key: &str) -> Result<Decimal, SourceError> {
    let value = row
        .get(key)
        .ok_or_else(|| SourceError::Parse(format!("필드 {} 없음", key)))?;
    match value {
        Value::String(s) => Decimal::from_str(s.trim()),
        Value::Number(n) => Decimal::from_str(&n.to_string()),
        other => {
            return Err(SourceError::Parse(format!(
                "필드 {}의 형식이 잘못됨: {}",
                key, other
            )))
        }
    }
    .map_err(|e| SourceError::Parse(format!("필드 {} 파싱 실패: {}", key, e)))
}

/// 레코드 필드를 i64로 파싱 (문자열/숫자 모두 허용).
fn field_i64(row: &Value, key: &str) -> Result<i64, SourceError> {
    let value = row
        .get(key)
        .ok_or_else(|| SourceError::Parse(format!("필드 {} 없음", key)))?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| SourceError::Parse(format!("필드 {} 파싱 실패: {}", key, n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| SourceError::Parse(format!("필드 {} 파싱 실패: {}", key, e))),
        other => Err(SourceError::Parse(format!(
            "필드 {}의 형식이 잘못됨: {}",
            key, other
        ))),
    }
}

fn require_exchange(series: &SeriesKey) -> Result<&str, SourceError> {
    series
        .exchange
        .as_deref()
        .ok_or_else(|| SourceError::InvalidSeries(format!("거래소가 없습니다: {}", series)))
}

fn require_interval(series: &SeriesKey) -> Result<Interval, SourceError> {
    series
        .interval
        .ok_or_else(|| SourceError::InvalidSeries(format!("인터벌이 없습니다: {}", series)))
}

fn require_product(series: &SeriesKey) -> Result<&str, SourceError> {
    series
        .product
        .as_deref()
        .ok_or_else(|| SourceError::InvalidSeries(format!("상품 키가 없습니다: {}", series)))
}

/// 선물 OHLC용 MarketDataSource 어댑터.
///
/// CoinglassClient를 래핑하여 프로바이더 중립적인 MarketDataSource
/// 인터페이스를 제공합니다.
pub struct CoinglassOhlcSource {
    client: Arc<CoinglassClient>,
}

impl CoinglassOhlcSource {
    /// 새 어댑터 생성.
    pub fn new(client: Arc<CoinglassClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketDataSource<OhlcRecord> for CoinglassOhlcSource {
    async fn fetch(
        &self,
        series: &SeriesKey,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<OhlcRecord>, SourceError> {
        self.client
            .ohlc_history(
                require_exchange(series)?,
                &series.symbol,
                require_product(series)?,
                require_interval(series)?,
                start,
                end,
                limit,
            )
            .await
    }
}

/// 펀딩비용 MarketDataSource 어댑터.
pub struct CoinglassFundingSource {
    client: Arc<CoinglassClient>,
}

impl CoinglassFundingSource {
    /// 새 어댑터 생성.
    pub fn new(client: Arc<CoinglassClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketDataSource<FundingRateRecord> for CoinglassFundingSource {
    async fn fetch(
        &self,
        series: &SeriesKey,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<FundingRateRecord>, SourceError> {
        self.client
            .funding_rate_history(
                require_exchange(series)?,
                &series.symbol,
                require_interval(series)?,
                start,
                end,
                limit,
            )
            .await
    }
}

/// 합산 미결제약정용 MarketDataSource 어댑터.
pub struct CoinglassOpenInterestSource {
    client: Arc<CoinglassClient>,
}

impl CoinglassOpenInterestSource {
    /// 새 어댑터 생성.
    pub fn new(client: Arc<CoinglassClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketDataSource<OpenInterestRecord> for CoinglassOpenInterestSource {
    async fn fetch(
        &self,
        series: &SeriesKey,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<OpenInterestRecord>, SourceError> {
        self.client
            .aggregated_open_interest_history(
                &series.symbol,
                require_interval(series)?,
                start,
                end,
                limit,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_field_decimal_accepts_string_and_number() {
        let row = serde_json::json!({"o": "70000.5", "c": 70500});
        assert_eq!(field_decimal(&row, "o").unwrap(), dec!(70000.5));
        assert_eq!(field_decimal(&row, "c").unwrap(), dec!(70500));
        assert!(field_decimal(&row, "h").is_err());
    }

    #[test]
    fn test_field_i64_accepts_string_and_number() {
        let row = serde_json::json!({"t": 1730678400, "s": "1730678400"});
        assert_eq!(field_i64(&row, "t").unwrap(), 1730678400);
        assert_eq!(field_i64(&row, "s").unwrap(), 1730678400);
    }

    #[test]
    fn test_window_params() {
        let params = window_params(
            &[("symbol", "BTCUSDT".to_string())],
            Some(100),
            Some(200),
            None,
        );
        assert!(params.contains(&("startTime", "100".to_string())));
        assert!(params.contains(&("endTime", "200".to_string())));
        assert!(params.contains(&("limit", "4500".to_string())));
    }

    #[tokio::test]
    async fn test_ohlc_history_maps_rows() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/futures/btcusdt_perp/ohlc-history")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"code":"0","msg":"success","data":[
                    {"t":1730678400,"o":"70000","h":"71000","l":"69500","c":"70500"},
                    {"t":1730692800,"o":"70500","h":"70800","l":"70000","c":"70200"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = CoinglassClient::with_base_url("test-key", server.url());
        let records = client
            .ohlc_history(
                "Binance",
                "BTCUSDT",
                "btcusdt_perp",
                Interval::H4,
                None,
                Some(1730700000),
                None,
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].t, 1730678400);
        assert_eq!(records[0].open, dec!(70000));
        assert_eq!(records[1].close, dec!(70200));
    }

    #[tokio::test]
    async fn test_empty_data_is_no_data() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/futures/fundingRate/ohlc-history")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"success","data":[]}"#)
            .create_async()
            .await;

        let client = CoinglassClient::with_base_url("test-key", server.url());
        let result = client
            .funding_rate_history("Binance", "BTCUSDT", Interval::H4, None, None, None)
            .await;

        assert!(matches!(result, Err(SourceError::NoData(_))));
    }

    #[tokio::test]
    async fn test_http_429_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/futures/supported-coins")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let client = CoinglassClient::with_base_url("test-key", server.url());
        let result = client.supported_coins().await;

        assert!(matches!(result, Err(SourceError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_non_zero_code_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/futures/supported-coins")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":"40001","msg":"API Key is invalid"}"#)
            .create_async()
            .await;

        let client = CoinglassClient::with_base_url("bad-key", server.url());
        let result = client.supported_coins().await;

        assert!(matches!(result, Err(SourceError::Api(_))));
    }

    #[tokio::test]
    async fn test_fetch_requires_series_fields() {
        let client = Arc::new(CoinglassClient::with_base_url("k", "http://unused"));
        let source = CoinglassOhlcSource::new(client);

        // 거래소/인터벌/상품 키가 없는 시리즈
        let series = SeriesKey::new("BTCUSDT");
        let result = source.fetch(&series, None, None, None).await;
        assert!(matches!(result, Err(SourceError::InvalidSeries(_))));
    }
}
