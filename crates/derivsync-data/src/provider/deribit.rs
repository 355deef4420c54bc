//! Deribit public API 클라이언트.
//!
//! 만기 캘린더로 해석한 종목명(예: "BTC-29NOV24", "BTC-PERPETUAL")의
//! 최근 종가를 TradingView 차트 엔드포인트에서 조회합니다. 인증이
//! 필요 없는 public 엔드포인트만 사용합니다.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use derivsync_core::{initial_expirations, roll_forward, SourceError, Tenor};

/// 만기 구분이 해석된 거래 종목.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenorInstrument {
    /// 만기 구분
    pub tenor: Tenor,
    /// 만기일 (perpetual은 None)
    pub expiration: Option<NaiveDate>,
    /// 거래 종목명 (예: "BTC-29NOV24")
    pub name: String,
}

impl TenorInstrument {
    /// 기준일의 만기 캘린더로 자산의 전체 구분 종목을 해석합니다.
    ///
    /// perpetual을 포함한 모든 구분이 반환됩니다. 기준일 당일이 만기인
    /// 구분은 롤오버된 다음 만기로 해석합니다 (만기일의 스냅샷이 만료
    /// 종목을 가리키지 않도록).
    pub fn for_asset(asset: &str, reference: NaiveDate) -> Vec<TenorInstrument> {
        let catalog = roll_forward(&initial_expirations(reference), reference);
        Tenor::ALL
            .into_iter()
            .filter_map(|tenor| {
                catalog.instrument_name(asset, tenor).map(|name| TenorInstrument {
                    tenor,
                    expiration: catalog.get(tenor),
                    name,
                })
            })
            .collect()
    }
}

/// TradingView 차트 응답.
#[derive(Debug, Clone)]
pub struct ChartData {
    /// 캔들 시각 (Unix 초)
    pub ticks: Vec<i64>,
    /// 캔들 종가
    pub close: Vec<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<ChartResult>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    status: String,
    #[serde(default)]
    ticks: Vec<i64>,
    #[serde(default)]
    close: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct InstrumentsEnvelope {
    result: Option<Vec<InstrumentInfo>>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    instrument_name: String,
}

/// Deribit public API 클라이언트.
pub struct DeribitClient {
    client: reqwest::Client,
    base_url: String,
}

impl DeribitClient {
    /// Public API Base URL.
    pub const BASE_URL: &'static str = "https://www.deribit.com/api/v2/public";

    /// 새 클라이언트 생성.
    pub fn new() -> Self {
        Self::with_base_url(Self::BASE_URL)
    }

    /// Base URL을 지정하여 생성 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: base_url.into(),
        }
    }

    /// TradingView 차트 데이터 조회.
    ///
    /// # Arguments
    /// * `instrument` - 종목명 (예: "BTC-PERPETUAL")
    /// * `start_ms`/`end_ms` - 조회 구간 (밀리초)
    /// * `resolution` - 캔들 해상도 (분 단위 문자열, 예: "60")
    ///
    /// 구간에 데이터가 없으면 (`status == "no_data"`) NoData를 반환합니다.
    /// 시각은 밀리초에서 초로 변환하여 반환합니다.
    pub async fn tradingview_chart_data(
        &self,
        instrument: &str,
        start_ms: i64,
        end_ms: i64,
        resolution: &str,
    ) -> Result<ChartData, SourceError> {
        let url = format!("{}/get_tradingview_chart_data", self.base_url);
        tracing::debug!(instrument = instrument, "Deribit 차트 조회");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("instrument_name", instrument),
                ("start_timestamp", &start_ms.to_string()),
                ("end_timestamp", &end_ms.to_string()),
                ("resolution", resolution),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Transport(format!(
                "HTTP {}: {}",
                response.status(),
                instrument
            )));
        }

        let envelope: ChartEnvelope = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(SourceError::Api(format!("{}: {}", instrument, error)));
        }
        let result = envelope
            .result
            .ok_or_else(|| SourceError::Parse(format!("{} 응답에 result가 없습니다", instrument)))?;

        if result.status == "no_data" || result.ticks.is_empty() {
            return Err(SourceError::NoData(format!("{} 구간에 데이터 없음", instrument)));
        }

        let mut close = Vec::with_capacity(result.close.len());
        for value in &result.close {
            let parsed = match value {
                Value::Number(n) => Decimal::from_str(&n.to_string()),
                Value::String(s) => Decimal::from_str(s.trim()),
                other => {
                    return Err(SourceError::Parse(format!(
                        "{} 종가 형식이 잘못됨: {}",
                        instrument, other
                    )))
                }
            }
            .map_err(|e| SourceError::Parse(format!("{} 종가 파싱 실패: {}", instrument, e)))?;
            close.push(parsed);
        }

        Ok(ChartData {
            ticks: result.ticks.iter().map(|ms| ms / 1000).collect(),
            close,
        })
    }

    /// 현재 상장된 선물 종목명 목록을 조회합니다.
    ///
    /// 캘린더가 계산한 만기 중 실제로 상장되지 않은 종목을 조회
    /// 전에 걸러내는 데 사용합니다.
    pub async fn instruments(&self, currency: &str) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/get_instruments", self.base_url);
        tracing::debug!(currency = currency, "Deribit 종목 목록 조회");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("currency", currency),
                ("kind", "future"),
                ("expired", "false"),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Transport(format!(
                "HTTP {}: get_instruments",
                response.status()
            )));
        }

        let envelope: InstrumentsEnvelope = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(SourceError::Api(format!("{}: {}", currency, error)));
        }
        let result = envelope
            .result
            .ok_or_else(|| SourceError::Parse(format!("{} 응답에 result가 없습니다", currency)))?;

        Ok(result.into_iter().map(|i| i.instrument_name).collect())
    }

    /// 종목의 가장 최근 (시각, 종가)를 반환합니다.
    ///
    /// `end` 시각(초)에서 하루를 거슬러 올라간 구간을 60분 캔들로
    /// 조회하여 마지막 캔들을 선택합니다.
    pub async fn latest_close(
        &self,
        instrument: &str,
        end: i64,
    ) -> Result<(i64, Decimal), SourceError> {
        let end_ms = end * 1000;
        let start_ms = end_ms - 24 * 60 * 60 * 1000;
        let chart = self
            .tradingview_chart_data(instrument, start_ms, end_ms, "60")
            .await?;

        match (chart.ticks.last(), chart.close.last()) {
            (Some(&tick), Some(&close)) => Ok((tick, close)),
            _ => Err(SourceError::NoData(format!("{} 구간에 데이터 없음", instrument))),
        }
    }
}

impl Default for DeribitClient {
    fn default() -> Self {
        Self::new()
    }
}
