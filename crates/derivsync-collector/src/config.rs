//! 환경변수 및 시리즈 카탈로그 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use derivsync_core::Interval;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 동기화 공통 설정
    pub sync: SyncConfig,
    /// 동기화할 시리즈 카탈로그
    pub catalog: SeriesCatalog,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 동기화 공통 설정
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// 기준 거래소
    pub exchange: String,
    /// 수집 인터벌
    pub interval: Interval,
    /// 시리즈 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

/// 선물 시리즈 항목
#[derive(Debug, Clone, Deserialize)]
pub struct FutureSeries {
    /// 심볼 (예: "BTCUSDT")
    pub symbol: String,
    /// 프로바이더 선물 상품 키 (예: "btcusdt_perp")
    pub future: String,
}

/// 동기화할 시리즈 카탈로그.
///
/// YAML 파일(`SERIES_FILE`)에서 로드하며, 파일이 지정되지 않으면
/// BTC/ETH 기본 카탈로그를 사용합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesCatalog {
    /// OHLC/펀딩비 동기화 대상 선물 시리즈
    #[serde(default)]
    pub futures: Vec<FutureSeries>,
    /// 합산 미결제약정 동기화 대상 심볼 (기초자산)
    #[serde(default)]
    pub open_interest: Vec<String>,
    /// 만기별 선물 가격 스냅샷 대상 자산
    #[serde(default)]
    pub snapshot_assets: Vec<String>,
}

impl Default for SeriesCatalog {
    fn default() -> Self {
        Self {
            futures: vec![
                FutureSeries {
                    symbol: "BTCUSDT".to_string(),
                    future: "btcusdt_perp".to_string(),
                },
                FutureSeries {
                    symbol: "ETHUSDT".to_string(),
                    future: "ethusdt_perp".to_string(),
                },
            ],
            open_interest: vec!["BTC".to_string(), "ETH".to_string()],
            snapshot_assets: vec!["BTC".to_string(), "ETH".to_string()],
        }
    }
}

impl SeriesCatalog {
    /// YAML 파일에서 카탈로그 로드
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| CollectorError::Config(format!("시리즈 파일 로드 실패: {}", e)))?;
        settings
            .try_deserialize()
            .map_err(|e| CollectorError::Config(format!("시리즈 파일 파싱 실패: {}", e)))
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let interval_str = env_var_parse("SYNC_INTERVAL", "4h".to_string());
        let interval = Interval::from_str(&interval_str)
            .map_err(|e| CollectorError::Config(format!("SYNC_INTERVAL: {}", e)))?;

        let catalog = match std::env::var("SERIES_FILE").ok() {
            Some(path) => SeriesCatalog::from_file(&path)?,
            None => SeriesCatalog::default(),
        };

        Ok(Self {
            database_url,
            sync: SyncConfig {
                exchange: env_var_parse("SYNC_EXCHANGE", "Binance".to_string()),
                interval,
                request_delay_ms: env_var_parse("SYNC_REQUEST_DELAY_MS", 2000),
            },
            catalog,
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }
}

impl SyncConfig {
    /// 시리즈 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_btc_eth() {
        let catalog = SeriesCatalog::default();
        assert_eq!(catalog.futures.len(), 2);
        assert_eq!(catalog.futures[0].symbol, "BTCUSDT");
        assert!(catalog.open_interest.contains(&"BTC".to_string()));
        assert!(catalog.snapshot_assets.contains(&"ETH".to_string()));
    }

    #[test]
    fn test_catalog_from_yaml_file() {
        let path = std::env::temp_dir().join("derivsync_series_test.yml");
        std::fs::write(
            &path,
            r#"
futures:
  - symbol: BTCUSDT
    future: btcusdt_perp
open_interest:
  - BTC
snapshot_assets:
  - BTC
  - ETH
"#,
        )
        .unwrap();

        let catalog = SeriesCatalog::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(catalog.futures.len(), 1);
        assert_eq!(catalog.futures[0].future, "btcusdt_perp");
        assert_eq!(catalog.open_interest, vec!["BTC"]);
        assert_eq!(catalog.snapshot_assets, vec!["BTC", "ETH"]);

        std::fs::remove_file(&path).ok();
    }
}
