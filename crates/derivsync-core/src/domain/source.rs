//! 시장 데이터 소스 추상화.
//!
//! 외부 프로바이더(파생상품 분석 API, 선물 거래소 등)로부터 시계열
//! 레코드를 조회하기 위한 프로바이더 중립적인 인터페이스를 제공합니다.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::record::SeriesRecord;
use crate::types::SeriesKey;

/// 데이터 소스 에러.
///
/// 요청 한도 초과, 빈 결과, 전송 실패는 서로 구분 가능해야 합니다.
/// 엔진은 에러를 분류만 하며, 재시도는 호출자(드라이버)의 책임입니다.
#[derive(Debug, Error)]
pub enum SourceError {
    /// 요청 한도 초과 (복구 가능: 호출자가 백오프 후 재시도)
    #[error("요청 한도 초과: {0}")]
    RateLimited(String),

    /// 요청 구간에 데이터 없음 (복구 가능: 이번 패스는 동기화할 것 없음)
    #[error("데이터 없음: {0}")]
    NoData(String),

    /// 네트워크/HTTP 전송 실패 (시리즈 단위로 복구 가능)
    #[error("전송 실패: {0}")]
    Transport(String),

    /// 프로바이더 API 에러 응답
    #[error("API 에러: {0}")]
    Api(String),

    /// 응답 파싱 실패
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 소스가 요구하는 필드가 시리즈 키에 없음
    #[error("잘못된 시리즈 키: {0}")]
    InvalidSeries(String),
}

/// 시장 데이터 소스 trait.
///
/// 심볼/인터벌/시간 구간으로 정렬된 레코드 시퀀스를 반환합니다.
/// 프로바이더의 요청 한도는 구현 내부의 공유 rate limiter가 집행합니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct CoinglassOhlcSource {
///     client: Arc<CoinglassClient>,
/// }
///
/// #[async_trait]
/// impl MarketDataSource<OhlcRecord> for CoinglassOhlcSource {
///     async fn fetch(&self, series: &SeriesKey, start: Option<i64>,
///                    end: Option<i64>, limit: Option<u32>)
///         -> Result<Vec<OhlcRecord>, SourceError> {
///         // Coinglass API 호출 및 변환
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataSource<R: SeriesRecord>: Send + Sync {
    /// 시계열 레코드 조회.
    ///
    /// # 인자
    /// * `series` - 시계열 키 (심볼, 거래소, 인터벌, 상품)
    /// * `start` - 시작 타임스탬프 (초). None이면 프로바이더 기본 조회 범위
    /// * `end` - 종료 타임스탬프 (초)
    /// * `limit` - 최대 레코드 수. None이면 프로바이더 기본값
    ///
    /// # Errors
    ///
    /// - `SourceError::RateLimited`: 요청 한도 초과
    /// - `SourceError::NoData`: 요청 구간에 데이터 없음
    /// - `SourceError::Transport`: 네트워크/HTTP 실패
    async fn fetch(
        &self,
        series: &SeriesKey,
        start: Option<i64>,
        end: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<R>, SourceError>;
}
