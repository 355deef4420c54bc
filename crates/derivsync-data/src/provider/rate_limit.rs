//! 프로바이더 요청 한도 집행.
//!
//! 프로바이더의 분당 요청 한도는 호출 간 공유 자원입니다. 하나의
//! 클라이언트를 공유하는 모든 동시 호출자가 같은 limiter를 거치며,
//! 직렬화된 접근을 가정하는 대신 요청 사이에 대기합니다.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// 최소 요청 간격 기반 rate limiter.
///
/// `acquire`는 직전 요청으로부터 최소 간격이 지날 때까지 대기한 뒤
/// 반환합니다. 내부 Mutex가 대기 중에도 유지되므로 동시 호출자는
/// 자연스럽게 직렬화됩니다.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// 최소 요청 간격으로 생성합니다.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// 분당 요청 수 한도로 생성합니다.
    pub fn per_minute(requests: u32) -> Self {
        let requests = requests.max(1);
        Self::new(Duration::from_millis(60_000 / u64::from(requests)))
    }

    /// 다음 요청 슬롯을 기다립니다.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_acquire_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_second_acquire_waits_min_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_per_minute_interval() {
        let limiter = RateLimiter::per_minute(30);
        assert_eq!(limiter.min_interval, Duration::from_millis(2000));
    }
}
