//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use derivsync_data::SyncOutcome;

/// 수집 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 건너뛴 횟수 (이미 최신 상태)
    pub up_to_date: usize,
    /// 프로바이더에 데이터 없음
    pub no_data: usize,
    /// 새 레코드가 없어 삽입하지 않음
    pub nothing_new: usize,
    /// 삽입된 총 레코드 수
    pub total_records: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 동기화 결과를 통계에 반영
    pub fn record(&mut self, outcome: &SyncOutcome) {
        self.success += 1;
        match outcome {
            SyncOutcome::UpToDate => self.up_to_date += 1,
            SyncOutcome::NoData => self.no_data += 1,
            SyncOutcome::NothingToInsert => self.nothing_new += 1,
            SyncOutcome::Inserted { count, .. } => self.total_records += count,
        }
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            up_to_date = self.up_to_date,
            no_data = self.no_data,
            nothing_new = self.nothing_new,
            total_records = self.total_records,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_maps_outcomes() {
        let mut stats = CollectionStats::new();
        stats.total = 4;
        stats.record(&SyncOutcome::UpToDate);
        stats.record(&SyncOutcome::NoData);
        stats.record(&SyncOutcome::NothingToInsert);
        stats.record(&SyncOutcome::Inserted {
            count: 10,
            first: 100,
            last: 200,
        });

        assert_eq!(stats.success, 4);
        assert_eq!(stats.up_to_date, 1);
        assert_eq!(stats.no_data, 1);
        assert_eq!(stats.nothing_new, 1);
        assert_eq!(stats.total_records, 10);
        assert_eq!(stats.success_rate(), 100.0);
    }
}
