//! 시계열 데이터를 위한 인터벌 정의.
//!
//! 이 모듈은 프로바이더가 지원하는 시간 간격을 나타내는 인터벌 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 시계열 인터벌.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// 1시간
    H1,
    /// 4시간
    H4,
    /// 8시간
    H8,
    /// 12시간
    H12,
    /// 1일
    D1,
    /// 1주
    W1,
}

impl Interval {
    /// 이 인터벌의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Interval::H1 => Duration::from_secs(60 * 60),
            Interval::H4 => Duration::from_secs(4 * 60 * 60),
            Interval::H8 => Duration::from_secs(8 * 60 * 60),
            Interval::H12 => Duration::from_secs(12 * 60 * 60),
            Interval::D1 => Duration::from_secs(24 * 60 * 60),
            Interval::W1 => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    /// 이 인터벌의 초 단위 값을 반환합니다.
    pub fn as_secs(&self) -> u64 {
        self.duration().as_secs()
    }

    /// 프로바이더 API 파라미터 형식의 문자열을 반환합니다 (예: "4h", "1d").
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::H1 => "1h",
            Interval::H4 => "4h",
            Interval::H8 => "8h",
            Interval::H12 => "12h",
            Interval::D1 => "1d",
            Interval::W1 => "1w",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" | "h1" => Ok(Interval::H1),
            "4h" | "h4" => Ok(Interval::H4),
            "8h" | "h8" => Ok(Interval::H8),
            "12h" | "h12" => Ok(Interval::H12),
            "1d" | "d1" => Ok(Interval::D1),
            "1w" | "w1" => Ok(Interval::W1),
            _ => Err(format!("Unknown interval: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_as_str() {
        assert_eq!(Interval::H4.as_str(), "4h");
        assert_eq!(Interval::D1.as_str(), "1d");
    }

    #[test]
    fn test_interval_from_str() {
        assert_eq!("4h".parse::<Interval>().unwrap(), Interval::H4);
        assert_eq!("1D".parse::<Interval>().unwrap(), Interval::D1);
        assert!("3m".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_duration() {
        assert_eq!(Interval::H4.as_secs(), 4 * 3600);
        assert_eq!(Interval::W1.as_secs(), 7 * 24 * 3600);
    }
}
