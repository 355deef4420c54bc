//! 선물 만기 캘린더.
//!
//! 기준일로부터 표준 선물 만기 목록(만기일 카탈로그)을 계산하고,
//! 만기가 도래한 구분을 롤오버하며, 만기일로부터 거래 종목명을
//! 생성합니다. 순수 날짜 계산만 수행하며 I/O가 없습니다.
//!
//! 표준 만기는 perpetual을 제외하면 항상 금요일입니다.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 선물 만기 구분 (tenor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenor {
    /// 이번 주 금요일 만기
    CurrentWeek,
    /// 다음 주 금요일 만기
    NextWeek,
    /// 이번 달 마지막 금요일 만기
    CurrentMonth,
    /// 이번 분기 말월의 마지막 금요일 만기
    CurrentQuarter,
    /// 다음 분기 첫 달의 마지막 금요일 만기
    FirstMonthNextQuarter,
    /// 다음 분기 말월 만기
    Quarter1,
    /// 2분기 뒤 말월 만기
    Quarter2,
    /// 3분기 뒤 말월 만기
    Quarter3,
    /// 무기한 (만기 없음)
    Perpetual,
}

impl Tenor {
    /// 만기가 있는 구분 목록 (perpetual 제외).
    pub const DATED: [Tenor; 8] = [
        Tenor::CurrentWeek,
        Tenor::NextWeek,
        Tenor::CurrentMonth,
        Tenor::CurrentQuarter,
        Tenor::FirstMonthNextQuarter,
        Tenor::Quarter1,
        Tenor::Quarter2,
        Tenor::Quarter3,
    ];

    /// 모든 구분 목록.
    pub const ALL: [Tenor; 9] = [
        Tenor::CurrentWeek,
        Tenor::NextWeek,
        Tenor::CurrentMonth,
        Tenor::CurrentQuarter,
        Tenor::FirstMonthNextQuarter,
        Tenor::Quarter1,
        Tenor::Quarter2,
        Tenor::Quarter3,
        Tenor::Perpetual,
    ];

    /// 문자열로 변환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tenor::CurrentWeek => "current_week",
            Tenor::NextWeek => "next_week",
            Tenor::CurrentMonth => "current_month",
            Tenor::CurrentQuarter => "current_quarter",
            Tenor::FirstMonthNextQuarter => "first_month_next_quarter",
            Tenor::Quarter1 => "quarter_1",
            Tenor::Quarter2 => "quarter_2",
            Tenor::Quarter3 => "quarter_3",
            Tenor::Perpetual => "perpetual",
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tenor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_week" => Ok(Tenor::CurrentWeek),
            "next_week" => Ok(Tenor::NextWeek),
            "current_month" => Ok(Tenor::CurrentMonth),
            "current_quarter" => Ok(Tenor::CurrentQuarter),
            "first_month_next_quarter" => Ok(Tenor::FirstMonthNextQuarter),
            "quarter_1" => Ok(Tenor::Quarter1),
            "quarter_2" => Ok(Tenor::Quarter2),
            "quarter_3" => Ok(Tenor::Quarter3),
            "perpetual" => Ok(Tenor::Perpetual),
            _ => Err(format!("Unknown tenor: {}", s)),
        }
    }
}

/// 만기 구분별 만기일 카탈로그.
///
/// perpetual은 만기가 없으므로 카탈로그에 포함되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpirationCatalog {
    dates: BTreeMap<Tenor, NaiveDate>,
}

impl ExpirationCatalog {
    /// 구분의 만기일을 반환합니다.
    pub fn get(&self, tenor: Tenor) -> Option<NaiveDate> {
        self.dates.get(&tenor).copied()
    }

    /// (구분, 만기일) 쌍을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (Tenor, NaiveDate)> + '_ {
        self.dates.iter().map(|(&t, &d)| (t, d))
    }

    /// 구분의 거래 종목명을 생성합니다.
    ///
    /// perpetual은 `"{symbol}-PERPETUAL"`, 그 외에는 만기일을
    /// `일(앞자리 0 없음) + 월 약어(대문자) + 연도 두 자리`로 포맷하여
    /// `"{symbol}-{날짜}"` 형태로 만듭니다 (예: "BTC-29NOV24").
    ///
    /// 카탈로그에 해당 구분의 만기일이 없으면 None을 반환합니다.
    pub fn instrument_name(&self, symbol: &str, tenor: Tenor) -> Option<String> {
        if tenor == Tenor::Perpetual {
            return Some(format!("{}-PERPETUAL", symbol));
        }
        self.get(tenor)
            .map(|date| format!("{}-{}", symbol, format_expiry_code(date)))
    }

    fn insert(&mut self, tenor: Tenor, date: NaiveDate) {
        self.dates.insert(tenor, date);
    }
}

/// 만기일을 종목명 코드로 포맷합니다 (예: 2024-11-05 -> "5NOV24").
pub fn format_expiry_code(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];
    format!(
        "{}{}{:02}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year() % 100
    )
}

/// 해당 월의 마지막 날짜를 반환합니다.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .expect("유효하지 않은 연/월")
}

/// 해당 월의 표준 만기일(마지막 금요일)을 반환합니다.
///
/// 월의 마지막 날짜에서 시작해 금요일이 될 때까지 하루씩 거슬러
/// 올라갑니다.
pub fn last_standard_expiry(year: i32, month: u32) -> NaiveDate {
    let mut date = last_day_of_month(year, month);
    while date.weekday() != Weekday::Fri {
        date -= Duration::days(1);
    }
    date
}

/// 기준일로부터 초기 만기일 카탈로그를 계산합니다.
///
/// - `current_week`: 기준일이 속한 주의 금요일 (기준일이 금요일이면 기준일)
/// - `next_week`: current_week + 7일
/// - `current_month`: 기준월의 마지막 금요일
/// - `current_quarter`: 기준 분기 말월의 마지막 금요일
/// - `first_month_next_quarter`: 다음 분기 첫 달의 마지막 금요일 (연도 넘김 처리)
/// - `quarter_1..3`: 이후 세 분기 말월의 마지막 금요일
pub fn initial_expirations(reference: NaiveDate) -> ExpirationCatalog {
    let (year, month) = (reference.year(), reference.month());
    let mut catalog = ExpirationCatalog::default();

    // 주간 만기: 기준일의 요일을 같은 주 금요일로 사상
    let weekday = reference.weekday().num_days_from_monday() as i64;
    let days_to_friday = (4 - weekday).rem_euclid(7);
    let current_week = reference + Duration::days(days_to_friday);
    catalog.insert(Tenor::CurrentWeek, current_week);
    catalog.insert(Tenor::NextWeek, current_week + Duration::days(7));

    // 월간 만기
    catalog.insert(Tenor::CurrentMonth, last_standard_expiry(year, month));

    // 분기 만기: 분기 인덱스 = (월-1)/3 + 1, 분기 말월 = 인덱스 * 3
    let quarter = (month - 1) / 3 + 1;
    let quarter_end_month = quarter * 3;
    catalog.insert(
        Tenor::CurrentQuarter,
        last_standard_expiry(year, quarter_end_month),
    );

    // 다음 분기 첫 달 (12월 다음은 이듬해 1월)
    let (fm_year, fm_month) = if quarter_end_month < 12 {
        (year, quarter_end_month + 1)
    } else {
        (year + 1, 1)
    };
    catalog.insert(
        Tenor::FirstMonthNextQuarter,
        last_standard_expiry(fm_year, fm_month),
    );

    // 이후 세 분기의 말월 (연도 넘김은 정수 나눗셈으로 처리)
    for (i, tenor) in [Tenor::Quarter1, Tenor::Quarter2, Tenor::Quarter3]
        .into_iter()
        .enumerate()
    {
        let raw_month = (quarter + i as u32 + 1) * 3;
        let q_year = year + ((raw_month - 1) / 12) as i32;
        let q_month = (raw_month - 1) % 12 + 1;
        catalog.insert(tenor, last_standard_expiry(q_year, q_month));
    }

    catalog
}

/// 만기가 도래한 구분을 롤오버한 새 카탈로그를 반환합니다.
///
/// 만기일이 `current_date` 이하인 구분만 대상이며, 구분별 규칙은:
/// - `current_week`: 정확히 7일 뒤로
/// - `current_month`: 다음 달의 마지막 금요일로 (12월→1월은 연도 증가)
/// - `current_quarter`: 다음 분기 말월의 마지막 금요일로
/// - 그 외 구분(perpetual 포함)은 만기가 지나도 변경하지 않습니다.
///   `next_week`, `quarter_1..3`, `first_month_next_quarter`는 충분히
///   미래로 계산되어 정상 운영에서는 롤오버가 필요 없다고 간주합니다.
pub fn roll_forward(catalog: &ExpirationCatalog, current_date: NaiveDate) -> ExpirationCatalog {
    let mut rolled = ExpirationCatalog::default();

    for (tenor, expiration) in catalog.iter() {
        let next = if current_date >= expiration {
            match tenor {
                Tenor::CurrentWeek => expiration + Duration::days(7),
                Tenor::CurrentMonth => {
                    let next_month = expiration.month() % 12 + 1;
                    let next_year = expiration.year() + i32::from(next_month == 1);
                    last_standard_expiry(next_year, next_month)
                }
                Tenor::CurrentQuarter => {
                    let raw_month = (expiration.month() + 2) / 3 * 3 + 3;
                    let next_year = expiration.year() + i32::from(raw_month > 12);
                    let next_month = match raw_month % 12 {
                        0 => 12,
                        m => m,
                    };
                    last_standard_expiry(next_year, next_month)
                }
                _ => expiration,
            }
        } else {
            expiration
        };
        rolled.insert(tenor, next);
    }

    rolled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_last_standard_expiry() {
        // 2024년 11월의 마지막 금요일
        assert_eq!(last_standard_expiry(2024, 11), date(2024, 11, 29));
        // 2025년 1월 31일은 그 자체가 금요일
        assert_eq!(last_standard_expiry(2025, 1), date(2025, 1, 31));
        assert_eq!(last_standard_expiry(2024, 12), date(2024, 12, 27));
    }

    #[test]
    fn test_initial_expirations_reference_monday() {
        // 2024-11-04는 월요일
        let catalog = initial_expirations(date(2024, 11, 4));

        assert_eq!(catalog.get(Tenor::CurrentWeek), Some(date(2024, 11, 8)));
        assert_eq!(catalog.get(Tenor::NextWeek), Some(date(2024, 11, 15)));
        assert_eq!(catalog.get(Tenor::CurrentMonth), Some(date(2024, 11, 29)));
        // Q4 말월은 12월
        assert_eq!(catalog.get(Tenor::CurrentQuarter), Some(date(2024, 12, 27)));
        // 다음 분기 첫 달은 이듬해 1월 (연도 넘김)
        assert_eq!(
            catalog.get(Tenor::FirstMonthNextQuarter),
            Some(date(2025, 1, 31))
        );
        assert_eq!(catalog.get(Tenor::Quarter1), Some(date(2025, 3, 28)));
        assert_eq!(catalog.get(Tenor::Quarter2), Some(date(2025, 6, 27)));
        assert_eq!(catalog.get(Tenor::Quarter3), Some(date(2025, 9, 26)));
        // perpetual은 만기가 없음
        assert_eq!(catalog.get(Tenor::Perpetual), None);
    }

    #[test]
    fn test_initial_expirations_reference_on_friday() {
        // 기준일이 금요일이면 current_week는 기준일 그 자체
        let catalog = initial_expirations(date(2024, 11, 8));
        assert_eq!(catalog.get(Tenor::CurrentWeek), Some(date(2024, 11, 8)));
        assert_eq!(catalog.get(Tenor::NextWeek), Some(date(2024, 11, 15)));
    }

    #[test]
    fn test_roll_forward_week() {
        let catalog = initial_expirations(date(2024, 11, 4));
        let rolled = roll_forward(&catalog, date(2024, 11, 10));
        assert_eq!(rolled.get(Tenor::CurrentWeek), Some(date(2024, 11, 15)));
        // 만기가 지나지 않은 구분은 그대로
        assert_eq!(rolled.get(Tenor::CurrentMonth), Some(date(2024, 11, 29)));
    }

    #[test]
    fn test_roll_forward_month_year_wrap() {
        // 12월 만기가 지나면 이듬해 1월 마지막 금요일로
        let catalog = initial_expirations(date(2024, 12, 2));
        assert_eq!(catalog.get(Tenor::CurrentMonth), Some(date(2024, 12, 27)));

        let rolled = roll_forward(&catalog, date(2024, 12, 27));
        assert_eq!(rolled.get(Tenor::CurrentMonth), Some(date(2025, 1, 31)));
    }

    #[test]
    fn test_roll_forward_quarter_year_wrap() {
        // Q4 만기(12월 말)가 지나면 이듬해 Q1 말월(3월)로
        let catalog = initial_expirations(date(2024, 12, 2));
        assert_eq!(catalog.get(Tenor::CurrentQuarter), Some(date(2024, 12, 27)));

        let rolled = roll_forward(&catalog, date(2024, 12, 28));
        assert_eq!(rolled.get(Tenor::CurrentQuarter), Some(date(2025, 3, 28)));
    }

    #[test]
    fn test_roll_forward_leaves_far_tenors_unchanged() {
        // quarter_1..3과 first_month_next_quarter는 만기가 지나도
        // 이 패스에서는 롤오버하지 않음
        let catalog = initial_expirations(date(2024, 11, 4));
        let rolled = roll_forward(&catalog, date(2025, 4, 1));
        assert_eq!(rolled.get(Tenor::Quarter1), Some(date(2025, 3, 28)));
        assert_eq!(
            rolled.get(Tenor::FirstMonthNextQuarter),
            Some(date(2025, 1, 31))
        );
    }

    #[test]
    fn test_roll_forward_expiry_on_current_date() {
        // 만기일 == 현재일이면 롤오버 대상
        let catalog = initial_expirations(date(2024, 11, 4));
        let rolled = roll_forward(&catalog, date(2024, 11, 8));
        assert_eq!(rolled.get(Tenor::CurrentWeek), Some(date(2024, 11, 15)));
    }

    #[test]
    fn test_instrument_name() {
        let catalog = initial_expirations(date(2024, 11, 4));
        assert_eq!(
            catalog.instrument_name("BTC", Tenor::CurrentMonth),
            Some("BTC-29NOV24".to_string())
        );
        assert_eq!(
            catalog.instrument_name("ETH", Tenor::Perpetual),
            Some("ETH-PERPETUAL".to_string())
        );
    }

    #[test]
    fn test_format_expiry_code_no_leading_zero() {
        assert_eq!(format_expiry_code(date(2024, 11, 5)), "5NOV24");
        assert_eq!(format_expiry_code(date(2024, 11, 29)), "29NOV24");
        assert_eq!(format_expiry_code(date(2025, 1, 31)), "31JAN25");
    }

    #[test]
    fn test_tenor_round_trip() {
        for tenor in Tenor::ALL {
            assert_eq!(tenor.as_str().parse::<Tenor>().unwrap(), tenor);
        }
    }
}
