use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    /// Saturday and Sunday are weekend days; everything else counts as a weekday.
    pub fn is_weekday(&self) -> bool {
        !matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_on(date: NaiveDate) -> DailyBar {
        DailyBar {
            date,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 0,
        }
    }

    #[test]
    fn test_weekday_detection() {
        // 2023-01-06 is a Friday
        let friday = NaiveDate::from_ymd_opt(2023, 1, 6).unwrap();
        assert!(bar_on(friday).is_weekday());
        assert!(!bar_on(friday.succ_opt().unwrap()).is_weekday());
        assert!(!bar_on(NaiveDate::from_ymd_opt(2023, 1, 8).unwrap()).is_weekday());
        assert!(bar_on(NaiveDate::from_ymd_opt(2023, 1, 9).unwrap()).is_weekday());
    }
}
