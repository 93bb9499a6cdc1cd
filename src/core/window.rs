use crate::domain::model::DetectionPeriod;
use chrono::{Days, NaiveDate};

/// Inclusive window of complete days: `lookback_days` baseline days followed
/// by yesterday as the evaluated day. Today's billing data is still partial.
pub fn evaluation_window(today: NaiveDate, lookback_days: u32) -> DetectionPeriod {
    let start = today
        .checked_sub_days(Days::new(u64::from(lookback_days) + 1))
        .unwrap_or(NaiveDate::MIN);
    let end = today.pred_opt().unwrap_or(NaiveDate::MIN);
    DetectionPeriod { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_lookback_window() {
        let period = evaluation_window(date(2026, 10, 17), 7);
        assert_eq!(period.start, date(2026, 10, 9));
        assert_eq!(period.end, date(2026, 10, 16));
    }

    #[test]
    fn test_window_holds_lookback_plus_current_day() {
        for lookback in [1u32, 7, 30] {
            let period = evaluation_window(date(2026, 10, 17), lookback);
            let days = (period.end - period.start).num_days() + 1;
            assert_eq!(days, i64::from(lookback) + 1);
        }
    }

    #[test]
    fn test_window_crosses_year_boundary() {
        let period = evaluation_window(date(2027, 1, 2), 3);
        assert_eq!(period.start, date(2026, 12, 29));
        assert_eq!(period.end, date(2027, 1, 1));
    }
}
