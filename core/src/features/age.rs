use crate::batch::TransactionBatch;
use chrono::{Datelike, NaiveDate};

/// Full years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Derives `client_age` from `birth_date` as of a fixed reference date.
pub struct ClientAgeDetector {
    today: NaiveDate,
}

impl ClientAgeDetector {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn ages(&self, batch: &TransactionBatch) -> Vec<i32> {
        batch
            .rows()
            .iter()
            .map(|row| age_on(row.birth_date, self.today))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
    }

    #[test]
    fn birthday_not_yet_reached_subtracts_one() {
        assert_eq!(age_on(date(1960, 10, 20), date(2025, 10, 19)), 64);
        assert_eq!(age_on(date(1960, 10, 19), date(2025, 10, 19)), 65);
        assert_eq!(age_on(date(1960, 3, 1), date(2025, 10, 19)), 65);
    }

    #[test]
    fn leap_day_birthday_counts_from_march_first() {
        assert_eq!(age_on(date(2000, 2, 29), date(2025, 2, 28)), 24);
        assert_eq!(age_on(date(2000, 2, 29), date(2025, 3, 1)), 25);
    }
}
