use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::dates::{in_year, next_anniversary};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "New Year")]
    pub name: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub is_recurring: bool,
}

impl Holiday {
    /// Recurring holidays fall on the same month/day every year; Feb 29 is
    /// observed on Feb 28 in common years.
    pub fn falls_on(&self, day: NaiveDate) -> bool {
        if self.is_recurring {
            in_year(self.date, day.year()) == day
        } else {
            self.date == day
        }
    }

    /// The first date on or after `from` this holiday is observed.
    pub fn next_occurrence(&self, from: NaiveDate) -> Option<NaiveDate> {
        if self.is_recurring {
            Some(next_anniversary(self.date, from))
        } else if self.date >= from {
            Some(self.date)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holiday(date: &str, is_recurring: bool) -> Holiday {
        Holiday {
            id: 1,
            name: "Founders Day".into(),
            date: date.parse().unwrap(),
            is_recurring,
        }
    }

    #[test]
    fn recurring_holiday_matches_other_years() {
        let h = holiday("2020-12-25", true);
        assert!(h.falls_on("2024-12-25".parse().unwrap()));
        assert!(!h.falls_on("2024-12-24".parse().unwrap()));
    }

    #[test]
    fn leap_day_holiday_is_observed_on_feb_28_in_common_years() {
        let h = holiday("2020-02-29", true);
        assert!(h.falls_on("2024-02-29".parse().unwrap()));
        assert!(!h.falls_on("2024-02-28".parse().unwrap()));
        assert!(h.falls_on("2025-02-28".parse().unwrap()));
        assert!(!h.falls_on("2025-03-01".parse().unwrap()));
        assert_eq!(
            h.next_occurrence("2025-01-10".parse().unwrap()),
            Some("2025-02-28".parse().unwrap())
        );
    }

    #[test]
    fn one_off_holiday_matches_exact_date_only() {
        let h = holiday("2024-06-17", false);
        assert!(h.falls_on("2024-06-17".parse().unwrap()));
        assert!(!h.falls_on("2025-06-17".parse().unwrap()));
    }

    #[test]
    fn next_occurrence_rolls_recurring_forward() {
        let h = holiday("2020-01-01", true);
        assert_eq!(
            h.next_occurrence("2024-06-10".parse().unwrap()),
            Some("2025-01-01".parse().unwrap())
        );
        let past = holiday("2024-01-01", false);
        assert_eq!(past.next_occurrence("2024-06-10".parse().unwrap()), None);
    }
}
