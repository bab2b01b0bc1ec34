use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};

use crate::models::ProjectFinancials;

/// A calendar month, stored as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid month `{0}`, expected YYYY-MM")]
pub struct InvalidMonth(String);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The following month, unless that would be after `limit`
    pub fn next_until(&self, limit: Month) -> Option<Self> {
        let next = self.next();
        (next <= limit).then_some(next)
    }

    /// e.g. "March 2025"
    pub fn display(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or_else(|| InvalidMonth(s.to_string()))?;
        let year = year.parse::<i32>().map_err(|_| InvalidMonth(s.to_string()))?;
        let month = month.parse::<u32>().map_err(|_| InvalidMonth(s.to_string()))?;
        Month::new(year, month).ok_or_else(|| InvalidMonth(s.to_string()))
    }
}

/// All-time totals over every recorded month of a project
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthSummary {
    pub income: f64,
    pub expenses: f64,
}

impl MonthSummary {
    pub fn of(months: &[ProjectFinancials]) -> Self {
        months.iter().fold(Self::default(), |acc, m| Self {
            income: acc.income + m.income,
            expenses: acc.expenses + m.expenses,
        })
    }

    pub fn profit(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Form input to amount; blank or garbage counts as zero
pub fn parse_amount(input: &str) -> f64 {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn normalize_notes(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(month: &str, income: f64, expenses: f64) -> ProjectFinancials {
        ProjectFinancials {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            month: month.to_string(),
            income,
            expenses,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn month_parses_and_formats() {
        let m: Month = "2025-03".parse().unwrap();
        assert_eq!(m.to_string(), "2025-03");
        assert_eq!(m.display(), "March 2025");
        assert!("2025-13".parse::<Month>().is_err());
        assert!("march".parse::<Month>().is_err());
    }

    #[test]
    fn month_navigation_wraps_years() {
        let jan = Month::new(2025, 1).unwrap();
        assert_eq!(jan.previous(), Month::new(2024, 12).unwrap());
        assert_eq!(Month::new(2024, 12).unwrap().next(), jan);
    }

    #[test]
    fn next_is_refused_past_the_limit() {
        let limit = Month::new(2025, 6).unwrap();
        assert_eq!(Month::new(2025, 5).unwrap().next_until(limit), Some(limit));
        assert_eq!(limit.next_until(limit), None);
    }

    #[test]
    fn summary_totals_all_months() {
        let months = vec![row("2025-02", 1000.0, 250.5), row("2025-01", 500.0, 800.0)];
        let summary = MonthSummary::of(&months);
        assert_eq!(summary.income, 1500.0);
        assert_eq!(summary.expenses, 1050.5);
        assert_eq!(summary.profit(), 449.5);
        assert_eq!(months[1].profit(), -300.0);
    }

    #[test]
    fn amounts_and_notes_from_form_input() {
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(normalize_notes("   "), None);
        assert_eq!(normalize_notes(" paid "), Some("paid".to_string()));
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(12.0), "$12.00");
        assert_eq!(format_money(-3.456), "-$3.46");
    }
}
