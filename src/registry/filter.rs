//! Search filters and query-parameter construction.
//!
//! Everything here is a pure function of its inputs (including "now"), so
//! the query sent to the registry is fully determined by the filter.

use chrono::{Datelike, Months, NaiveDate};

/// Wire format for dates in registry queries.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    /// `[now - 7 days, now]`.
    pub fn last_week(now: NaiveDate) -> Self {
        Self {
            from: now - chrono::Duration::days(7),
            to: now,
        }
    }

    /// `[first day of now's month, now]`.
    pub fn current_month(now: NaiveDate) -> Self {
        Self {
            from: now.with_day(1).unwrap_or(now),
            to: now,
        }
    }

    /// `[now - 1 calendar month, now]`.
    ///
    /// Month subtraction clamps to the last valid day, so March 31 maps to
    /// the end of February.
    pub fn last_month(now: NaiveDate) -> Self {
        Self {
            from: now.checked_sub_months(Months::new(1)).unwrap_or(now),
            to: now,
        }
    }
}

/// Reporting period a digest covers. Drives both the date range and the
/// wording of the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    LastWeek,
    CurrentMonth,
    LastMonth,
    Custom(DateRange),
}

impl Period {
    pub fn range(&self, now: NaiveDate) -> DateRange {
        match self {
            Self::LastWeek => DateRange::last_week(now),
            Self::CurrentMonth => DateRange::current_month(now),
            Self::LastMonth => DateRange::last_month(now),
            Self::Custom(range) => *range,
        }
    }
}

/// Filter for one registry search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub keywords: Vec<String>,
    pub date_range: Option<DateRange>,
    /// Explicit publication year; the current year is sent when `None`.
    pub year: Option<i32>,
}

impl SearchFilter {
    pub fn last_week(now: NaiveDate) -> Self {
        Self::for_period(Period::LastWeek, now)
    }

    pub fn current_month(now: NaiveDate) -> Self {
        Self::for_period(Period::CurrentMonth, now)
    }

    pub fn last_month(now: NaiveDate) -> Self {
        Self::for_period(Period::LastMonth, now)
    }

    pub fn for_period(period: Period, now: NaiveDate) -> Self {
        Self {
            keywords: Vec::new(),
            date_range: Some(period.range(now)),
            year: Some(now.year()),
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| {
                let k: String = k.into();
                k.trim().to_string()
            })
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Query parameters for a search, in the order they are sent.
///
/// `keyword` is omitted entirely when there are no keywords; otherwise it is
/// the keywords joined with a bare comma.
pub fn query_params(
    filter: &SearchFilter,
    publisher: &str,
    today: NaiveDate,
) -> Vec<(&'static str, String)> {
    let mut params = vec![("publisher", publisher.to_string())];

    let year = filter.year.unwrap_or_else(|| today.year());
    params.push(("year", year.to_string()));

    if !filter.keywords.is_empty() {
        params.push(("keyword", filter.keywords.join(",")));
    }

    if let Some(range) = filter.date_range {
        params.push(("dateEffectFrom", range.from.format(DATE_FORMAT).to_string()));
        params.push(("dateEffectTo", range.to.format(DATE_FORMAT).to_string()));
    }

    params
}
