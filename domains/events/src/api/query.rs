//! Query parameters shared by event endpoints

use chrono::{Datelike, NaiveDate};
use pitwall_common::{Error, Result};
use serde::Deserialize;

use crate::domain::calendar::CalendarMonth;
use crate::domain::entities::ResultSort;
use crate::domain::scope::DateRange;

/// Date window of an event query
///
/// Either an explicit `from`/`to` pair of days, or a zero-based `month_index`
/// and `year` defaulting to the current month. The month index may overflow
/// the year the way the calendar pager produces it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub month_index: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    pub fn month(&self, today: NaiveDate) -> Result<CalendarMonth> {
        CalendarMonth::new(
            self.year.unwrap_or(today.year()),
            self.month_index.unwrap_or(today.month0() as i32),
        )
    }

    pub fn range(&self, today: NaiveDate) -> Result<DateRange> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => DateRange::new(from, to),
            (None, None) => Ok(DateRange::month(self.month(today)?)),
            _ => Err(Error::Validation(
                "Both from and to are required for a custom range".to_string(),
            )),
        }
    }
}

/// Parameters of the team results view
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamResultsQuery {
    #[serde(default)]
    pub month_index: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub sort: ResultSort,
}

impl TeamResultsQuery {
    pub fn range(&self, today: NaiveDate) -> Result<DateRange> {
        RangeQuery {
            month_index: self.month_index,
            year: self.year,
            from: self.from,
            to: self.to,
        }
        .range(today)
    }
}
