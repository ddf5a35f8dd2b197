//! Calendar page handler
//!
//! - GET /v1/calendar?month_index=&year= - 6x7 grid for a month

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc, Weekday};
use pitwall_common::Result;
use serde::Serialize;

use crate::api::middleware::EventsState;
use crate::api::query::RangeQuery;
use crate::domain::calendar::{CalendarMonth, CalendarPage};

/// One cell of the calendar grid
#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// False for the leading and trailing days of neighbouring months
    pub in_month: bool,
    pub today: bool,
}

/// Query values for a neighbouring month
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct MonthLink {
    pub year: i32,
    pub month_index: u32,
}

impl From<CalendarMonth> for MonthLink {
    fn from(month: CalendarMonth) -> Self {
        Self {
            year: month.year(),
            month_index: month.month_index(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    /// Zero-based, after normalising overflow
    pub month_index: u32,
    pub week_start: String,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub weeks: Vec<Vec<CalendarDay>>,
    /// `null` past the supported years
    pub previous: Option<MonthLink>,
    pub next: Option<MonthLink>,
}

impl CalendarResponse {
    fn new(page: &CalendarPage, today: NaiveDate) -> Self {
        let weeks = page
            .rows()
            .map(|row| {
                row.iter()
                    .map(|&date| CalendarDay {
                        date,
                        in_month: page.in_month(date),
                        today: date == today,
                    })
                    .collect()
            })
            .collect();

        Self {
            year: page.month().year(),
            month_index: page.month().month_index(),
            week_start: weekday_name(page.week_start()).to_string(),
            first_day: page.first_day(),
            last_day: page.last_day(),
            weeks,
            previous: page.month().prev().ok().map(MonthLink::from),
            next: page.month().next().ok().map(MonthLink::from),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// GET /v1/calendar - Calendar page for a month, current month by default
pub async fn get_calendar(
    State(state): State<EventsState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CalendarResponse>> {
    let today = Utc::now().date_naive();
    let month = query.month(today)?;
    let page = CalendarPage::new(month, state.week_start);

    Ok(Json(CalendarResponse::new(&page, today)))
}
