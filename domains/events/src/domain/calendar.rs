//! Calendar grid builder
//!
//! A calendar page is six rows of seven days. The first row starts on the
//! configured week start day on or before the 1st of the month, so every
//! page covers 42 consecutive dates with the whole month visible.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use pitwall_common::{Error, Result};

use super::scope::DateRange;

pub const WEEKS_PER_PAGE: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;
pub const DAYS_PER_PAGE: usize = WEEKS_PER_PAGE * DAYS_PER_WEEK;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Years the calendar and date ranges accept
pub(crate) fn check_year(year: i32) -> Result<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
        )))
    }
}

/// A month of a year, built from a zero-based month index
///
/// The index may run past either end of the year the way a pager produces
/// it: 12 is January of the following year, -1 is December of the previous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth {
    year: i32,
    /// Zero-based, always in 0..12
    month0: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month_index: i32) -> Result<Self> {
        let year = year
            .checked_add(month_index.div_euclid(12))
            .ok_or_else(|| Error::Validation(format!("Year out of range: {year}")))?;

        check_year(year)?;

        Ok(Self {
            year,
            month0: month_index.rem_euclid(12) as u32,
        })
    }

    /// Month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month index, 0 for January
    pub fn month_index(&self) -> u32 {
        self.month0
    }

    /// One-based month number, 1 for January
    pub fn month(&self) -> u32 {
        self.month0 + 1
    }

    pub fn first_day(&self) -> NaiveDate {
        // year is kept within 1..=9999 and month within 1..=12
        NaiveDate::from_ymd_opt(self.year, self.month(), 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn next(&self) -> Result<Self> {
        Self::new(self.year, self.month0 as i32 + 1)
    }

    pub fn prev(&self) -> Result<Self> {
        Self::new(self.year, self.month0 as i32 - 1)
    }

    /// Inclusive range over every day of the month
    pub fn range(&self) -> DateRange {
        DateRange::month(*self)
    }
}

/// A 6x7 grid of dates for one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarPage {
    month: CalendarMonth,
    week_start: Weekday,
    days: [NaiveDate; DAYS_PER_PAGE],
}

impl CalendarPage {
    pub fn new(month: CalendarMonth, week_start: Weekday) -> Self {
        let first = month.first_day();
        let offset = leading_days(first.weekday(), week_start);
        let grid_start = first
            .checked_sub_days(Days::new(offset as u64))
            .unwrap_or(first);

        let mut days = [grid_start; DAYS_PER_PAGE];
        let mut current = grid_start;
        for cell in days.iter_mut() {
            *cell = current;
            current = current.succ_opt().unwrap_or(current);
        }

        Self {
            month,
            week_start,
            days,
        }
    }

    pub fn month(&self) -> CalendarMonth {
        self.month
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// All 42 dates in row-major order
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Rows of seven dates, first row first
    pub fn rows(&self) -> impl Iterator<Item = &[NaiveDate]> + '_ {
        self.days.chunks(DAYS_PER_WEEK)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<NaiveDate> {
        if row >= WEEKS_PER_PAGE || col >= DAYS_PER_WEEK {
            return None;
        }
        Some(self.days[row * DAYS_PER_WEEK + col])
    }

    /// Number of cells before the 1st of the month
    pub fn offset(&self) -> usize {
        leading_days(self.month.first_day().weekday(), self.week_start) as usize
    }

    /// First visible date (top-left cell)
    pub fn first_day(&self) -> NaiveDate {
        self.days[0]
    }

    /// Last visible date (bottom-right cell)
    pub fn last_day(&self) -> NaiveDate {
        self.days[DAYS_PER_PAGE - 1]
    }

    /// Row and column of `date`, if it is on this page
    pub fn position_of(&self, date: NaiveDate) -> Option<(usize, usize)> {
        let index = usize::try_from((date - self.first_day()).num_days()).ok()?;
        (index < DAYS_PER_PAGE).then_some((index / DAYS_PER_WEEK, index % DAYS_PER_WEEK))
    }

    /// Whether `date` falls in the page's month rather than the padding
    pub fn in_month(&self, date: NaiveDate) -> bool {
        CalendarMonth::of(date) == self.month
    }

    /// Inclusive range over every visible date
    pub fn range(&self) -> DateRange {
        DateRange::between(self.first_day(), self.last_day())
    }
}

/// Weekday distance from `week_start` forward to `day`
fn leading_days(day: Weekday, week_start: Weekday) -> u32 {
    (day.num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7
}

/// Build the calendar page for a zero-based month index of `year`
pub fn build_page(month_index: i32, year: i32, week_start: Weekday) -> Result<CalendarPage> {
    let month = CalendarMonth::new(year, month_index)?;
    Ok(CalendarPage::new(month, week_start))
}
