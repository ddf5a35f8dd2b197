//! Role-scoped event visibility
//!
//! An [`EventScope`] is resolved once per request from the caller's roles and
//! combined with a [`DateRange`] into an [`EventFilter`]. Stores compile the
//! filter into a single query; [`EventFilter::matches`] is the same predicate
//! evaluated in memory.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use pitwall_auth::{Role, RoleSet};
use pitwall_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::{check_year, CalendarMonth};
use super::entities::{Event, EventTeam};

/// Inclusive range of calendar days, evaluated in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateRange {
    pub fn new(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        check_year(first.year())?;
        check_year(last.year())?;
        if first > last {
            return Err(Error::Validation(format!(
                "Range start {first} is after range end {last}"
            )));
        }
        Ok(Self { first, last })
    }

    /// Range over two dates in either order
    pub(crate) fn between(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            first: day,
            last: day,
        }
    }

    pub fn month(month: CalendarMonth) -> Self {
        Self {
            first: month.first_day(),
            last: month.last_day(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// Lower bound, inclusive: midnight at the start of the first day
    pub fn start(&self) -> DateTime<Utc> {
        self.first.and_time(NaiveTime::MIN).and_utc()
    }

    /// Upper bound, exclusive: midnight after the last day
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        self.last
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::MIN).and_utc())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at < self.end_exclusive()
    }
}

/// Which events a caller sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventScope {
    /// Events the driver is listed on
    Driving { driver_id: Uuid },
    /// Events the manager manages
    Managing { manager_id: Uuid },
    /// Events of a team
    ///
    /// An event belongs to the team when it has drivers and every one of them
    /// drives for the team. The event's own `team_id` plays no part. With a
    /// viewer, events the viewer manages or drives alone are left out; those
    /// show up in the viewer's own driving and managing views.
    Team {
        team_id: Uuid,
        viewer_id: Option<Uuid>,
    },
}

impl EventScope {
    pub fn matches(&self, event: &Event) -> bool {
        match *self {
            EventScope::Driving { driver_id } => event.has_driver(driver_id),
            EventScope::Managing { manager_id } => event.is_managed_by(manager_id),
            EventScope::Team { team_id, viewer_id } => {
                let belongs = !event.drivers.is_empty()
                    && event.drivers.iter().all(|d| d.team_id == Some(team_id));

                let own = viewer_id
                    .is_some_and(|v| event.is_managed_by(v) || event.is_solo_drive_of(v));

                belongs && !own
            }
        }
    }

    pub fn view(&self) -> EventView {
        match self {
            EventScope::Driving { .. } => EventView::Driving,
            EventScope::Managing { .. } => EventView::Managing,
            EventScope::Team { .. } => EventView::Team,
        }
    }
}

/// Named event views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventView {
    Driving,
    Managing,
    Team,
}

impl EventView {
    /// Default view for a role
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Driver => EventView::Driving,
            Role::Manager => EventView::Managing,
            Role::SocialMedia => EventView::Team,
        }
    }

    /// Default view for a role set, keyed on its primary role
    pub fn for_roles(roles: &RoleSet) -> Option<Self> {
        roles.primary().map(Self::for_role)
    }
}

/// How to find the caller's team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamLookup {
    /// Team the user drives for or manages, preferring the one they drive for
    DriverOrManager { user_id: Uuid },
    Driver { user_id: Uuid },
    Manager { user_id: Uuid },
    SocialMedia { user_id: Uuid },
}

impl TeamLookup {
    /// Lookup for a caller's roles; `None` when no role ties them to a team
    pub fn for_caller(user_id: Uuid, roles: &RoleSet) -> Option<Self> {
        if roles.has_all(&[Role::Driver, Role::Manager]) {
            Some(TeamLookup::DriverOrManager { user_id })
        } else if roles.has(Role::Driver) {
            Some(TeamLookup::Driver { user_id })
        } else if roles.has(Role::Manager) {
            Some(TeamLookup::Manager { user_id })
        } else if roles.has(Role::SocialMedia) {
            Some(TeamLookup::SocialMedia { user_id })
        } else {
            None
        }
    }

    pub fn user_id(&self) -> Uuid {
        match *self {
            TeamLookup::DriverOrManager { user_id }
            | TeamLookup::Driver { user_id }
            | TeamLookup::Manager { user_id }
            | TeamLookup::SocialMedia { user_id } => user_id,
        }
    }

    /// Rank of `team` for this lookup, lower wins; `None` if it does not match
    pub fn rank(&self, team: &EventTeam) -> Option<u8> {
        match *self {
            TeamLookup::DriverOrManager { user_id } => {
                if team.has_driver(user_id) {
                    Some(0)
                } else if team.manager_id == user_id {
                    Some(1)
                } else {
                    None
                }
            }
            TeamLookup::Driver { user_id } => team.has_driver(user_id).then_some(0),
            TeamLookup::Manager { user_id } => (team.manager_id == user_id).then_some(0),
            TeamLookup::SocialMedia { user_id } => {
                (team.social_media_id == Some(user_id)).then_some(0)
            }
        }
    }
}

/// Complete event predicate: scope, date range and optional result requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventFilter {
    scope: EventScope,
    range: DateRange,
    results_only: bool,
}

impl EventFilter {
    pub fn new(scope: EventScope, range: DateRange) -> Self {
        Self {
            scope,
            range,
            results_only: false,
        }
    }

    /// Keep only events with a recorded result
    pub fn with_results_only(mut self) -> Self {
        self.results_only = true;
        self
    }

    pub fn scope(&self) -> &EventScope {
        &self.scope
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn results_only(&self) -> bool {
        self.results_only
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.range.contains(event.date)
            && (!self.results_only || event.result.is_some())
            && self.scope.matches(event)
    }
}
