//! Event domain entities

use chrono::{DateTime, Utc};
use pitwall_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest event allowed, one week in minutes
pub const MAX_EVENT_DURATION_MINUTES: i32 = 7 * 24 * 60;

/// Kind of event on the calendar
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "event_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Sprint,
    Endurance,
    Championship,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Sprint => "sprint",
            EventType::Endurance => "endurance",
            EventType::Championship => "championship",
        }
    }
}

impl std::fmt::Display for EventType {
    #[mutants::skip] // Delegates to as_str(), covered by its tests
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventDriver {
    pub id: Uuid,
    pub name: Option<String>,
    pub team_id: Option<Uuid>,
}

/// Championship fields shown alongside an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionshipSummary {
    pub name: String,
    pub organizer: String,
}

/// Recorded outcome of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventResult {
    pub event_id: Uuid,
    /// Finishing position, 1 for a win
    pub position: i32,
    pub fastest_lap_ms: Option<i32>,
    pub notes: Option<String>,
    pub recorded_by: Uuid,
    pub recorded_at: DateTime<Utc>,
}

/// Event with its drivers, championship and result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub car: String,
    pub track: String,
    /// Minutes
    pub duration: i32,
    pub manager_id: Option<Uuid>,
    pub championship_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub drivers: Vec<EventDriver>,
    pub championship: Option<ChampionshipSummary>,
    pub result: Option<EventResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn has_driver(&self, user_id: Uuid) -> bool {
        self.drivers.iter().any(|d| d.id == user_id)
    }

    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.manager_id == Some(user_id)
    }

    /// Manager or driver of the event
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.is_managed_by(user_id) || self.has_driver(user_id)
    }

    /// Only listed driver is `user_id`
    pub fn is_solo_drive_of(&self, user_id: Uuid) -> bool {
        matches!(self.drivers.as_slice(), [only] if only.id == user_id)
    }

    pub fn driver_ids(&self) -> Vec<Uuid> {
        self.drivers.iter().map(|d| d.id).collect()
    }
}

/// Team as seen by the event domain, with its driver ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct EventTeam {
    pub id: Uuid,
    pub name: String,
    pub manager_id: Uuid,
    pub social_media_id: Option<Uuid>,
    pub driver_ids: Vec<Uuid>,
}

impl EventTeam {
    pub fn has_driver(&self, user_id: Uuid) -> bool {
        self.driver_ids.contains(&user_id)
    }
}

/// A championship series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Championship {
    pub id: Uuid,
    pub name: String,
    pub organizer: String,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Championship {
    pub fn summary(&self) -> ChampionshipSummary {
        ChampionshipSummary {
            name: self.name.clone(),
            organizer: self.organizer.clone(),
        }
    }
}

/// Data for a new event; drivers are already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: Option<String>,
    pub date: DateTime<Utc>,
    pub event_type: EventType,
    pub car: String,
    pub track: String,
    pub duration: i32,
    pub manager_id: Option<Uuid>,
    pub championship_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub driver_ids: Vec<Uuid>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        validate_details(&self.car, &self.track, self.duration)?;
        if self.driver_ids.is_empty() {
            return Err(Error::Validation(
                "An event needs at least one driver".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of an event
///
/// `None` leaves a field unchanged. `event_type` is always written; callers
/// that omit it get [`EventType::Sprint`]. A driver list replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub event_type: EventType,
    pub car: Option<String>,
    pub track: Option<String>,
    pub duration: Option<i32>,
    pub driver_ids: Option<Vec<Uuid>>,
}

impl EventPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(car) = &self.car {
            require_text("car", car)?;
        }
        if let Some(track) = &self.track {
            require_text("track", track)?;
        }
        if let Some(duration) = self.duration {
            validate_duration(duration)?;
        }
        if matches!(&self.driver_ids, Some(ids) if ids.is_empty()) {
            return Err(Error::Validation(
                "An event needs at least one driver".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply onto a stored event, used by the in-memory store
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = Some(title.clone());
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        event.event_type = self.event_type;
        if let Some(car) = &self.car {
            event.car = car.clone();
        }
        if let Some(track) = &self.track {
            event.track = track.clone();
        }
        if let Some(duration) = self.duration {
            event.duration = duration;
        }
        event.updated_at = Utc::now();
    }
}

/// Result to record against an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultInput {
    pub position: i32,
    pub fastest_lap_ms: Option<i32>,
    pub notes: Option<String>,
}

impl ResultInput {
    pub fn validate(&self) -> Result<()> {
        if self.position < 1 {
            return Err(Error::Validation(
                "Position must be at least 1".to_string(),
            ));
        }
        if matches!(self.fastest_lap_ms, Some(ms) if ms <= 0) {
            return Err(Error::Validation(
                "Fastest lap must be a positive number of milliseconds".to_string(),
            ));
        }
        Ok(())
    }
}

/// Data for a new championship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChampionship {
    pub name: String,
    pub organizer: String,
    pub manager_id: Option<Uuid>,
}

/// Ordering of the team results view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSort {
    #[default]
    Date,
    Position,
}

impl ResultSort {
    /// Sort events in place; events without a result go last when sorting by position
    pub fn apply(&self, events: &mut [Event]) {
        match self {
            ResultSort::Date => events.sort_by_key(|e| (e.date, e.id)),
            ResultSort::Position => events.sort_by_key(|e| {
                (
                    e.result.as_ref().map_or(i32::MAX, |r| r.position),
                    e.date,
                    e.id,
                )
            }),
        }
    }
}

fn validate_details(car: &str, track: &str, duration: i32) -> Result<()> {
    require_text("car", car)?;
    require_text("track", track)?;
    validate_duration(duration)
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn validate_duration(minutes: i32) -> Result<()> {
    if !(1..=MAX_EVENT_DURATION_MINUTES).contains(&minutes) {
        return Err(Error::Validation(format!(
            "Duration must be between 1 and {MAX_EVENT_DURATION_MINUTES} minutes"
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_event_type_defaults_to_sprint() {
        assert_eq!(EventType::default(), EventType::Sprint);
        let parsed: EventType = serde_json::from_str("\"endurance\"").unwrap();
        assert_eq!(parsed, EventType::Endurance);
    }

    #[test]
    fn test_event_type_names_match_database_enum() {
        assert_eq!(EventType::Sprint.as_str(), "sprint");
        assert_eq!(EventType::Endurance.as_str(), "endurance");
        assert_eq!(EventType::Championship.as_str(), "championship");
    }

    #[test]
    fn test_event_serializes_type_field() {
        let event = event(at(2024, 3, 15, 10), vec![]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "sprint");
        assert!(json.get("event_type").is_none());
    }

    #[test]
    fn test_participants() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let manager = Uuid::new_v4();

        let mut solo = event(at(2024, 3, 15, 10), vec![driver(a, None)]);
        solo.manager_id = Some(manager);

        assert!(solo.is_participant(a));
        assert!(solo.is_participant(manager));
        assert!(!solo.is_participant(b));
        assert!(solo.is_solo_drive_of(a));

        let pair = event(at(2024, 3, 15, 10), vec![driver(a, None), driver(b, None)]);
        assert!(!pair.is_solo_drive_of(a));
    }

    #[test]
    fn test_new_event_validation() {
        let driver = Uuid::new_v4();
        assert!(new_event(at(2024, 3, 15, 10), vec![driver]).validate().is_ok());

        let mut bad = new_event(at(2024, 3, 15, 10), vec![driver]);
        bad.duration = 0;
        assert!(matches!(bad.validate(), Err(Error::Validation(_))));

        let mut blank_track = new_event(at(2024, 3, 15, 10), vec![driver]);
        blank_track.track = "  ".to_string();
        assert!(blank_track.validate().is_err());

        assert!(new_event(at(2024, 3, 15, 10), vec![]).validate().is_err());
    }

    #[test]
    fn test_patch_resets_type_and_keeps_missing_fields() {
        let mut stored = event(at(2024, 3, 15, 10), vec![]);
        stored.event_type = EventType::Endurance;

        let patch = EventPatch {
            car: Some("BMW M4 GT3".to_string()),
            ..Default::default()
        };
        patch.apply(&mut stored);

        assert_eq!(stored.event_type, EventType::Sprint);
        assert_eq!(stored.car, "BMW M4 GT3");
        assert_eq!(stored.track, "Spa-Francorchamps");
        assert_eq!(stored.title.as_deref(), Some("Spa 6h"));
    }

    #[test]
    fn test_patch_rejects_empty_driver_list() {
        let patch = EventPatch {
            driver_ids: Some(vec![]),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_result_input_validation() {
        let ok = ResultInput {
            position: 1,
            fastest_lap_ms: Some(101_234),
            notes: None,
        };
        assert!(ok.validate().is_ok());

        let zero = ResultInput { position: 0, ..ok.clone() };
        assert!(zero.validate().is_err());

        let bad_lap = ResultInput {
            fastest_lap_ms: Some(0),
            ..ok
        };
        assert!(bad_lap.validate().is_err());
    }

    #[test]
    fn test_sort_by_position_puts_unranked_last() {
        let mut first = event(at(2024, 3, 20, 10), vec![]);
        first.result = Some(EventResult {
            event_id: first.id,
            position: 1,
            fastest_lap_ms: None,
            notes: None,
            recorded_by: Uuid::new_v4(),
            recorded_at: Utc::now(),
        });
        let unranked = event(at(2024, 3, 1, 10), vec![]);
        let mut third = event(at(2024, 3, 5, 10), vec![]);
        third.result = Some(EventResult {
            position: 3,
            ..first.result.clone().unwrap()
        });

        let mut events = vec![unranked.clone(), third.clone(), first.clone()];
        ResultSort::Position.apply(&mut events);
        assert_eq!(
            events.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![first.id, third.id, unranked.id]
        );

        ResultSort::Date.apply(&mut events);
        assert_eq!(
            events.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![unranked.id, third.id, first.id]
        );
    }
}
