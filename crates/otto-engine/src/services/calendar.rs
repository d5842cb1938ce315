//! Calendar lookups and insight payloads.
//!
//! Events created through the action pipeline are persisted; the insight
//! and scheduling helpers return illustrative data in place of a real
//! provider integration.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use otto_core::{CalendarEvent, EventFilter, EventStore, OttoResult};
use otto_storage::SqliteStore;

use crate::actions::{parse_iso_datetime, EventDraft};

pub struct CalendarService {
    store: Arc<SqliteStore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FreeSlot {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub slot_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingTimeSuggestion {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub confidence: f64,
    pub reason: &'static str,
    pub day_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarInsights {
    pub total_events_this_week: usize,
    pub average_meeting_duration_minutes: u32,
    pub busiest_day: &'static str,
    pub free_hours_today: f64,
    pub insights: Vec<String>,
    pub suggestions: Vec<String>,
}

impl CalendarService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Persist an event from AI-extracted fields. Missing times default to
    /// a one-hour slot starting an hour from now.
    pub async fn create_from_draft(&self, draft: &EventDraft) -> OttoResult<CalendarEvent> {
        let start_at = draft
            .start_time
            .as_deref()
            .and_then(parse_iso_datetime)
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));
        let end_at = draft
            .end_time
            .as_deref()
            .and_then(parse_iso_datetime)
            .unwrap_or_else(|| start_at + Duration::hours(1));

        let title = draft
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "AI Generated Event".to_string());

        let mut event = CalendarEvent::new(title, start_at, end_at)
            .with_attendees(draft.attendees.clone());
        if let Some(ref description) = draft.description {
            event = event.with_description(description.clone());
        }
        if let Some(ref location) = draft.location {
            event = event.with_location(location.clone());
        }

        self.store.insert_event(&event).await?;
        Ok(event)
    }

    /// Events starting within the next `days_ahead` days.
    pub async fn upcoming(&self, days_ahead: i64, limit: usize) -> OttoResult<Vec<CalendarEvent>> {
        let now = Utc::now();
        let filter = EventFilter {
            start_after: Some(now),
            end_before: Some(now + Duration::days(days_ahead)),
        };
        self.store.list_events(&filter, limit, 0).await
    }

    /// Synthesized morning/afternoon availability. A real implementation
    /// would subtract booked events; this mirrors the demo behavior.
    pub fn free_slots(&self, duration_minutes: u32, days_ahead: i64) -> Vec<FreeSlot> {
        let now = Utc::now();
        let mut slots = Vec::new();

        for day in 1..=days_ahead.max(1) {
            let date = (now + Duration::days(day)).date_naive();

            for (hour, slot_type) in [(9, "morning"), (14, "afternoon")] {
                let Some(start) = date.and_hms_opt(hour, 0, 0) else {
                    continue;
                };
                let start = DateTime::<Utc>::from_naive_utc_and_offset(start, Utc);
                slots.push(FreeSlot {
                    start_at: start,
                    end_at: start + Duration::minutes(duration_minutes as i64),
                    duration_minutes,
                    slot_type,
                });
            }
        }

        slots.truncate(10);
        slots
    }

    /// Candidate meeting times over the next three days.
    pub fn suggest_meeting_times(&self, duration_minutes: u32) -> Vec<MeetingTimeSuggestion> {
        let now = Utc::now();
        let mut suggestions = Vec::new();

        for day in 1..=3 {
            let date = (now + Duration::days(day)).date_naive();

            let options = [
                (10, 0.9, "All attendees appear to be free"),
                (15, 0.8, "Good time for most attendees"),
            ];
            for (hour, confidence, reason) in options {
                let Some(start) = date.and_hms_opt(hour, 0, 0) else {
                    continue;
                };
                let start = DateTime::<Utc>::from_naive_utc_and_offset(start, Utc);
                suggestions.push(MeetingTimeSuggestion {
                    start_at: start,
                    end_at: start + Duration::minutes(duration_minutes as i64),
                    confidence,
                    reason,
                    day_name: start.format("%A").to_string(),
                });
            }
        }

        suggestions
    }

    /// Fixed illustrative calendar metrics.
    pub fn insights(&self) -> CalendarInsights {
        CalendarInsights {
            total_events_this_week: 5,
            average_meeting_duration_minutes: 45,
            busiest_day: "Wednesday",
            free_hours_today: 4.5,
            insights: vec![
                "You have a busy week with 5 meetings scheduled".into(),
                "Consider blocking time for focused work between meetings".into(),
                "Wednesday is your busiest day - try to avoid scheduling more meetings".into(),
            ],
            suggestions: vec![
                "Block 2-hour focus time slots in your calendar".into(),
                "Schedule buffer time between back-to-back meetings".into(),
                "Consider moving some meetings to less busy days".into(),
            ],
        }
    }
}
