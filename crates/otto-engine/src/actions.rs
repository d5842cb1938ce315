//! Deferred assistant actions — structured instructions extracted from a
//! model reply and executed as side effects after the chat response has
//! been returned.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use otto_core::{
    Notification, NotificationKind, NotificationStatus, NotificationStore, OttoResult,
    TaskPriority,
};
use otto_storage::SqliteStore;

use crate::services::{CalendarService, EmailService, TaskService};

// ---------------------------------------------------------------------------
// Action payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AssistantAction {
    CreateTask(TaskDraft),
    CreateEvent(EventDraft),
    SendEmail(EmailDraft),
}

impl AssistantAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTask(_) => "create_task",
            Self::CreateEvent(_) => "create_event",
            Self::SendEmail(_) => "send_email",
        }
    }
}

/// Task fields as extracted by the model — loosely typed strings, parsed
/// into the real model at execution time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub estimated_duration: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailDraft {
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Parse model-supplied action objects, dropping anything malformed or of
/// an unknown type. A bad action must never poison the whole reply.
pub fn parse_actions(values: &[serde_json::Value]) -> Vec<AssistantAction> {
    values
        .iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(action) => Some(action),
            Err(e) => {
                warn!(error = %e, "ignoring unparseable assistant action");
                None
            }
        })
        .collect()
}

/// Map a free-text priority label onto the enum, defaulting to medium.
pub fn parse_priority_label(label: Option<&str>) -> TaskPriority {
    match label.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("low") => TaskPriority::Low,
        Some("high") => TaskPriority::High,
        Some("urgent") => TaskPriority::Urgent,
        _ => TaskPriority::Medium,
    }
}

/// Parse an ISO-ish datetime string as produced by the model. Accepts full
/// RFC 3339 (with `Z` or an offset) and bare `YYYY-MM-DD` dates, which are
/// pinned to midnight UTC.
pub fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc));
    }
    None
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Result of executing one action.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    pub created_id: Option<Uuid>,
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            created_id: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            created_id: None,
        }
    }

    pub fn with_created(mut self, id: Uuid) -> Self {
        self.created_id = Some(id);
        self
    }
}

/// Executes assistant actions against the auxiliary services.
pub struct ActionExecutor {
    store: Arc<SqliteStore>,
    tasks: Arc<TaskService>,
    calendar: Arc<CalendarService>,
    email: Arc<EmailService>,
}

impl ActionExecutor {
    pub fn new(
        store: Arc<SqliteStore>,
        tasks: Arc<TaskService>,
        calendar: Arc<CalendarService>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            store,
            tasks,
            calendar,
            email,
        }
    }

    /// Run a batch of deferred actions. Failures are logged and swallowed —
    /// the chat response has already gone out.
    pub async fn process(&self, actions: Vec<AssistantAction>) {
        for action in actions {
            let kind = action.kind();
            match self.execute(&action).await {
                Ok(result) if result.success => {
                    info!(action = kind, message = %result.message, "assistant action executed");
                    self.record_notification(&result).await;
                }
                Ok(result) => {
                    warn!(action = kind, message = %result.message, "assistant action not applied");
                }
                Err(e) => {
                    warn!(action = kind, error = %e, "assistant action failed");
                }
            }
        }
    }

    /// Surface a completed action in the notification feed. Best-effort.
    async fn record_notification(&self, result: &ExecutionResult) {
        let mut notification = Notification::new(
            NotificationKind::AiSuggestion,
            "Assistant action completed",
            result.message.clone(),
        );
        notification.status = NotificationStatus::Sent;
        notification.sent_at = Some(Utc::now());

        if let Err(e) = self.store.insert_notification(&notification).await {
            warn!(error = %e, "failed to record action notification");
        }
    }

    pub async fn execute(&self, action: &AssistantAction) -> OttoResult<ExecutionResult> {
        match action {
            AssistantAction::CreateTask(draft) => {
                if draft.title.trim().is_empty() {
                    return Ok(ExecutionResult::failure("task draft has no title"));
                }
                let task = self.tasks.create_from_draft(draft).await?;
                Ok(ExecutionResult::success(format!("Task created: {}", task.title))
                    .with_created(task.id))
            }
            AssistantAction::CreateEvent(draft) => {
                let event = self.calendar.create_from_draft(draft).await?;
                Ok(ExecutionResult::success(format!("Event created: {}", event.title))
                    .with_created(event.id))
            }
            AssistantAction::SendEmail(draft) => {
                if draft.to.trim().is_empty() {
                    return Ok(ExecutionResult::failure("email draft has no recipient"));
                }
                let email = self.email.send(draft).await?;
                Ok(ExecutionResult::success(format!("Email sent to {}", email.recipient))
                    .with_created(email.id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_actions_and_skips_unknown() {
        let values = vec![
            json!({
                "type": "create_task",
                "data": {
                    "title": "Review quarterly reports",
                    "priority": "high",
                    "due_date": "2024-01-01T10:00:00Z"
                }
            }),
            json!({"type": "launch_rocket", "data": {}}),
            json!({
                "type": "send_email",
                "data": {"to": "manager@company.com", "subject": "Update", "body": "Done."}
            }),
        ];

        let actions = parse_actions(&values);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind(), "create_task");
        assert_eq!(actions[1].kind(), "send_email");
    }

    #[test]
    fn priority_labels_default_to_medium() {
        assert_eq!(parse_priority_label(Some("urgent")), TaskPriority::Urgent);
        assert_eq!(parse_priority_label(Some("HIGH")), TaskPriority::High);
        assert_eq!(parse_priority_label(Some("whenever")), TaskPriority::Medium);
        assert_eq!(parse_priority_label(None), TaskPriority::Medium);
    }

    #[test]
    fn iso_datetimes_parse_with_z_and_date_only() {
        let dt = parse_iso_datetime("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T10:00:00+00:00");

        let dt = parse_iso_datetime("2024-03-15").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-15T00:00:00+00:00");

        assert!(parse_iso_datetime("next tuesday-ish").is_none());
    }

    #[test]
    fn action_serializes_with_type_tag() {
        let action = AssistantAction::CreateTask(TaskDraft {
            title: "Write report".into(),
            ..Default::default()
        });
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "create_task");
        assert_eq!(json["data"]["title"], "Write report");
    }

    fn executor() -> ActionExecutor {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let tasks = Arc::new(TaskService::new(Arc::clone(&store)));
        let calendar = Arc::new(CalendarService::new(Arc::clone(&store)));
        let email = Arc::new(EmailService::new(
            Arc::clone(&store),
            crate::config::SmtpConfig::default(),
        ));
        ActionExecutor::new(store, tasks, calendar, email)
    }

    #[tokio::test]
    async fn processing_a_create_task_action_records_a_notification() {
        let executor = executor();
        let action = AssistantAction::CreateTask(TaskDraft {
            title: "Review quarterly reports".into(),
            priority: Some("high".into()),
            ..Default::default()
        });

        executor.process(vec![action]).await;

        let notifications = executor
            .store
            .list_notifications(None, 10)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].status, NotificationStatus::Sent);
        assert!(notifications[0].message.contains("Review quarterly reports"));
    }

    #[tokio::test]
    async fn empty_drafts_are_rejected_without_side_effects() {
        let executor = executor();
        let result = executor
            .execute(&AssistantAction::CreateTask(TaskDraft::default()))
            .await
            .unwrap();
        assert!(!result.success);

        let result = executor
            .execute(&AssistantAction::SendEmail(EmailDraft::default()))
            .await
            .unwrap();
        assert!(!result.success);
    }
}
