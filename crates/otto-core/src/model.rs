use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_at: Option<DateTime<Utc>>,
    pub reminder_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub ai_suggested: bool,
    pub estimated_minutes: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Todo,
            due_at: None,
            reminder_at: None,
            tags: Vec::new(),
            category: None,
            ai_suggested: false,
            estimated_minutes: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn suggested_by_ai(mut self) -> Self {
        self.ai_suggested = true;
        self
    }

    /// Merge a partial update into the task. Fields left unset in the
    /// update keep their current value. Keeps `completed_at` consistent
    /// with `status`: set when the task transitions to completed, cleared
    /// when it moves to any other status.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_at) = update.due_at {
            self.due_at = Some(due_at);
        }
        if let Some(reminder_at) = update.reminder_at {
            self.reminder_at = Some(reminder_at);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(estimated_minutes) = update.estimated_minutes {
            self.estimated_minutes = Some(estimated_minutes);
        }
        if let Some(status) = update.status {
            if status == TaskStatus::Completed && self.completed_at.is_none() {
                self.completed_at = Some(Utc::now());
            } else if status != TaskStatus::Completed {
                self.completed_at = None;
            }
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update payload for a task. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_at: Option<DateTime<Utc>>,
    pub reminder_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub estimated_minutes: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("unknown task priority: {s}")),
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Todo | Self::InProgress)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("unknown task status: {s}")),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Calendar Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn new(
        title: impl Into<String>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: None,
            start_at,
            end_at,
            location: None,
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_attendees(mut self, attendees: Vec<String>) -> Self {
        self.attendees = attendees;
        self
    }

    pub fn apply(&mut self, update: EventUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(start_at) = update.start_at {
            self.start_at = start_at;
        }
        if let Some(end_at) = update.end_at {
            self.end_at = end_at;
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        if let Some(attendees) = update.attendees {
            self.attendees = attendees;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
}

/// Filters for listing calendar events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub start_after: Option<DateTime<Utc>>,
    pub end_before: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Email Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: Uuid,
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub is_read: bool,
    pub is_important: bool,
    pub received_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl EmailMessage {
    pub fn new(
        subject: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        body: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            subject: subject.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            body: body.into(),
            is_read: false,
            is_important: false,
            received_at,
            created_at: Utc::now(),
        }
    }

    pub fn important(mut self) -> Self {
        self.is_important = true;
        self
    }

    pub fn read(mut self) -> Self {
        self.is_read = true;
        self
    }

    pub fn apply(&mut self, update: EmailUpdate) {
        if let Some(subject) = update.subject {
            self.subject = subject;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(is_read) = update.is_read {
            self.is_read = is_read;
        }
        if let Some(is_important) = update.is_important {
            self.is_important = is_important;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailUpdate {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub is_read: Option<bool>,
    pub is_important: Option<bool>,
}

/// Filters for listing email messages.
#[derive(Debug, Clone, Default)]
pub struct EmailFilter {
    pub is_read: Option<bool>,
    pub is_important: Option<bool>,
}

// ---------------------------------------------------------------------------
// Chat Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub session_id: Option<String>,
    /// Arbitrary JSON attached to the message — assistant replies carry
    /// their suggestions and actions here.
    pub metadata: Option<serde_json::Value>,
    pub model_used: Option<String>,
    pub processing_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            session_id: None,
            metadata: None,
            model_used: None,
            processing_ms: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_used = Some(model.into());
        self
    }

    pub fn with_processing_ms(mut self, ms: u64) -> Self {
        self.processing_ms = Some(ms);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(format!("unknown message role: {s}")),
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub action_type: SuggestionKind,
    pub action_data: Option<serde_json::Value>,
    pub priority: TaskPriority,
    pub is_dismissed: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    pub fn new(title: impl Into<String>, action_type: SuggestionKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: None,
            action_type,
            action_data: None,
            priority: TaskPriority::Medium,
            is_dismissed: false,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_action_data(mut self, data: serde_json::Value) -> Self {
        self.action_data = Some(data);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Task,
    Event,
    Email,
    General,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Event => "event",
            Self::Email => "email",
            Self::General => "general",
        }
    }
}

impl std::str::FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            "event" => Ok(Self::Event),
            "email" => Ok(Self::Email),
            "general" => Ok(Self::General),
            _ => Err(format!("unknown suggestion kind: {s}")),
        }
    }
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub status: NotificationStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            title: title.into(),
            message: message.into(),
            status: NotificationStatus::Pending,
            scheduled_for: None,
            created_at: Utc::now(),
            sent_at: None,
            read_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskReminder,
    EventReminder,
    EmailSummary,
    AiSuggestion,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskReminder => "task_reminder",
            Self::EventReminder => "event_reminder",
            Self::EmailSummary => "email_summary",
            Self::AiSuggestion => "ai_suggestion",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_reminder" => Ok(Self::TaskReminder),
            "event_reminder" => Ok(Self::EventReminder),
            "email_summary" => Ok(Self::EmailSummary),
            "ai_suggestion" => Ok(Self::AiSuggestion),
            "system" => Ok(Self::System),
            _ => Err(format!("unknown notification kind: {s}")),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Read,
    Dismissed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Read => "read",
            Self::Dismissed => "dismissed",
        }
    }
}

impl Default for NotificationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "read" => Ok(Self::Read),
            "dismissed" => Ok(Self::Dismissed),
            _ => Err(format!("unknown notification status: {s}")),
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Push Subscription
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: Uuid,
    pub endpoint: String,
    /// Raw key material from the subscribing client, stored as JSON text.
    pub keys: String,
    pub created_at: DateTime<Utc>,
}

impl PushSubscription {
    pub fn new(endpoint: impl Into<String>, keys: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            endpoint: endpoint.into(),
            keys: keys.into(),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// User & Google Token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub theme: String,
    pub notifications_enabled: bool,
    pub preferences: serde_json::Value,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            full_name: None,
            is_active: true,
            theme: "light".into(),
            notifications_enabled: true,
            preferences: serde_json::json!({}),
            google_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub calendar_enabled: bool,
    pub gmail_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GoogleToken {
    pub fn new(user_id: Uuid, access_token: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            access_token: access_token.into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_at: None,
            scope: None,
            calendar_enabled: false,
            gmail_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_priority_round_trips() {
        for p in [
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Urgent,
        ] {
            assert_eq!(p.to_string().parse::<TaskPriority>(), Ok(p));
        }
        assert!("critical".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn task_apply_sets_completed_at_on_completion() {
        let mut task = Task::new("write report");
        assert!(task.completed_at.is_none());

        task.apply(TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        });
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed_at.is_some());

        // Moving away from completed clears the timestamp again.
        task.apply(TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        });
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn task_apply_leaves_unset_fields_alone() {
        let mut task = Task::new("triage inbox")
            .with_description("go through unread mail")
            .with_priority(TaskPriority::High);

        task.apply(TaskUpdate {
            title: Some("triage inbox daily".into()),
            ..Default::default()
        });

        assert_eq!(task.title, "triage inbox daily");
        assert_eq!(task.description.as_deref(), Some("go through unread mail"));
        assert_eq!(task.priority, TaskPriority::High);
    }

    #[test]
    fn message_role_parses() {
        assert!(matches!("assistant".parse::<MessageRole>(), Ok(MessageRole::Assistant)));
        assert!("bot".parse::<MessageRole>().is_err());
    }

    #[test]
    fn suggestion_kind_serializes_snake_case() {
        let s = Suggestion::new("Review quarterly reports", SuggestionKind::Task);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["action_type"], "task");
        assert_eq!(json["is_dismissed"], false);
    }
}
