use async_trait::async_trait;
use uuid::Uuid;

use crate::error::OttoResult;
use crate::model::*;

/// Storage backend for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> OttoResult<()>;
    async fn get_task(&self, id: Uuid) -> OttoResult<Option<Task>>;
    async fn update_task(&self, task: &Task) -> OttoResult<()>;
    async fn delete_task(&self, id: Uuid) -> OttoResult<bool>;
    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<Task>>;
    /// Most recent non-completed tasks, used as chat context.
    async fn open_tasks(&self, limit: usize) -> OttoResult<Vec<Task>>;
}

/// Storage backend for calendar events.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: &CalendarEvent) -> OttoResult<()>;
    async fn get_event(&self, id: Uuid) -> OttoResult<Option<CalendarEvent>>;
    async fn update_event(&self, event: &CalendarEvent) -> OttoResult<()>;
    async fn delete_event(&self, id: Uuid) -> OttoResult<bool>;
    async fn list_events(
        &self,
        filter: &EventFilter,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<CalendarEvent>>;
}

/// Storage backend for email messages.
#[async_trait]
pub trait EmailStore: Send + Sync {
    async fn insert_email(&self, email: &EmailMessage) -> OttoResult<()>;
    async fn get_email(&self, id: Uuid) -> OttoResult<Option<EmailMessage>>;
    async fn update_email(&self, email: &EmailMessage) -> OttoResult<()>;
    async fn delete_email(&self, id: Uuid) -> OttoResult<bool>;
    async fn list_emails(
        &self,
        filter: &EmailFilter,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<EmailMessage>>;
}

/// Storage backend for chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: &ChatMessage) -> OttoResult<()>;
    /// Newest first; optionally scoped to a session.
    async fn list_messages(
        &self,
        session_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<ChatMessage>>;
    async fn count_messages(&self, session_id: Option<&str>) -> OttoResult<usize>;
    /// The most recent `limit` messages for a session, oldest first —
    /// conversational context for the assistant.
    async fn session_context(&self, session_id: &str, limit: usize)
        -> OttoResult<Vec<ChatMessage>>;
    /// Delete all messages in a session, returning how many were removed.
    async fn clear_session(&self, session_id: &str) -> OttoResult<usize>;
}

/// Storage backend for suggestions.
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    async fn insert_suggestion(&self, suggestion: &Suggestion) -> OttoResult<()>;
    async fn get_suggestion(&self, id: Uuid) -> OttoResult<Option<Suggestion>>;
    async fn list_suggestions(
        &self,
        kind: Option<SuggestionKind>,
        include_dismissed: bool,
        limit: usize,
    ) -> OttoResult<Vec<Suggestion>>;
    async fn dismiss_suggestion(&self, id: Uuid) -> OttoResult<bool>;
    async fn count_suggestions(&self, include_dismissed: bool) -> OttoResult<usize>;
}

/// Storage backend for notifications and push subscriptions.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> OttoResult<()>;
    async fn list_notifications(
        &self,
        status: Option<NotificationStatus>,
        limit: usize,
    ) -> OttoResult<Vec<Notification>>;
    async fn mark_notification_read(&self, id: Uuid) -> OttoResult<bool>;

    async fn insert_subscription(&self, subscription: &PushSubscription) -> OttoResult<()>;
    async fn list_subscriptions(&self) -> OttoResult<Vec<PushSubscription>>;
    async fn delete_subscription(&self, id: Uuid) -> OttoResult<bool>;
}

/// Storage backend for users and their linked Google credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the demo user by email, creating it on first run.
    async fn ensure_user(&self, email: &str, full_name: &str) -> OttoResult<User>;
    async fn get_user(&self, id: Uuid) -> OttoResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> OttoResult<Option<User>>;

    async fn upsert_google_token(&self, token: &GoogleToken) -> OttoResult<()>;
    async fn get_google_token(&self, user_id: Uuid) -> OttoResult<Option<GoogleToken>>;
}
