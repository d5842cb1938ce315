//! Demo data seeding for first runs and local development.

use chrono::{Duration, Utc};
use tracing::info;

use otto_core::{
    CalendarEvent, EmailMessage, EmailStore, EventFilter, EventStore, OttoResult, Suggestion,
    SuggestionKind, SuggestionStore, Task, TaskFilter, TaskPriority, TaskStatus, TaskStore,
    TaskUpdate,
};
use otto_storage::SqliteStore;

/// Populate an empty database with sample tasks, events, emails, and
/// suggestions. Tables that already hold data are left untouched.
pub async fn seed_demo_data(store: &SqliteStore) -> OttoResult<()> {
    let mut seeded = Vec::new();

    if store
        .list_tasks(&TaskFilter::default(), 1, 0)
        .await?
        .is_empty()
    {
        for task in demo_tasks() {
            store.insert_task(&task).await?;
        }
        seeded.push("tasks");
    }

    if store
        .list_events(&EventFilter::default(), 1, 0)
        .await?
        .is_empty()
    {
        for event in demo_events() {
            store.insert_event(&event).await?;
        }
        seeded.push("events");
    }

    if store
        .list_emails(&Default::default(), 1, 0)
        .await?
        .is_empty()
    {
        for email in demo_emails() {
            store.insert_email(&email).await?;
        }
        seeded.push("emails");
    }

    if store.count_suggestions(true).await? == 0 {
        for suggestion in demo_suggestions() {
            store.insert_suggestion(&suggestion).await?;
        }
        seeded.push("suggestions");
    }

    if seeded.is_empty() {
        info!("database already has data, skipping demo seed");
    } else {
        info!(tables = ?seeded, "database seeded with demo data");
    }

    Ok(())
}

fn demo_tasks() -> Vec<Task> {
    let now = Utc::now();

    let mut scheduled = Task::new("Schedule team meeting")
        .with_description("Organize the weekly team sync for next Monday")
        .with_due_at(now + Duration::days(3));
    scheduled.apply(TaskUpdate {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    });

    vec![
        Task::new("Complete project proposal")
            .with_description("Write and submit the Q1 project proposal for the new AI features")
            .with_priority(TaskPriority::High)
            .with_due_at(now + Duration::days(2)),
        Task::new("Review code changes")
            .with_description("Review the pull request for the authentication system updates")
            .with_due_at(now + Duration::days(1)),
        scheduled,
        Task::new("Update documentation")
            .with_description("Update the API documentation with the latest endpoint changes")
            .with_priority(TaskPriority::Low)
            .with_due_at(now + Duration::days(5)),
        Task::new("Backup database")
            .with_description("Create a backup of the production database")
            .with_priority(TaskPriority::High)
            .with_due_at(now + Duration::hours(6)),
    ]
}

fn demo_events() -> Vec<CalendarEvent> {
    let now = Utc::now();

    vec![
        CalendarEvent::new(
            "Team Standup",
            now + Duration::hours(2),
            now + Duration::hours(2) + Duration::minutes(30),
        )
        .with_description("Daily team standup meeting")
        .with_location("Conference Room A"),
        CalendarEvent::new(
            "Client Presentation",
            now + Duration::days(1) + Duration::hours(10),
            now + Duration::days(1) + Duration::hours(11),
        )
        .with_description("Present the Q4 roadmap to the client")
        .with_location("Main Conference Room")
        .with_attendees(vec![
            "john@company.com".into(),
            "sarah@company.com".into(),
            "client@example.com".into(),
        ]),
        CalendarEvent::new(
            "Code Review Session",
            now + Duration::days(2) + Duration::hours(14),
            now + Duration::days(2) + Duration::hours(15) + Duration::minutes(30),
        )
        .with_description("Review the new authentication system implementation")
        .with_location("Development Lab"),
        CalendarEvent::new(
            "One-on-One with Manager",
            now + Duration::days(3) + Duration::hours(15),
            now + Duration::days(3) + Duration::hours(15) + Duration::minutes(45),
        )
        .with_description("Weekly check-in with direct manager")
        .with_location("Manager's Office"),
        CalendarEvent::new(
            "Product Launch Meeting",
            now + Duration::days(5) + Duration::hours(9),
            now + Duration::days(5) + Duration::hours(10) + Duration::minutes(30),
        )
        .with_description("Discuss the upcoming product launch strategy")
        .with_location("Boardroom")
        .with_attendees(vec![
            "product@company.com".into(),
            "marketing@company.com".into(),
            "engineering@company.com".into(),
        ]),
    ]
}

fn demo_emails() -> Vec<EmailMessage> {
    let now = Utc::now();

    vec![
        EmailMessage::new(
            "Welcome to the team!",
            "hr@company.com",
            "you@company.com",
            "We're excited to have you join our team. Here's everything you need to know to \
             get started...",
            now - Duration::hours(2),
        )
        .important(),
        EmailMessage::new(
            "Project Update - Q4 Roadmap",
            "project-manager@company.com",
            "you@company.com",
            "Hi team,\n\nI wanted to provide an update on our Q4 roadmap. We've made \
             significant progress on the AI features and are on track to meet our deadlines.\n\n\
             Please let me know if you have any questions.\n\nBest regards,\nProject Manager",
            now - Duration::hours(5),
        )
        .read(),
        EmailMessage::new(
            "Code Review Required",
            "developer@company.com",
            "you@company.com",
            "Hi,\n\nI've submitted a pull request for the new authentication system. Could \
             you please review it when you have a moment?\n\nThanks!",
            now - Duration::hours(1),
        ),
        EmailMessage::new(
            "Meeting Reminder: Client Presentation Tomorrow",
            "calendar@company.com",
            "you@company.com",
            "This is a reminder that you have the following meeting tomorrow:\n\nClient \
             Presentation\nTime: 10:00 AM - 11:00 AM\nLocation: Main Conference Room\n\n\
             Please prepare your materials in advance.",
            now - Duration::minutes(30),
        )
        .important(),
        EmailMessage::new(
            "Security Update Required",
            "security@company.com",
            "you@company.com",
            "Important Security Notice\n\nWe've identified a security update that needs to \
             be applied to all development systems. If you encounter any issues, please \
             contact the security team immediately.",
            now - Duration::days(1) - Duration::hours(3),
        )
        .read()
        .important(),
    ]
}

/// The canned suggestion set, also inserted by the suggestions/generate
/// endpoint.
pub fn demo_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new("Review quarterly reports", SuggestionKind::Task)
            .with_description(
                "Based on your calendar, you have a board meeting next week. Consider \
                 reviewing Q4 reports.",
            )
            .with_action_data(serde_json::json!({
                "action": "Create a task to review quarterly reports by Friday"
            }))
            .with_priority(TaskPriority::High),
        Suggestion::new("Follow up on project proposal", SuggestionKind::Email)
            .with_description(
                "You sent a project proposal 3 days ago. Consider sending a follow-up email.",
            )
            .with_action_data(serde_json::json!({
                "action": "Draft a follow-up email for the project proposal"
            })),
        Suggestion::new("Schedule team retrospective", SuggestionKind::Event)
            .with_description("It's been 2 weeks since your last team retrospective meeting.")
            .with_action_data(serde_json::json!({
                "action": "Schedule a team retrospective for next week"
            })),
        Suggestion::new("Take a break", SuggestionKind::General)
            .with_description(
                "You've been working for 3 hours straight. Consider taking a short break.",
            )
            .with_action_data(serde_json::json!({
                "action": "Set a 15-minute break reminder"
            }))
            .with_priority(TaskPriority::Low),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed_demo_data(&store).await.unwrap();
        seed_demo_data(&store).await.unwrap();

        let tasks = store.list_tasks(&TaskFilter::default(), 50, 0).await.unwrap();
        assert_eq!(tasks.len(), 5);

        let suggestions = store.list_suggestions(None, true, 50).await.unwrap();
        assert_eq!(suggestions.len(), 4);
    }

    #[tokio::test]
    async fn seeded_tasks_include_a_completed_one() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed_demo_data(&store).await.unwrap();

        let filter = TaskFilter {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let completed = store.list_tasks(&filter, 50, 0).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].completed_at.is_some());
    }
}
