//! Task insights and AI-driven task creation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use otto_core::{OttoError, OttoResult, Task, TaskFilter, TaskPriority, TaskStatus, TaskStore};
use otto_storage::SqliteStore;

use crate::actions::{parse_iso_datetime, parse_priority_label, TaskDraft};

pub struct TaskService {
    store: Arc<SqliteStore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskInsights {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_rate: f64,
    pub insights: Vec<String>,
    pub suggestions: Vec<String>,
}

impl TaskService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Create a task from AI-extracted fields. The one state-changing path
    /// of substance in the action pipeline.
    pub async fn create_from_draft(&self, draft: &TaskDraft) -> OttoResult<Task> {
        let mut task = Task::new(draft.title.trim())
            .with_priority(parse_priority_label(draft.priority.as_deref()))
            .suggested_by_ai();

        if let Some(ref description) = draft.description {
            task = task.with_description(description.clone());
        }
        if let Some(due_at) = draft.due_date.as_deref().and_then(parse_iso_datetime) {
            task = task.with_due_at(due_at);
        }
        task.estimated_minutes = draft.estimated_duration;

        self.store.insert_task(&task).await?;
        Ok(task)
    }

    /// Aggregate metrics over the full task list, with advice strings
    /// keyed off simple thresholds.
    pub async fn insights(&self) -> OttoResult<TaskInsights> {
        let tasks = self
            .store
            .list_tasks(&TaskFilter::default(), 1000, 0)
            .await?;

        if tasks.is_empty() {
            return Ok(TaskInsights {
                total_tasks: 0,
                completed_tasks: 0,
                pending_tasks: 0,
                overdue_tasks: 0,
                completion_rate: 0.0,
                insights: vec!["Create your first task to get started!".into()],
                suggestions: Vec::new(),
            });
        }

        let now = Utc::now();
        let total_tasks = tasks.len();
        let completed_tasks = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let pending_tasks = tasks.iter().filter(|t| t.status.is_open()).count();
        let overdue_tasks = tasks
            .iter()
            .filter(|t| {
                t.due_at.is_some_and(|due| due < now) && t.status != TaskStatus::Completed
            })
            .count();

        let completion_rate =
            ((completed_tasks as f64 / total_tasks as f64) * 1000.0).round() / 10.0;

        let mut insights = Vec::new();
        let mut suggestions = Vec::new();

        if completion_rate > 80.0 {
            insights.push("Great job! You have a high task completion rate.".into());
        } else if completion_rate < 50.0 {
            insights
                .push("Consider breaking down large tasks into smaller, manageable ones.".into());
            suggestions.push("Break down complex tasks into subtasks".into());
        }

        if overdue_tasks > 0 {
            insights.push(format!(
                "You have {overdue_tasks} overdue tasks. Consider prioritizing them."
            ));
            suggestions.push("Review and reschedule overdue tasks".into());
        }

        if pending_tasks > 10 {
            insights
                .push("You have many pending tasks. Consider using priority levels to focus.".into());
            suggestions.push("Set priorities for your pending tasks".into());
        }

        Ok(TaskInsights {
            total_tasks,
            completed_tasks,
            pending_tasks,
            overdue_tasks,
            completion_rate,
            insights,
            suggestions,
        })
    }

    /// Heuristic improvement advice for one task.
    pub async fn improvement_suggestions(&self, id: Uuid) -> OttoResult<Vec<String>> {
        let task = self
            .store
            .get_task(id)
            .await?
            .ok_or(OttoError::NotFound("task", id))?;

        let now = Utc::now();
        let mut suggestions = Vec::new();

        if task
            .description
            .as_deref()
            .map(|d| d.trim().len() < 10)
            .unwrap_or(true)
        {
            suggestions.push("Add a detailed description to clarify the task requirements".into());
        }

        match task.due_at {
            None => suggestions.push("Set a due date to help with time management".into()),
            Some(due) if due < now && task.status != TaskStatus::Completed => {
                suggestions
                    .push("This task is overdue - consider rescheduling or prioritizing".into());
            }
            _ => {}
        }

        if let Some(due) = task.due_at {
            if due < now + Duration::days(1)
                && matches!(task.priority, TaskPriority::Low | TaskPriority::Medium)
            {
                suggestions.push("Consider increasing priority for this urgent task".into());
            }
        }

        if task.created_at < now - Duration::days(7) && task.status == TaskStatus::InProgress {
            suggestions
                .push("This task has been in progress for a while - consider breaking it down".into());
        }

        if suggestions.is_empty() {
            suggestions.push("This task looks well-organized!".into());
        }

        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otto_core::TaskUpdate;

    fn service() -> TaskService {
        TaskService::new(Arc::new(SqliteStore::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn draft_creation_maps_priority_and_due_date() {
        let service = service();
        let draft = TaskDraft {
            title: "Review quarterly reports".into(),
            description: Some("Q4 numbers before the board meeting".into()),
            priority: Some("high".into()),
            due_date: Some("2030-01-01T10:00:00Z".into()),
            estimated_duration: Some(45),
        };

        let task = service.create_from_draft(&draft).await.unwrap();
        assert_eq!(task.priority, TaskPriority::High);
        assert!(task.ai_suggested);
        assert_eq!(task.estimated_minutes, Some(45));
        assert_eq!(task.due_at.unwrap().to_rfc3339(), "2030-01-01T10:00:00+00:00");

        let stored = service.store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Review quarterly reports");
    }

    #[tokio::test]
    async fn insights_on_empty_store_prompt_first_task() {
        let service = service();
        let insights = service.insights().await.unwrap();
        assert_eq!(insights.total_tasks, 0);
        assert_eq!(insights.insights, vec!["Create your first task to get started!".to_string()]);
    }

    #[tokio::test]
    async fn insights_count_overdue_and_completed() {
        let service = service();

        let overdue = Task::new("late").with_due_at(Utc::now() - Duration::days(2));
        service.store.insert_task(&overdue).await.unwrap();

        let mut done = Task::new("done");
        done.apply(TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        });
        service.store.insert_task(&done).await.unwrap();

        let insights = service.insights().await.unwrap();
        assert_eq!(insights.total_tasks, 2);
        assert_eq!(insights.completed_tasks, 1);
        assert_eq!(insights.overdue_tasks, 1);
        assert!((insights.completion_rate - 50.0).abs() < 0.01);
        assert!(insights
            .insights
            .iter()
            .any(|i| i.contains("1 overdue tasks")));
    }

    #[tokio::test]
    async fn improvement_suggestions_flag_missing_details() {
        let service = service();
        let task = Task::new("vague");
        service.store.insert_task(&task).await.unwrap();

        let suggestions = service.improvement_suggestions(task.id).await.unwrap();
        assert!(suggestions.iter().any(|s| s.contains("description")));
        assert!(suggestions.iter().any(|s| s.contains("due date")));
    }

    #[tokio::test]
    async fn improvement_suggestions_missing_task_is_not_found() {
        let service = service();
        let err = service
            .improvement_suggestions(Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, OttoError::NotFound("task", _)));
    }
}
