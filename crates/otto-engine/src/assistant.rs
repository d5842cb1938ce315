//! The chat pipeline: classify an inbound message, dispatch to one of five
//! response generators, and surface any extracted actions.
//!
//! Every generator has a deterministic canned reply used when no LLM is
//! configured, the model call fails, or its JSON cannot be parsed. The
//! pipeline as a whole never fails — any error collapses into a fixed
//! apologetic reply.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use otto_core::{ChatMessage, MessageStore, OttoResult, TaskStore};
use otto_storage::SqliteStore;

use crate::actions::{parse_actions, AssistantAction};
use crate::config::AssistantConfig;
use crate::intent::{self, Intent};
use crate::llm::{strip_code_fences, ChatTurn, CompletionParams, LlmProvider};
use crate::services::SearchService;

// ---------------------------------------------------------------------------
// Reply types
// ---------------------------------------------------------------------------

/// A follow-up the user might want to take next, rendered as a chip in the
/// desktop shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub title: String,
    pub action: String,
}

impl FollowUp {
    fn new(title: &str, action: &str) -> Self {
        Self {
            title: title.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub content: String,
    pub suggestions: Vec<FollowUp>,
    pub actions: Vec<AssistantAction>,
    /// Model identifier when the content came from the LLM, None for
    /// canned fallbacks.
    pub model_used: Option<String>,
}

/// Shape the category prompts ask the model to reply in.
#[derive(Deserialize)]
struct RawBranchReply {
    content: String,
    #[serde(default)]
    suggestions: Vec<FollowUp>,
    #[serde(default)]
    actions: Vec<serde_json::Value>,
}

struct BranchReply {
    content: String,
    suggestions: Vec<FollowUp>,
    actions: Vec<AssistantAction>,
    from_llm: bool,
}

impl BranchReply {
    fn canned(content: &str, suggestions: Vec<FollowUp>) -> Self {
        Self {
            content: content.into(),
            suggestions,
            actions: Vec::new(),
            from_llm: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

pub struct Assistant {
    store: Arc<SqliteStore>,
    llm: Option<Arc<dyn LlmProvider>>,
    search: Arc<SearchService>,
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(
        store: Arc<SqliteStore>,
        llm: Option<Arc<dyn LlmProvider>>,
        search: Arc<SearchService>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            store,
            llm,
            search,
            config,
        }
    }

    /// Produce a reply for a user message. Infallible by design: any
    /// pipeline error yields the apologetic fallback.
    pub async fn respond(&self, message: &str, session_id: &str) -> AssistantReply {
        match self.dispatch(message, session_id).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chat pipeline failed, returning apologetic reply");
                AssistantReply {
                    content: format!(
                        "I apologize, but I encountered an error processing your request: {e}. \
                         Please try again."
                    ),
                    suggestions: Vec::new(),
                    actions: Vec::new(),
                    model_used: None,
                }
            }
        }
    }

    async fn dispatch(&self, message: &str, session_id: &str) -> OttoResult<AssistantReply> {
        let context = self
            .store
            .session_context(session_id, self.config.context_messages)
            .await?;

        let classification = intent::classify(self.llm.as_deref(), message).await;
        debug!(
            intent = classification.intent.as_str(),
            confidence = classification.confidence,
            "message classified"
        );

        let branch = match classification.intent {
            Intent::TaskManagement => self.handle_task(message).await?,
            Intent::CalendarManagement => self.handle_calendar(message).await,
            Intent::EmailManagement => self.handle_email(),
            Intent::SearchQuery => self.handle_search(message).await,
            Intent::GeneralConversation => self.handle_general(message, &context).await,
        };

        let model_used = branch
            .from_llm
            .then(|| self.llm.as_ref().map(|l| l.model().to_string()))
            .flatten();

        Ok(AssistantReply {
            content: branch.content,
            suggestions: branch.suggestions,
            actions: branch.actions,
            model_used,
        })
    }

    // --- Branch generators ---

    async fn handle_task(&self, message: &str) -> OttoResult<BranchReply> {
        let current_tasks = self.store.open_tasks(self.config.open_task_context).await?;

        let task_context = if current_tasks.is_empty() {
            "No current tasks.".to_string()
        } else {
            current_tasks
                .iter()
                .map(|t| {
                    format!(
                        "- {} (Priority: {}, Due: {})",
                        t.title,
                        t.priority,
                        t.due_at
                            .map(|d| d.to_rfc3339())
                            .unwrap_or_else(|| "none".into())
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let system_prompt = format!(
            "You are a productivity assistant helping with task management.\n\
             \n\
             Current tasks:\n\
             {task_context}\n\
             \n\
             Based on the user's message, provide a helpful response and suggest actions. \
             If the user wants to create a task, extract the details and include a \
             \"create_task\" action.\n\
             \n\
             Return JSON with:\n\
             {{\n\
                 \"content\": \"Your response to the user\",\n\
                 \"suggestions\": [\n\
                     {{\"title\": \"Suggestion\", \"action\": \"action_description\"}}\n\
                 ],\n\
                 \"actions\": [\n\
                     {{\n\
                         \"type\": \"create_task\",\n\
                         \"data\": {{\n\
                             \"title\": \"Task title\",\n\
                             \"description\": \"Task description\",\n\
                             \"priority\": \"medium\",\n\
                             \"due_date\": \"2024-01-01T10:00:00Z\"\n\
                         }}\n\
                     }}\n\
                 ]\n\
             }}"
        );

        if let Some(reply) = self.llm_json_branch(&system_prompt, message, 1000, 0.3).await {
            return Ok(reply);
        }

        Ok(BranchReply::canned(
            "I can help you manage your tasks. You can ask me to create new tasks, update \
             existing ones, or check your task list. What would you like to do?",
            vec![
                FollowUp::new("Create a new task", "Create a task to review quarterly reports"),
                FollowUp::new("List current tasks", "Show me my current tasks"),
                FollowUp::new("Mark task complete", "Mark my first task as complete"),
            ],
        ))
    }

    async fn handle_calendar(&self, message: &str) -> BranchReply {
        let system_prompt = "You are a calendar assistant. Help the user with scheduling and \
             calendar management.\n\
             \n\
             Based on the user's message, provide a helpful response and suggest actions. \
             If they want to create an event, include a \"create_event\" action with the \
             extracted details.\n\
             \n\
             Return JSON with content, suggestions, and actions.";

        if let Some(reply) = self.llm_json_branch(system_prompt, message, 1000, 0.3).await {
            return reply;
        }

        BranchReply::canned(
            "I can help you manage your calendar. You can ask me to schedule meetings, check \
             your upcoming events, or create reminders. To get started, you'll need to connect \
             your Google Calendar.",
            vec![
                FollowUp::new("Connect Google Calendar", "Connect your Google Calendar account"),
                FollowUp::new("Schedule a meeting", "Schedule a team meeting for tomorrow at 2 PM"),
                FollowUp::new("Check today's events", "What's on my calendar today?"),
            ],
        )
    }

    fn handle_email(&self) -> BranchReply {
        BranchReply::canned(
            "I can help you manage your emails. You can ask me to summarize recent emails, \
             suggest replies, or help compose new messages. To get started, you'll need to \
             connect your Gmail account.",
            vec![
                FollowUp::new("Connect Gmail", "Connect your Gmail account"),
                FollowUp::new("Summarize emails", "Summarize my last 5 emails"),
                FollowUp::new("Draft a reply", "Help me reply to my latest email"),
            ],
        )
    }

    async fn handle_search(&self, message: &str) -> BranchReply {
        let results = self.search.search_web(message, 5).await;

        let search_context = results
            .iter()
            .map(|r| {
                format!(
                    "Source: {}\nURL: {}\nContent: {}\n",
                    r.title, r.url, r.snippet
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let system_prompt = "You are a research assistant. Based on the search results \
             provided, give a comprehensive and accurate answer to the user's question. \
             Cite sources when possible and provide additional context.";
        let user_prompt =
            format!("Question: {message}\n\nSearch Results:\n{search_context}");

        if let Some(content) = self.llm_text(system_prompt, &user_prompt, 1500, 0.3).await {
            return BranchReply {
                content,
                suggestions: vec![
                    FollowUp::new("Search more", &format!("Tell me more about {message}")),
                    FollowUp::new("Related topics", "What are some related topics?"),
                ],
                actions: Vec::new(),
                from_llm: true,
            };
        }

        BranchReply::canned(
            "I can help you search for information on any topic. What would you like to know \
             more about?",
            vec![
                FollowUp::new("Ask a question", "What are the latest trends in AI?"),
                FollowUp::new("Look up facts", "Tell me about renewable energy"),
                FollowUp::new("Get definitions", "What is machine learning?"),
            ],
        )
    }

    async fn handle_general(&self, message: &str, context: &[ChatMessage]) -> BranchReply {
        let tail = context.len().saturating_sub(self.config.context_tail);
        let context_str = context[tail..]
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let system_prompt = format!(
            "You are a helpful AI productivity assistant. You help users manage their tasks, \
             calendar, emails, and answer questions. Be friendly, concise, and helpful.\n\
             \n\
             Recent conversation:\n\
             {context_str}\n\
             \n\
             Provide a natural response and suggest relevant actions the user might want to take."
        );

        if let Some(content) = self.llm_text(&system_prompt, message, 800, 0.7).await {
            return BranchReply {
                content,
                suggestions: vec![
                    FollowUp::new("Create a task", "Create a new task for me"),
                    FollowUp::new("Check calendar", "What's on my calendar today?"),
                    FollowUp::new("Email summary", "Summarize my recent emails"),
                ],
                actions: Vec::new(),
                from_llm: true,
            };
        }

        BranchReply::canned(
            "Hello! I'm your AI productivity assistant. I can help you manage tasks, schedule \
             events, handle emails, and answer questions. How can I assist you today?",
            vec![
                FollowUp::new(
                    "Create a task",
                    "Create a high-priority task to review quarterly reports",
                ),
                FollowUp::new("Schedule meeting", "Schedule a team meeting for tomorrow at 2 PM"),
                FollowUp::new(
                    "Ask a question",
                    "What are the latest trends in AI productivity tools?",
                ),
            ],
        )
    }

    // --- LLM helpers ---

    /// Ask the model for a structured branch reply. None on any failure;
    /// the caller falls back to its canned response.
    async fn llm_json_branch(
        &self,
        system_prompt: &str,
        message: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Option<BranchReply> {
        let raw = self
            .llm_text(system_prompt, message, max_tokens, temperature)
            .await?;

        match serde_json::from_str::<RawBranchReply>(strip_code_fences(&raw)) {
            Ok(parsed) => Some(BranchReply {
                content: parsed.content,
                suggestions: parsed.suggestions,
                actions: parse_actions(&parsed.actions),
                from_llm: true,
            }),
            Err(e) => {
                debug!(error = %e, "branch reply was not valid JSON, using canned fallback");
                None
            }
        }
    }

    async fn llm_text(
        &self,
        system_prompt: &str,
        message: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Option<String> {
        let llm = self.llm.as_deref()?;
        let messages = vec![ChatTurn::system(system_prompt), ChatTurn::user(message)];
        let params = CompletionParams {
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            ..Default::default()
        };

        match llm.complete(&messages, &params).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                debug!(error = %e, "LLM branch call failed, using canned fallback");
                None
            }
        }
    }
}
