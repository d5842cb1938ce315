//! Intent classification for inbound chat messages.
//!
//! Two layers:
//! 1. **LLM-based** (when a provider is configured): one classification
//!    request returning JSON.
//! 2. **Keyword fallback** (always available): substring matching against
//!    fixed keyword lists. Classification never fails — any LLM or parse
//!    error degrades to the keyword matcher.

use serde::Deserialize;
use tracing::debug;

use crate::llm::{strip_code_fences, ChatTurn, CompletionParams, LlmProvider};

const TASK_KEYWORDS: &[&str] = &["task", "todo", "remind", "complete", "finish", "do"];
const CALENDAR_KEYWORDS: &[&str] = &["meeting", "event", "schedule", "calendar", "appointment"];
const EMAIL_KEYWORDS: &[&str] = &["email", "mail", "send", "reply", "compose"];
const SEARCH_KEYWORDS: &[&str] = &["search", "find", "look up", "what is", "tell me about"];

const CLASSIFY_SYSTEM_PROMPT: &str = "\
You are an AI assistant that analyzes user messages to determine their intent. \
Classify the message into one of these categories:
- task_management: Creating, updating, or managing tasks
- calendar_management: Scheduling events, checking calendar
- email_management: Reading, composing, or managing emails
- search_query: Looking up information
- general_conversation: General chat or questions

Return a JSON object with:
{
    \"type\": \"category\",
    \"confidence\": 0.0-1.0,
    \"parameters\": {
        \"action\": \"create/update/delete/list\",
        \"entities\": [\"extracted\", \"entities\"],
        \"priority\": \"low/medium/high/urgent\",
        \"due_date\": \"extracted date if any\",
        \"title\": \"extracted title/subject\",
        \"description\": \"extracted description\"
    }
}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    TaskManagement,
    CalendarManagement,
    EmailManagement,
    SearchQuery,
    GeneralConversation,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskManagement => "task_management",
            Self::CalendarManagement => "calendar_management",
            Self::EmailManagement => "email_management",
            Self::SearchQuery => "search_query",
            Self::GeneralConversation => "general_conversation",
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_management" => Ok(Self::TaskManagement),
            "calendar_management" => Ok(Self::CalendarManagement),
            "email_management" => Ok(Self::EmailManagement),
            "search_query" => Ok(Self::SearchQuery),
            "general_conversation" => Ok(Self::GeneralConversation),
            _ => Err(format!("unknown intent: {s}")),
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct IntentClassification {
    pub intent: Intent,
    pub confidence: f32,
    pub parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct RawClassification {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    parameters: serde_json::Value,
}

/// Classify a message, preferring the LLM and degrading to keyword
/// matching on any failure.
pub async fn classify(llm: Option<&dyn LlmProvider>, message: &str) -> IntentClassification {
    if let Some(llm) = llm {
        let messages = vec![
            ChatTurn::system(CLASSIFY_SYSTEM_PROMPT),
            ChatTurn::user(message),
        ];
        let params = CompletionParams {
            max_tokens: Some(500),
            temperature: Some(0.1),
            ..Default::default()
        };

        match llm.complete(&messages, &params).await {
            Ok(reply) => match parse_classification(&reply) {
                Some(classification) => return classification,
                None => {
                    debug!("intent classification reply was not valid JSON, using keyword fallback");
                }
            },
            Err(e) => {
                debug!(error = %e, "intent classification request failed, using keyword fallback");
            }
        }
    }

    classify_by_keywords(message)
}

fn parse_classification(reply: &str) -> Option<IntentClassification> {
    let raw: RawClassification = serde_json::from_str(strip_code_fences(reply)).ok()?;
    let intent = raw.kind.parse().ok()?;
    Some(IntentClassification {
        intent,
        confidence: raw.confidence.clamp(0.0, 1.0),
        parameters: raw.parameters,
    })
}

/// Keyword-substring fallback. Order matters: task keywords win over
/// calendar, calendar over email, email over search.
pub fn classify_by_keywords(message: &str) -> IntentClassification {
    let lower = message.to_lowercase();

    let matched = [
        (Intent::TaskManagement, TASK_KEYWORDS),
        (Intent::CalendarManagement, CALENDAR_KEYWORDS),
        (Intent::EmailManagement, EMAIL_KEYWORDS),
        (Intent::SearchQuery, SEARCH_KEYWORDS),
    ]
    .into_iter()
    .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)));

    match matched {
        Some((intent, _)) => IntentClassification {
            intent,
            confidence: 0.7,
            parameters: serde_json::json!({}),
        },
        None => IntentClassification {
            intent: Intent::GeneralConversation,
            confidence: 0.5,
            parameters: serde_json::json!({}),
        },
    }
}
