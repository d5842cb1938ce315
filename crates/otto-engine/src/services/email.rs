//! Email sending, summaries, and reply suggestions.
//!
//! Outbound mail is always recorded in the local store. Actual SMTP
//! delivery happens only when configured; the default configuration keeps
//! the demo behavior of a persisted-but-undelivered send.

use std::sync::Arc;

use chrono::Utc;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use tracing::info;

use otto_core::{EmailFilter, EmailMessage, EmailStore, OttoError, OttoResult};
use otto_storage::SqliteStore;

use crate::actions::EmailDraft;
use crate::config::SmtpConfig;

/// Keywords that mark an email as likely needing a response.
const ACTION_KEYWORDS: &[&str] = &[
    "please", "urgent", "asap", "deadline", "respond", "reply", "confirm",
];

const DEFAULT_SENDER: &str = "otto@localhost";

pub struct EmailService {
    store: Arc<SqliteStore>,
    smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRequiredEmail {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSummaryReport {
    pub summary: String,
    pub total_emails: usize,
    pub unread_count: usize,
    pub important_emails: Vec<EmailMessage>,
    pub action_required: Vec<ActionRequiredEmail>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplySuggestion {
    pub kind: &'static str,
    pub content: &'static str,
    pub tone: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailInsights {
    pub insights: Vec<String>,
    pub suggestions: Vec<String>,
    pub email_volume: EmailVolume,
    pub response_metrics: ResponseMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailVolume {
    pub daily_average: u32,
    pub weekly_average: u32,
    pub peak_hours: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetrics {
    pub average_response_time: &'static str,
    pub response_rate: &'static str,
    pub unread_backlog: u32,
}

impl EmailService {
    pub fn new(store: Arc<SqliteStore>, smtp: SmtpConfig) -> Self {
        Self { store, smtp }
    }

    /// Record an outbound email and deliver it when SMTP is configured.
    pub async fn send(&self, draft: &EmailDraft) -> OttoResult<EmailMessage> {
        let sender = self
            .smtp
            .from_address
            .clone()
            .unwrap_or_else(|| DEFAULT_SENDER.to_string());

        let email = EmailMessage::new(
            draft.subject.clone(),
            sender,
            draft.to.clone(),
            draft.body.clone(),
            Utc::now(),
        )
        .read();

        self.store.insert_email(&email).await?;

        if self.smtp.enabled {
            self.deliver(&email).await?;
            info!(recipient = %email.recipient, "email delivered via SMTP");
        }

        Ok(email)
    }

    async fn deliver(&self, email: &EmailMessage) -> OttoResult<()> {
        let host = self
            .smtp
            .host
            .as_deref()
            .ok_or_else(|| OttoError::Config("smtp enabled but no host configured".into()))?;
        let username = self
            .smtp
            .username
            .as_deref()
            .ok_or_else(|| OttoError::Config("smtp enabled but no username configured".into()))?;
        let password = self
            .smtp
            .password
            .as_deref()
            .ok_or_else(|| OttoError::Config("smtp enabled but no password configured".into()))?;

        let from: Mailbox = email
            .sender
            .parse()
            .map_err(|e| OttoError::Email(format!("invalid sender address: {e}")))?;
        let to: Mailbox = email
            .recipient
            .parse()
            .map_err(|e| OttoError::Email(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .body(email.body.clone())
            .map_err(|e| OttoError::Email(format!("failed to build message: {e}")))?;

        let transport: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| OttoError::Email(format!("smtp relay setup failed: {e}")))?
                .port(self.smtp.port)
                .credentials(Credentials::new(username.to_string(), password.to_string()))
                .build();

        transport
            .send(message)
            .await
            .map_err(|e| OttoError::Email(format!("smtp send failed: {e}")))?;

        Ok(())
    }

    /// Analyze the most recent stored emails: unread and important counts,
    /// likely-actionable messages, and a prose summary.
    pub async fn summary(&self, days_back: i64) -> OttoResult<EmailSummaryReport> {
        let emails = self
            .store
            .list_emails(&EmailFilter::default(), 50, 0)
            .await?;

        if emails.is_empty() {
            return Ok(EmailSummaryReport {
                summary: "No recent emails to summarize. Connect your Gmail account to get started."
                    .into(),
                total_emails: 0,
                unread_count: 0,
                important_emails: Vec::new(),
                action_required: Vec::new(),
                insights: vec!["Connect your Gmail account to see email summaries".into()],
            });
        }

        let total_emails = emails.len();
        let unread_count = emails.iter().filter(|e| !e.is_read).count();
        let important_emails: Vec<EmailMessage> = emails
            .iter()
            .filter(|e| e.is_important)
            .take(5)
            .cloned()
            .collect();

        let action_required: Vec<ActionRequiredEmail> = emails
            .iter()
            .filter(|e| {
                let text = format!("{} {}", e.subject, e.body).to_lowercase();
                ACTION_KEYWORDS.iter().any(|k| text.contains(k))
            })
            .take(5)
            .map(|e| ActionRequiredEmail {
                id: e.id.to_string(),
                subject: e.subject.clone(),
                sender: e.sender.clone(),
                reason: "May require action or response",
            })
            .collect();

        let mut insights = Vec::new();
        if unread_count > 10 {
            insights.push(format!(
                "You have {unread_count} unread emails - consider setting aside time to process them"
            ));
        }
        if !action_required.is_empty() {
            insights.push(format!(
                "{} emails may require your attention or response",
                action_required.len()
            ));
        }
        if !important_emails.is_empty() {
            insights.push(format!(
                "{} important emails in your inbox",
                important_emails.len()
            ));
        }

        let mut summary = format!("In the last {days_back} days, you received {total_emails} emails. ");
        if unread_count > 0 {
            summary.push_str(&format!("{unread_count} are still unread. "));
        }
        if !action_required.is_empty() {
            summary.push_str(&format!(
                "{} emails may need your attention. ",
                action_required.len()
            ));
        }
        summary.push_str("Consider prioritizing important emails and those requiring responses.");

        Ok(EmailSummaryReport {
            summary,
            total_emails,
            unread_count,
            important_emails,
            action_required,
            insights,
        })
    }

    /// Canned reply templates. A real implementation would condition these
    /// on the email body.
    pub fn suggested_replies(&self) -> Vec<ReplySuggestion> {
        vec![
            ReplySuggestion {
                kind: "professional",
                content: "Thank you for your email. I'll review this and get back to you by end of day.",
                tone: "Professional and courteous",
            },
            ReplySuggestion {
                kind: "quick",
                content: "Thanks for the update. This looks good to me.",
                tone: "Brief and positive",
            },
            ReplySuggestion {
                kind: "detailed",
                content: "Hi, thank you for reaching out. I appreciate you taking the time to send this. Let me review the details and I'll respond with my thoughts shortly.",
                tone: "Detailed and thoughtful",
            },
        ]
    }

    /// Fixed illustrative email pattern metrics.
    pub fn insights(&self) -> EmailInsights {
        EmailInsights {
            insights: vec![
                "You receive an average of 15 emails per day".into(),
                "Most of your emails come in during business hours (9 AM - 5 PM)".into(),
                "You have a good email response rate of 85%".into(),
            ],
            suggestions: vec![
                "Consider setting specific times for checking email to improve focus".into(),
                "Use email filters to automatically organize incoming messages".into(),
                "Set up templates for common responses to save time".into(),
            ],
            email_volume: EmailVolume {
                daily_average: 15,
                weekly_average: 105,
                peak_hours: vec!["9-10 AM", "2-3 PM"],
            },
            response_metrics: ResponseMetrics {
                average_response_time: "4 hours",
                response_rate: "85%",
                unread_backlog: 3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EmailService {
        EmailService::new(
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            SmtpConfig::default(),
        )
    }

    #[tokio::test]
    async fn send_records_outbound_mail_without_smtp() {
        let service = service();
        let draft = EmailDraft {
            to: "manager@company.com".into(),
            subject: "Status update".into(),
            body: "All milestones on track.".into(),
        };

        let email = service.send(&draft).await.unwrap();
        assert_eq!(email.recipient, "manager@company.com");
        assert_eq!(email.sender, DEFAULT_SENDER);
        assert!(email.is_read);

        let stored = service.store.get_email(email.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn summary_flags_action_keywords_and_unread() {
        let service = service();
        service
            .store
            .insert_email(&EmailMessage::new(
                "Please confirm the deadline",
                "manager@company.com",
                "you@company.com",
                "Please confirm by Friday.",
                Utc::now(),
            ))
            .await
            .unwrap();
        service
            .store
            .insert_email(
                &EmailMessage::new(
                    "Newsletter",
                    "news@example.com",
                    "you@company.com",
                    "This month in productivity.",
                    Utc::now(),
                )
                .read(),
            )
            .await
            .unwrap();

        let report = service.summary(7).await.unwrap();
        assert_eq!(report.total_emails, 2);
        assert_eq!(report.unread_count, 1);
        assert_eq!(report.action_required.len(), 1);
        assert_eq!(report.action_required[0].subject, "Please confirm the deadline");
        assert!(report.summary.contains("you received 2 emails"));
    }

    #[tokio::test]
    async fn empty_mailbox_summary_suggests_connecting() {
        let service = service();
        let report = service.summary(7).await.unwrap();
        assert_eq!(report.total_emails, 0);
        assert!(report.summary.contains("Connect your Gmail account"));
    }

    #[test]
    fn reply_suggestions_offer_three_tones() {
        let service = service();
        let replies = service.suggested_replies();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0].kind, "professional");
    }
}
