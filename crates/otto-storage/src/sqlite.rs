use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use otto_core::*;

/// Default number of connections in the pool.
/// SQLite WAL mode supports 1 writer + N readers, so even a small pool
/// eliminates head-of-line blocking for concurrent read queries.
const DEFAULT_POOL_SIZE: usize = 4;

pub struct SqliteStore {
    /// Connection pool — round-robin across `DEFAULT_POOL_SIZE` connections.
    /// Each connection is independently protected by a Mutex so callers can
    /// run synchronous rusqlite operations without holding an async lock.
    pool: Vec<Mutex<Connection>>,
    /// Atomic counter for round-robin slot selection.
    next_slot: std::sync::atomic::AtomicUsize,
}

impl SqliteStore {
    /// Execute a synchronous closure with a pooled database connection.
    ///
    /// Picks the next connection via round-robin, locks it, runs the
    /// closure, then releases. Because the closure is `FnOnce` (not async),
    /// the `MutexGuard` is guaranteed to drop before any `.await` — making
    /// the enclosing future `Send`.
    fn with_conn<F, T>(&self, f: F) -> OttoResult<T>
    where
        F: FnOnce(&Connection) -> OttoResult<T>,
    {
        let idx = self
            .next_slot
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.pool.len();
        let conn = self.pool[idx]
            .lock()
            .map_err(|e| OttoError::Storage(e.to_string()))?;
        f(&conn)
    }

    fn open_connection(path: &Path) -> OttoResult<Connection> {
        let conn = Connection::open(path)
            .map_err(|e| OttoError::Storage(format!("failed to open sqlite: {e}")))?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
        )
        .map_err(|e| OttoError::Storage(format!("pragma error: {e}")))?;

        Ok(conn)
    }

    pub fn open(path: &Path) -> OttoResult<Self> {
        let mut pool = Vec::with_capacity(DEFAULT_POOL_SIZE);
        for _ in 0..DEFAULT_POOL_SIZE {
            pool.push(Mutex::new(Self::open_connection(path)?));
        }

        let store = Self {
            pool,
            next_slot: std::sync::atomic::AtomicUsize::new(0),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn open_in_memory() -> OttoResult<Self> {
        // In-memory DBs: use a shared cache URI so all pool connections see
        // the same data. Without this, each Connection::open_in_memory()
        // gets its own isolated database.
        //
        // SQLITE_OPEN_URI is required for rusqlite to parse the URI; the
        // default OpenFlags do NOT include it.
        let uri = format!("file:memdb{}?mode=memory&cache=shared", Uuid::new_v4());
        let flags = rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
            | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
            | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX
            | rusqlite::OpenFlags::SQLITE_OPEN_URI;
        let mut pool = Vec::with_capacity(DEFAULT_POOL_SIZE);
        for _ in 0..DEFAULT_POOL_SIZE {
            let conn = Connection::open_with_flags(&uri, flags)
                .map_err(|e| OttoError::Storage(format!("failed to open in-memory sqlite: {e}")))?;
            conn.execute_batch("PRAGMA foreign_keys=ON;")
                .map_err(|e| OttoError::Storage(format!("pragma error: {e}")))?;
            pool.push(Mutex::new(conn));
        }

        let store = Self {
            pool,
            next_slot: std::sync::atomic::AtomicUsize::new(0),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> OttoResult<()> {
        // Migrations run on slot 0 only — they need exclusive access.
        let conn = self.pool[0]
            .lock()
            .map_err(|e| OttoError::Storage(e.to_string()))?;

        // Table-driven migration registry. Migration 001 must always run
        // first to create the schema_version table; later versions are
        // skipped when already applied.
        const MIGRATIONS: &[(i64, &str)] =
            &[(1, include_str!("../migrations/001_initial.sql"))];

        conn.execute_batch(MIGRATIONS[0].1)
            .map_err(|e| OttoError::Migration(format!("migration 001 failed: {e}")))?;

        let max_version: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for &(version, sql) in &MIGRATIONS[1..] {
            if version <= max_version {
                continue;
            }
            conn.execute_batch(sql)
                .map_err(|e| OttoError::Migration(format!("migration {version:03} failed: {e}")))?;
        }

        tracing::debug!(
            applied_up_to = MIGRATIONS.last().map(|(v, _)| *v).unwrap_or(0),
            "migrations complete"
        );

        Ok(())
    }

    fn load_tags(conn: &Connection, task_id: Uuid) -> OttoResult<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT tag FROM task_tags WHERE task_id = ?1 ORDER BY tag")
            .map_err(|e| OttoError::Storage(e.to_string()))?;

        let mut tags = Vec::new();
        let rows = stmt
            .query_map(params![task_id.to_string()], |row| row.get(0))
            .map_err(|e| OttoError::Storage(e.to_string()))?;

        for row in rows {
            tags.push(row.map_err(|e| OttoError::Storage(e.to_string()))?);
        }

        Ok(tags)
    }

    fn save_tags(conn: &Connection, task_id: Uuid, tags: &[String]) -> OttoResult<()> {
        conn.execute(
            "DELETE FROM task_tags WHERE task_id = ?1",
            params![task_id.to_string()],
        )
        .map_err(|e| OttoError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare("INSERT INTO task_tags (task_id, tag) VALUES (?1, ?2)")
            .map_err(|e| OttoError::Storage(e.to_string()))?;
        for tag in tags {
            stmt.execute(params![task_id.to_string(), tag])
                .map_err(|e| OttoError::Storage(e.to_string()))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row conversion helpers
// ---------------------------------------------------------------------------

fn parse_uuid_str(column: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err)))
}

fn parse_dt_strict(column: usize, s: &str) -> rusqlite::Result<chrono::DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err)))
}

fn parse_optional_dt_strict(
    column: usize,
    s: Option<String>,
) -> rusqlite::Result<Option<chrono::DateTime<Utc>>> {
    match s {
        Some(value) => parse_dt_strict(column, &value).map(Some),
        None => Ok(None),
    }
}

fn parse_str_field<T>(column: usize, s: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    s.parse().map_err(|err: String| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, err)),
        )
    })
}

fn parse_json_field(column: usize, s: &str) -> rusqlite::Result<serde_json::Value> {
    serde_json::from_str(s)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err)))
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let id_str: String = row.get(0)?;
    let priority_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let due_at: Option<String> = row.get(5)?;
    let reminder_at: Option<String> = row.get(6)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;
    let completed_at: Option<String> = row.get(12)?;

    Ok(Task {
        id: parse_uuid_str(0, &id_str)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: parse_str_field(3, &priority_str)?,
        status: parse_str_field(4, &status_str)?,
        due_at: parse_optional_dt_strict(5, due_at)?,
        reminder_at: parse_optional_dt_strict(6, reminder_at)?,
        tags: Vec::new(), // loaded separately
        category: row.get(7)?,
        ai_suggested: row.get(8)?,
        estimated_minutes: row.get(9)?,
        created_at: parse_dt_strict(10, &created_at)?,
        updated_at: parse_dt_strict(11, &updated_at)?,
        completed_at: parse_optional_dt_strict(12, completed_at)?,
    })
}

const TASK_COLUMNS: &str = "id, title, description, priority, status, due_at, reminder_at, \
     category, ai_suggested, estimated_minutes, created_at, updated_at, completed_at";

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<CalendarEvent> {
    let id_str: String = row.get(0)?;
    let start_at: String = row.get(3)?;
    let end_at: String = row.get(4)?;
    let attendees_json: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    let attendees: Vec<String> = serde_json::from_str(&attendees_json).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(err))
    })?;

    Ok(CalendarEvent {
        id: parse_uuid_str(0, &id_str)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start_at: parse_dt_strict(3, &start_at)?,
        end_at: parse_dt_strict(4, &end_at)?,
        location: row.get(5)?,
        attendees,
        created_at: parse_dt_strict(7, &created_at)?,
        updated_at: parse_dt_strict(8, &updated_at)?,
    })
}

const EVENT_COLUMNS: &str =
    "id, title, description, start_at, end_at, location, attendees_json, created_at, updated_at";

fn row_to_email(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmailMessage> {
    let id_str: String = row.get(0)?;
    let received_at: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(EmailMessage {
        id: parse_uuid_str(0, &id_str)?,
        subject: row.get(1)?,
        sender: row.get(2)?,
        recipient: row.get(3)?,
        body: row.get(4)?,
        is_read: row.get(5)?,
        is_important: row.get(6)?,
        received_at: parse_dt_strict(7, &received_at)?,
        created_at: parse_dt_strict(8, &created_at)?,
    })
}

const EMAIL_COLUMNS: &str =
    "id, subject, sender, recipient, body, is_read, is_important, received_at, created_at";

fn row_to_chat_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let id_str: String = row.get(0)?;
    let role_str: String = row.get(1)?;
    let metadata_json: Option<String> = row.get(4)?;
    let processing_ms: Option<i64> = row.get(6)?;
    let created_at: String = row.get(7)?;

    let metadata = match metadata_json {
        Some(raw) => Some(parse_json_field(4, &raw)?),
        None => None,
    };

    Ok(ChatMessage {
        id: parse_uuid_str(0, &id_str)?,
        role: parse_str_field(1, &role_str)?,
        content: row.get(2)?,
        session_id: row.get(3)?,
        metadata,
        model_used: row.get(5)?,
        processing_ms: processing_ms.map(|v| v as u64),
        created_at: parse_dt_strict(7, &created_at)?,
    })
}

const MESSAGE_COLUMNS: &str =
    "id, role, content, session_id, metadata_json, model_used, processing_ms, created_at";

fn row_to_suggestion(row: &rusqlite::Row<'_>) -> rusqlite::Result<Suggestion> {
    let id_str: String = row.get(0)?;
    let action_type_str: String = row.get(3)?;
    let action_data_json: Option<String> = row.get(4)?;
    let priority_str: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    let expires_at: Option<String> = row.get(8)?;

    let action_data = match action_data_json {
        Some(raw) => Some(parse_json_field(4, &raw)?),
        None => None,
    };

    Ok(Suggestion {
        id: parse_uuid_str(0, &id_str)?,
        title: row.get(1)?,
        description: row.get(2)?,
        action_type: parse_str_field(3, &action_type_str)?,
        action_data,
        priority: parse_str_field(5, &priority_str)?,
        is_dismissed: row.get(6)?,
        created_at: parse_dt_strict(7, &created_at)?,
        expires_at: parse_optional_dt_strict(8, expires_at)?,
    })
}

const SUGGESTION_COLUMNS: &str = "id, title, description, action_type, action_data_json, \
     priority, is_dismissed, created_at, expires_at";

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let id_str: String = row.get(0)?;
    let kind_str: String = row.get(1)?;
    let status_str: String = row.get(4)?;
    let scheduled_for: Option<String> = row.get(5)?;
    let created_at: String = row.get(6)?;
    let sent_at: Option<String> = row.get(7)?;
    let read_at: Option<String> = row.get(8)?;

    Ok(Notification {
        id: parse_uuid_str(0, &id_str)?,
        kind: parse_str_field(1, &kind_str)?,
        title: row.get(2)?,
        message: row.get(3)?,
        status: parse_str_field(4, &status_str)?,
        scheduled_for: parse_optional_dt_strict(5, scheduled_for)?,
        created_at: parse_dt_strict(6, &created_at)?,
        sent_at: parse_optional_dt_strict(7, sent_at)?,
        read_at: parse_optional_dt_strict(8, read_at)?,
    })
}

const NOTIFICATION_COLUMNS: &str =
    "id, kind, title, message, status, scheduled_for, created_at, sent_at, read_at";

fn row_to_subscription(row: &rusqlite::Row<'_>) -> rusqlite::Result<PushSubscription> {
    let id_str: String = row.get(0)?;
    let created_at: String = row.get(3)?;

    Ok(PushSubscription {
        id: parse_uuid_str(0, &id_str)?,
        endpoint: row.get(1)?,
        keys: row.get(2)?,
        created_at: parse_dt_strict(3, &created_at)?,
    })
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let preferences_json: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(User {
        id: parse_uuid_str(0, &id_str)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        is_active: row.get(3)?,
        theme: row.get(4)?,
        notifications_enabled: row.get(5)?,
        preferences: parse_json_field(6, &preferences_json)?,
        google_id: row.get(7)?,
        created_at: parse_dt_strict(8, &created_at)?,
        updated_at: parse_dt_strict(9, &updated_at)?,
    })
}

const USER_COLUMNS: &str = "id, email, full_name, is_active, theme, notifications_enabled, \
     preferences_json, google_id, created_at, updated_at";

fn row_to_google_token(row: &rusqlite::Row<'_>) -> rusqlite::Result<GoogleToken> {
    let id_str: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    let expires_at: Option<String> = row.get(5)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    Ok(GoogleToken {
        id: parse_uuid_str(0, &id_str)?,
        user_id: parse_uuid_str(1, &user_id_str)?,
        access_token: row.get(2)?,
        refresh_token: row.get(3)?,
        token_type: row.get(4)?,
        expires_at: parse_optional_dt_strict(5, expires_at)?,
        scope: row.get(6)?,
        calendar_enabled: row.get(7)?,
        gmail_enabled: row.get(8)?,
        created_at: parse_dt_strict(9, &created_at)?,
        updated_at: parse_dt_strict(10, &updated_at)?,
    })
}

const GOOGLE_TOKEN_COLUMNS: &str = "id, user_id, access_token, refresh_token, token_type, \
     expires_at, scope, calendar_enabled, gmail_enabled, created_at, updated_at";

fn storage_err(e: rusqlite::Error) -> OttoError {
    OttoError::Storage(e.to_string())
}

// ---------------------------------------------------------------------------
// TaskStore
// ---------------------------------------------------------------------------

#[async_trait]
impl TaskStore for SqliteStore {
    async fn insert_task(&self, task: &Task) -> OttoResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (id, title, description, priority, status, due_at, reminder_at,
                 category, ai_suggested, estimated_minutes, created_at, updated_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    task.id.to_string(),
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.status.as_str(),
                    task.due_at.map(|dt| dt.to_rfc3339()),
                    task.reminder_at.map(|dt| dt.to_rfc3339()),
                    task.category,
                    task.ai_suggested,
                    task.estimated_minutes,
                    task.created_at.to_rfc3339(),
                    task.updated_at.to_rfc3339(),
                    task.completed_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert task failed: {e}")))?;

            Self::save_tags(conn, task.id, &task.tags)
        })
    }

    async fn get_task(&self, id: Uuid) -> OttoResult<Option<Task>> {
        self.with_conn(|conn| {
            let task = conn
                .query_row(
                    &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                    params![id.to_string()],
                    row_to_task,
                )
                .optional()
                .map_err(storage_err)?;

            match task {
                Some(mut task) => {
                    task.tags = Self::load_tags(conn, task.id)?;
                    Ok(Some(task))
                }
                None => Ok(None),
            }
        })
    }

    async fn update_task(&self, task: &Task) -> OttoResult<()> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE tasks SET title = ?2, description = ?3, priority = ?4, status = ?5,
                     due_at = ?6, reminder_at = ?7, category = ?8, ai_suggested = ?9,
                     estimated_minutes = ?10, updated_at = ?11, completed_at = ?12
                     WHERE id = ?1",
                    params![
                        task.id.to_string(),
                        task.title,
                        task.description,
                        task.priority.as_str(),
                        task.status.as_str(),
                        task.due_at.map(|dt| dt.to_rfc3339()),
                        task.reminder_at.map(|dt| dt.to_rfc3339()),
                        task.category,
                        task.ai_suggested,
                        task.estimated_minutes,
                        task.updated_at.to_rfc3339(),
                        task.completed_at.map(|dt| dt.to_rfc3339()),
                    ],
                )
                .map_err(storage_err)?;

            if changed == 0 {
                return Err(OttoError::NotFound("task", task.id));
            }

            Self::save_tags(conn, task.id, &task.tags)
        })
    }

    async fn delete_task(&self, id: Uuid) -> OttoResult<bool> {
        self.with_conn(|conn| {
            let deleted = conn
                .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
                .map_err(storage_err)?;
            Ok(deleted > 0)
        })
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks");
            let mut clauses: Vec<&str> = Vec::new();
            let mut bind: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(status) = filter.status {
                clauses.push("status = ?");
                bind.push(Box::new(status.as_str()));
            }
            if let Some(priority) = filter.priority {
                clauses.push("priority = ?");
                bind.push(Box::new(priority.as_str()));
            }
            if let Some(ref category) = filter.category {
                clauses.push("category = ?");
                bind.push(Box::new(category.clone()));
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
            bind.push(Box::new(limit as i64));
            bind.push(Box::new(offset as i64));

            let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params_from_iter(bind.iter()), row_to_task)
                .map_err(storage_err)?;

            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row.map_err(storage_err)?);
            }
            for task in &mut tasks {
                task.tags = Self::load_tags(conn, task.id)?;
            }
            Ok(tasks)
        })
    }

    async fn open_tasks(&self, limit: usize) -> OttoResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks
                     WHERE status IN ('todo', 'in_progress')
                     ORDER BY created_at DESC LIMIT ?1"
                ))
                .map_err(storage_err)?;
            let rows = stmt
                .query_map(params![limit as i64], row_to_task)
                .map_err(storage_err)?;

            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row.map_err(storage_err)?);
            }
            for task in &mut tasks {
                task.tags = Self::load_tags(conn, task.id)?;
            }
            Ok(tasks)
        })
    }
}

// ---------------------------------------------------------------------------
// EventStore
// ---------------------------------------------------------------------------

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert_event(&self, event: &CalendarEvent) -> OttoResult<()> {
        let attendees_json = serde_json::to_string(&event.attendees)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO calendar_events (id, title, description, start_at, end_at,
                 location, attendees_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    event.id.to_string(),
                    event.title,
                    event.description,
                    event.start_at.to_rfc3339(),
                    event.end_at.to_rfc3339(),
                    event.location,
                    attendees_json,
                    event.created_at.to_rfc3339(),
                    event.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert event failed: {e}")))?;
            Ok(())
        })
    }

    async fn get_event(&self, id: Uuid) -> OttoResult<Option<CalendarEvent>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = ?1"),
                params![id.to_string()],
                row_to_event,
            )
            .optional()
            .map_err(storage_err)
        })
    }

    async fn update_event(&self, event: &CalendarEvent) -> OttoResult<()> {
        let attendees_json = serde_json::to_string(&event.attendees)?;
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE calendar_events SET title = ?2, description = ?3, start_at = ?4,
                     end_at = ?5, location = ?6, attendees_json = ?7, updated_at = ?8
                     WHERE id = ?1",
                    params![
                        event.id.to_string(),
                        event.title,
                        event.description,
                        event.start_at.to_rfc3339(),
                        event.end_at.to_rfc3339(),
                        event.location,
                        attendees_json,
                        event.updated_at.to_rfc3339(),
                    ],
                )
                .map_err(storage_err)?;

            if changed == 0 {
                return Err(OttoError::NotFound("calendar event", event.id));
            }
            Ok(())
        })
    }

    async fn delete_event(&self, id: Uuid) -> OttoResult<bool> {
        self.with_conn(|conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM calendar_events WHERE id = ?1",
                    params![id.to_string()],
                )
                .map_err(storage_err)?;
            Ok(deleted > 0)
        })
    }

    async fn list_events(
        &self,
        filter: &EventFilter,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<CalendarEvent>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {EVENT_COLUMNS} FROM calendar_events");
            let mut clauses: Vec<&str> = Vec::new();
            let mut bind: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(start_after) = filter.start_after {
                clauses.push("start_at >= ?");
                bind.push(Box::new(start_after.to_rfc3339()));
            }
            if let Some(end_before) = filter.end_before {
                clauses.push("end_at <= ?");
                bind.push(Box::new(end_before.to_rfc3339()));
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY start_at ASC LIMIT ? OFFSET ?");
            bind.push(Box::new(limit as i64));
            bind.push(Box::new(offset as i64));

            let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params_from_iter(bind.iter()), row_to_event)
                .map_err(storage_err)?;

            let mut events = Vec::new();
            for row in rows {
                events.push(row.map_err(storage_err)?);
            }
            Ok(events)
        })
    }
}

// ---------------------------------------------------------------------------
// EmailStore
// ---------------------------------------------------------------------------

#[async_trait]
impl EmailStore for SqliteStore {
    async fn insert_email(&self, email: &EmailMessage) -> OttoResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO email_messages (id, subject, sender, recipient, body,
                 is_read, is_important, received_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    email.id.to_string(),
                    email.subject,
                    email.sender,
                    email.recipient,
                    email.body,
                    email.is_read,
                    email.is_important,
                    email.received_at.to_rfc3339(),
                    email.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert email failed: {e}")))?;
            Ok(())
        })
    }

    async fn get_email(&self, id: Uuid) -> OttoResult<Option<EmailMessage>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {EMAIL_COLUMNS} FROM email_messages WHERE id = ?1"),
                params![id.to_string()],
                row_to_email,
            )
            .optional()
            .map_err(storage_err)
        })
    }

    async fn update_email(&self, email: &EmailMessage) -> OttoResult<()> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE email_messages SET subject = ?2, body = ?3, is_read = ?4,
                     is_important = ?5 WHERE id = ?1",
                    params![
                        email.id.to_string(),
                        email.subject,
                        email.body,
                        email.is_read,
                        email.is_important,
                    ],
                )
                .map_err(storage_err)?;

            if changed == 0 {
                return Err(OttoError::NotFound("email message", email.id));
            }
            Ok(())
        })
    }

    async fn delete_email(&self, id: Uuid) -> OttoResult<bool> {
        self.with_conn(|conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM email_messages WHERE id = ?1",
                    params![id.to_string()],
                )
                .map_err(storage_err)?;
            Ok(deleted > 0)
        })
    }

    async fn list_emails(
        &self,
        filter: &EmailFilter,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<EmailMessage>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {EMAIL_COLUMNS} FROM email_messages");
            let mut clauses: Vec<&str> = Vec::new();
            let mut bind: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(is_read) = filter.is_read {
                clauses.push("is_read = ?");
                bind.push(Box::new(is_read));
            }
            if let Some(is_important) = filter.is_important {
                clauses.push("is_important = ?");
                bind.push(Box::new(is_important));
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY received_at DESC LIMIT ? OFFSET ?");
            bind.push(Box::new(limit as i64));
            bind.push(Box::new(offset as i64));

            let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params_from_iter(bind.iter()), row_to_email)
                .map_err(storage_err)?;

            let mut emails = Vec::new();
            for row in rows {
                emails.push(row.map_err(storage_err)?);
            }
            Ok(emails)
        })
    }
}

// ---------------------------------------------------------------------------
// MessageStore
// ---------------------------------------------------------------------------

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert_message(&self, message: &ChatMessage) -> OttoResult<()> {
        let metadata_json = message
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (id, role, content, session_id, metadata_json,
                 model_used, processing_ms, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    message.id.to_string(),
                    message.role.as_str(),
                    message.content,
                    message.session_id,
                    metadata_json,
                    message.model_used,
                    message.processing_ms.map(|v| v as i64),
                    message.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert message failed: {e}")))?;
            Ok(())
        })
    }

    async fn list_messages(
        &self,
        session_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> OttoResult<Vec<ChatMessage>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {MESSAGE_COLUMNS} FROM chat_messages");
            let mut bind: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(session) = session_id {
                sql.push_str(" WHERE session_id = ?");
                bind.push(Box::new(session.to_string()));
            }
            sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
            bind.push(Box::new(limit as i64));
            bind.push(Box::new(offset as i64));

            let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params_from_iter(bind.iter()), row_to_chat_message)
                .map_err(storage_err)?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row.map_err(storage_err)?);
            }
            Ok(messages)
        })
    }

    async fn count_messages(&self, session_id: Option<&str>) -> OttoResult<usize> {
        self.with_conn(|conn| {
            let count: i64 = match session_id {
                Some(session) => conn
                    .query_row(
                        "SELECT COUNT(*) FROM chat_messages WHERE session_id = ?1",
                        params![session],
                        |row| row.get(0),
                    )
                    .map_err(storage_err)?,
                None => conn
                    .query_row("SELECT COUNT(*) FROM chat_messages", [], |row| row.get(0))
                    .map_err(storage_err)?,
            };
            Ok(count as usize)
        })
    }

    async fn session_context(
        &self,
        session_id: &str,
        limit: usize,
    ) -> OttoResult<Vec<ChatMessage>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {MESSAGE_COLUMNS} FROM chat_messages
                     WHERE session_id = ?1 ORDER BY created_at DESC LIMIT ?2"
                ))
                .map_err(storage_err)?;
            let rows = stmt
                .query_map(params![session_id, limit as i64], row_to_chat_message)
                .map_err(storage_err)?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row.map_err(storage_err)?);
            }
            // Fetched newest-first; the assistant wants chronological order.
            messages.reverse();
            Ok(messages)
        })
    }

    async fn clear_session(&self, session_id: &str) -> OttoResult<usize> {
        self.with_conn(|conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM chat_messages WHERE session_id = ?1",
                    params![session_id],
                )
                .map_err(storage_err)?;
            Ok(deleted)
        })
    }
}

// ---------------------------------------------------------------------------
// SuggestionStore
// ---------------------------------------------------------------------------

#[async_trait]
impl SuggestionStore for SqliteStore {
    async fn insert_suggestion(&self, suggestion: &Suggestion) -> OttoResult<()> {
        let action_data_json = suggestion
            .action_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO suggestions (id, title, description, action_type, action_data_json,
                 priority, is_dismissed, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    suggestion.id.to_string(),
                    suggestion.title,
                    suggestion.description,
                    suggestion.action_type.as_str(),
                    action_data_json,
                    suggestion.priority.as_str(),
                    suggestion.is_dismissed,
                    suggestion.created_at.to_rfc3339(),
                    suggestion.expires_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert suggestion failed: {e}")))?;
            Ok(())
        })
    }

    async fn get_suggestion(&self, id: Uuid) -> OttoResult<Option<Suggestion>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {SUGGESTION_COLUMNS} FROM suggestions WHERE id = ?1"),
                params![id.to_string()],
                row_to_suggestion,
            )
            .optional()
            .map_err(storage_err)
        })
    }

    async fn list_suggestions(
        &self,
        kind: Option<SuggestionKind>,
        include_dismissed: bool,
        limit: usize,
    ) -> OttoResult<Vec<Suggestion>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {SUGGESTION_COLUMNS} FROM suggestions");
            let mut clauses: Vec<&str> = Vec::new();
            let mut bind: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(kind) = kind {
                clauses.push("action_type = ?");
                bind.push(Box::new(kind.as_str()));
            }
            if !include_dismissed {
                clauses.push("is_dismissed = 0");
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY created_at DESC LIMIT ?");
            bind.push(Box::new(limit as i64));

            let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params_from_iter(bind.iter()), row_to_suggestion)
                .map_err(storage_err)?;

            let mut suggestions = Vec::new();
            for row in rows {
                suggestions.push(row.map_err(storage_err)?);
            }
            Ok(suggestions)
        })
    }

    async fn dismiss_suggestion(&self, id: Uuid) -> OttoResult<bool> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE suggestions SET is_dismissed = 1 WHERE id = ?1",
                    params![id.to_string()],
                )
                .map_err(storage_err)?;
            Ok(changed > 0)
        })
    }

    async fn count_suggestions(&self, include_dismissed: bool) -> OttoResult<usize> {
        self.with_conn(|conn| {
            let sql = if include_dismissed {
                "SELECT COUNT(*) FROM suggestions"
            } else {
                "SELECT COUNT(*) FROM suggestions WHERE is_dismissed = 0"
            };
            let count: i64 = conn.query_row(sql, [], |row| row.get(0)).map_err(storage_err)?;
            Ok(count as usize)
        })
    }
}

// ---------------------------------------------------------------------------
// NotificationStore
// ---------------------------------------------------------------------------

#[async_trait]
impl NotificationStore for SqliteStore {
    async fn insert_notification(&self, notification: &Notification) -> OttoResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, kind, title, message, status, scheduled_for,
                 created_at, sent_at, read_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    notification.id.to_string(),
                    notification.kind.as_str(),
                    notification.title,
                    notification.message,
                    notification.status.as_str(),
                    notification.scheduled_for.map(|dt| dt.to_rfc3339()),
                    notification.created_at.to_rfc3339(),
                    notification.sent_at.map(|dt| dt.to_rfc3339()),
                    notification.read_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert notification failed: {e}")))?;
            Ok(())
        })
    }

    async fn list_notifications(
        &self,
        status: Option<NotificationStatus>,
        limit: usize,
    ) -> OttoResult<Vec<Notification>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications");
            let mut bind: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(status) = status {
                sql.push_str(" WHERE status = ?");
                bind.push(Box::new(status.as_str()));
            }
            sql.push_str(" ORDER BY created_at DESC LIMIT ?");
            bind.push(Box::new(limit as i64));

            let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params_from_iter(bind.iter()), row_to_notification)
                .map_err(storage_err)?;

            let mut notifications = Vec::new();
            for row in rows {
                notifications.push(row.map_err(storage_err)?);
            }
            Ok(notifications)
        })
    }

    async fn mark_notification_read(&self, id: Uuid) -> OttoResult<bool> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE notifications SET status = 'read', read_at = ?2 WHERE id = ?1",
                    params![id.to_string(), Utc::now().to_rfc3339()],
                )
                .map_err(storage_err)?;
            Ok(changed > 0)
        })
    }

    async fn insert_subscription(&self, subscription: &PushSubscription) -> OttoResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO push_subscriptions (id, endpoint, keys_json, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    subscription.id.to_string(),
                    subscription.endpoint,
                    subscription.keys,
                    subscription.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert subscription failed: {e}")))?;
            Ok(())
        })
    }

    async fn list_subscriptions(&self) -> OttoResult<Vec<PushSubscription>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, endpoint, keys_json, created_at FROM push_subscriptions
                     ORDER BY created_at DESC",
                )
                .map_err(storage_err)?;
            let rows = stmt
                .query_map([], row_to_subscription)
                .map_err(storage_err)?;

            let mut subscriptions = Vec::new();
            for row in rows {
                subscriptions.push(row.map_err(storage_err)?);
            }
            Ok(subscriptions)
        })
    }

    async fn delete_subscription(&self, id: Uuid) -> OttoResult<bool> {
        self.with_conn(|conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM push_subscriptions WHERE id = ?1",
                    params![id.to_string()],
                )
                .map_err(storage_err)?;
            Ok(deleted > 0)
        })
    }
}

// ---------------------------------------------------------------------------
// UserStore
// ---------------------------------------------------------------------------

#[async_trait]
impl UserStore for SqliteStore {
    async fn ensure_user(&self, email: &str, full_name: &str) -> OttoResult<User> {
        self.with_conn(|conn| {
            let existing = conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                    params![email],
                    row_to_user,
                )
                .optional()
                .map_err(storage_err)?;

            if let Some(user) = existing {
                return Ok(user);
            }

            let user = User::new(email).with_name(full_name);
            conn.execute(
                "INSERT INTO users (id, email, full_name, is_active, theme,
                 notifications_enabled, preferences_json, google_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    user.id.to_string(),
                    user.email,
                    user.full_name,
                    user.is_active,
                    user.theme,
                    user.notifications_enabled,
                    user.preferences.to_string(),
                    user.google_id,
                    user.created_at.to_rfc3339(),
                    user.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("insert user failed: {e}")))?;

            Ok(user)
        })
    }

    async fn get_user(&self, id: Uuid) -> OttoResult<Option<User>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
                row_to_user,
            )
            .optional()
            .map_err(storage_err)
        })
    }

    async fn get_user_by_email(&self, email: &str) -> OttoResult<Option<User>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()
            .map_err(storage_err)
        })
    }

    async fn upsert_google_token(&self, token: &GoogleToken) -> OttoResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO google_tokens (id, user_id, access_token, refresh_token, token_type,
                 expires_at, scope, calendar_enabled, gmail_enabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(user_id) DO UPDATE SET
                    access_token = excluded.access_token,
                    refresh_token = excluded.refresh_token,
                    token_type = excluded.token_type,
                    expires_at = excluded.expires_at,
                    scope = excluded.scope,
                    calendar_enabled = excluded.calendar_enabled,
                    gmail_enabled = excluded.gmail_enabled,
                    updated_at = excluded.updated_at",
                params![
                    token.id.to_string(),
                    token.user_id.to_string(),
                    token.access_token,
                    token.refresh_token,
                    token.token_type,
                    token.expires_at.map(|dt| dt.to_rfc3339()),
                    token.scope,
                    token.calendar_enabled,
                    token.gmail_enabled,
                    token.created_at.to_rfc3339(),
                    token.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| OttoError::Storage(format!("upsert google token failed: {e}")))?;
            Ok(())
        })
    }

    async fn get_google_token(&self, user_id: Uuid) -> OttoResult<Option<GoogleToken>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {GOOGLE_TOKEN_COLUMNS} FROM google_tokens WHERE user_id = ?1"),
                params![user_id.to_string()],
                row_to_google_token,
            )
            .optional()
            .map_err(storage_err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("in-memory store")
    }

    #[tokio::test]
    async fn task_crud_round_trip() {
        let store = store();
        let task = Task::new("write report")
            .with_description("quarterly numbers")
            .with_priority(TaskPriority::High)
            .with_tags(vec!["work".into(), "reports".into()]);

        store.insert_task(&task).await.unwrap();

        let fetched = store.get_task(task.id).await.unwrap().expect("task exists");
        assert_eq!(fetched.title, "write report");
        assert_eq!(fetched.priority, TaskPriority::High);
        assert_eq!(fetched.tags, vec!["reports".to_string(), "work".to_string()]);

        let mut updated = fetched.clone();
        updated.apply(TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        });
        store.update_task(&updated).await.unwrap();

        let fetched = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TaskStatus::Completed);
        assert!(fetched.completed_at.is_some());

        assert!(store.delete_task(task.id).await.unwrap());
        assert!(store.get_task(task.id).await.unwrap().is_none());
        assert!(!store.delete_task(task.id).await.unwrap());
    }

    #[tokio::test]
    async fn task_list_filters_by_status_and_priority() {
        let store = store();
        store.insert_task(&Task::new("a")).await.unwrap();
        store
            .insert_task(&Task::new("b").with_priority(TaskPriority::Urgent))
            .await
            .unwrap();

        let mut done = Task::new("c");
        done.apply(TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        });
        store.insert_task(&done).await.unwrap();

        let filter = TaskFilter {
            status: Some(TaskStatus::Todo),
            ..Default::default()
        };
        let todos = store.list_tasks(&filter, 50, 0).await.unwrap();
        assert_eq!(todos.len(), 2);

        let filter = TaskFilter {
            priority: Some(TaskPriority::Urgent),
            ..Default::default()
        };
        let urgent = store.list_tasks(&filter, 50, 0).await.unwrap();
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].title, "b");

        let open = store.open_tasks(5).await.unwrap();
        assert_eq!(open.len(), 2);
    }

    #[tokio::test]
    async fn event_crud_and_window_filter() {
        let store = store();
        let now = Utc::now();
        let event = CalendarEvent::new("standup", now + Duration::hours(1), now + Duration::hours(2))
            .with_location("Conference Room A")
            .with_attendees(vec!["user@example.com".into()]);

        store.insert_event(&event).await.unwrap();

        let fetched = store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(fetched.attendees, vec!["user@example.com".to_string()]);

        let filter = EventFilter {
            start_after: Some(now),
            end_before: Some(now + Duration::hours(3)),
        };
        assert_eq!(store.list_events(&filter, 50, 0).await.unwrap().len(), 1);

        let filter = EventFilter {
            start_after: Some(now + Duration::days(1)),
            end_before: None,
        };
        assert!(store.list_events(&filter, 50, 0).await.unwrap().is_empty());

        assert!(store.delete_event(event.id).await.unwrap());
    }

    #[tokio::test]
    async fn email_flags_persist() {
        let store = store();
        let email = EmailMessage::new(
            "Welcome",
            "noreply@aiassistant.com",
            "demo@example.com",
            "Thanks for signing up.",
            Utc::now(),
        );
        store.insert_email(&email).await.unwrap();

        let mut fetched = store.get_email(email.id).await.unwrap().unwrap();
        assert!(!fetched.is_read);
        fetched.apply(EmailUpdate {
            is_read: Some(true),
            is_important: Some(true),
            ..Default::default()
        });
        store.update_email(&fetched).await.unwrap();

        let fetched = store.get_email(email.id).await.unwrap().unwrap();
        assert!(fetched.is_read);
        assert!(fetched.is_important);

        let unread = store
            .list_emails(
                &EmailFilter {
                    is_read: Some(false),
                    is_important: None,
                },
                50,
                0,
            )
            .await
            .unwrap();
        assert!(unread.is_empty());
    }

    #[tokio::test]
    async fn session_context_is_chronological_and_scoped() {
        let store = store();
        for i in 0..4 {
            store
                .insert_message(
                    &ChatMessage::new(MessageRole::User, format!("msg {i}"))
                        .with_session("session-a"),
                )
                .await
                .unwrap();
        }
        store
            .insert_message(&ChatMessage::new(MessageRole::User, "other").with_session("session-b"))
            .await
            .unwrap();

        let context = store.session_context("session-a", 3).await.unwrap();
        assert_eq!(context.len(), 3);
        assert_eq!(context[0].content, "msg 1");
        assert_eq!(context[2].content, "msg 3");

        assert_eq!(store.count_messages(Some("session-a")).await.unwrap(), 4);
        assert_eq!(store.count_messages(None).await.unwrap(), 5);

        assert_eq!(store.clear_session("session-a").await.unwrap(), 4);
        assert_eq!(store.count_messages(Some("session-a")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn suggestion_dismiss_hides_from_default_listing() {
        let store = store();
        let suggestion = Suggestion::new("Review quarterly reports", SuggestionKind::Task)
            .with_priority(TaskPriority::High);
        store.insert_suggestion(&suggestion).await.unwrap();

        assert_eq!(
            store.list_suggestions(None, false, 10).await.unwrap().len(),
            1
        );
        assert!(store.dismiss_suggestion(suggestion.id).await.unwrap());
        assert!(store.list_suggestions(None, false, 10).await.unwrap().is_empty());
        assert_eq!(
            store.list_suggestions(None, true, 10).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn notification_lifecycle() {
        let store = store();
        let notification = Notification::new(
            NotificationKind::TaskReminder,
            "Task due soon",
            "Backup database is due in 6 hours",
        );
        store.insert_notification(&notification).await.unwrap();

        let pending = store
            .list_notifications(Some(NotificationStatus::Pending), 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        assert!(store.mark_notification_read(notification.id).await.unwrap());
        let read = store
            .list_notifications(Some(NotificationStatus::Read), 10)
            .await
            .unwrap();
        assert_eq!(read.len(), 1);
        assert!(read[0].read_at.is_some());

        let subscription = PushSubscription::new(
            "https://push.example.com/sub/1",
            r#"{"p256dh":"k","auth":"a"}"#,
        );
        store.insert_subscription(&subscription).await.unwrap();
        assert_eq!(store.list_subscriptions().await.unwrap().len(), 1);
        assert!(store.delete_subscription(subscription.id).await.unwrap());
        assert!(store.list_subscriptions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ensure_user_is_idempotent_and_token_upserts() {
        let store = store();
        let user = store.ensure_user("demo@example.com", "Demo User").await.unwrap();
        let again = store.ensure_user("demo@example.com", "Demo User").await.unwrap();
        assert_eq!(user.id, again.id);

        let by_id = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "demo@example.com");
        let by_email = store.get_user_by_email("demo@example.com").await.unwrap();
        assert!(by_email.is_some());
        assert!(store.get_user_by_email("nobody@example.com").await.unwrap().is_none());

        let token = GoogleToken::new(user.id, "token-one");
        store.upsert_google_token(&token).await.unwrap();
        let mut replacement = GoogleToken::new(user.id, "token-two");
        replacement.calendar_enabled = true;
        store.upsert_google_token(&replacement).await.unwrap();

        let stored = store.get_google_token(user.id).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "token-two");
        assert!(stored.calendar_enabled);
    }
}
