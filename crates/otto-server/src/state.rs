use std::path::PathBuf;
use std::sync::Arc;

use otto_core::{OttoResult, User, UserStore};
use otto_engine::actions::ActionExecutor;
use otto_engine::assistant::Assistant;
use otto_engine::config::AppConfig;
use otto_engine::llm::init_llm_provider;
use otto_engine::services::{CalendarService, EmailService, SearchService, TaskService};
use otto_storage::SqliteStore;

/// Single demo identity — the backend has no real authentication.
pub const DEMO_USER_EMAIL: &str = "demo@example.com";
pub const DEMO_USER_NAME: &str = "Demo User";

/// Shared application state.
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub assistant: Arc<Assistant>,
    pub executor: Arc<ActionExecutor>,
    pub tasks: Arc<TaskService>,
    pub calendar: Arc<CalendarService>,
    pub email: Arc<EmailService>,
    pub search: Arc<SearchService>,
    pub config: AppConfig,
}

impl AppState {
    /// Open (or create) the database under the configured data dir and
    /// wire up the engine.
    pub fn new(config: AppConfig) -> OttoResult<Self> {
        let db_path = PathBuf::from(&config.data_dir).join("otto.db");
        let store = Arc::new(SqliteStore::open(&db_path)?);
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<SqliteStore>, config: AppConfig) -> Self {
        let llm = init_llm_provider(&config.llm);
        let search = Arc::new(SearchService::new(config.search.clone()));
        let tasks = Arc::new(TaskService::new(Arc::clone(&store)));
        let calendar = Arc::new(CalendarService::new(Arc::clone(&store)));
        let email = Arc::new(EmailService::new(Arc::clone(&store), config.smtp.clone()));
        let executor = Arc::new(ActionExecutor::new(
            Arc::clone(&store),
            Arc::clone(&tasks),
            Arc::clone(&calendar),
            Arc::clone(&email),
        ));
        let assistant = Arc::new(Assistant::new(
            Arc::clone(&store),
            llm,
            Arc::clone(&search),
            config.assistant.clone(),
        ));

        Self {
            store,
            assistant,
            executor,
            tasks,
            calendar,
            email,
            search,
            config,
        }
    }

    /// The demo user row, created on first access.
    pub async fn demo_user(&self) -> OttoResult<User> {
        self.store.ensure_user(DEMO_USER_EMAIL, DEMO_USER_NAME).await
    }
}
