use crate::{infra::config::AppConfig, infra::kv::JsonFileStore, store::session::SessionManager};

/// Long-lived state shared by every command: the loaded config, the opened
/// store, and the hydrated session.
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: JsonFileStore,
    pub session: SessionManager,
}

impl AppContext {
    pub fn new(config: AppConfig, store: JsonFileStore, session: SessionManager) -> Self {
        Self {
            config,
            store,
            session,
        }
    }
}
