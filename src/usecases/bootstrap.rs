use std::path::Path;

use crate::{
    infra::{self, config, error::AppError, kv::JsonFileStore, storage_layout::StorageLayout},
    store::session::SessionManager,
    usecases::context::AppContext,
};

/// Builds the application context and initializes logging.
pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config = config::load(config_path)?;
    infra::logging::init(&config.logging)?;

    build_context(config)
}

fn build_context(config: config::AppConfig) -> Result<AppContext, AppError> {
    let layout = StorageLayout::resolve(config.storage.data_dir.as_deref())?;
    layout.ensure_dirs()?;

    let store = JsonFileStore::open(&layout.store_file(), &layout.store_lock_file())?;
    let session = SessionManager::hydrate(&store);

    Ok(AppContext::new(config, store, session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::{AppConfig, StorageConfig};

    #[test]
    fn builds_a_context_with_an_empty_store_and_no_session() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let config = AppConfig {
            storage: StorageConfig {
                data_dir: Some(dir.path().join("data")),
            },
            ..AppConfig::default()
        };

        let context = build_context(config).expect("context should build");

        assert!(context.session.current().is_none());
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn rehydrates_the_session_written_by_a_previous_context() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let config = AppConfig {
            storage: StorageConfig {
                data_dir: Some(dir.path().join("data")),
            },
            ..AppConfig::default()
        };

        {
            let mut context = build_context(config.clone()).expect("context should build");
            context
                .session
                .register(&mut context.store, "alice", "p1")
                .expect("registration should succeed");
        }

        let context = build_context(config).expect("context should rebuild");
        assert_eq!(
            context.session.current().map(|user| user.username.as_str()),
            Some("alice")
        );
    }
}
