//! Account registry and the active-session record.

use crate::{
    domain::account::{Account, SessionUser},
    infra::kv::{self, KeyValueStore},
};

/// Store key holding the registered-accounts collection.
const ACCOUNTS_KEY: &str = "users";
/// Store key holding the active session's public view.
const SESSION_KEY: &str = "user";

/// Rejection of a session operation, surfaced to the shell with a
/// displayable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Registration with a username that is already taken (exact,
    /// case-sensitive match).
    DuplicateUsername,
    /// Sign-in where no account matches both username and password.
    InvalidCredentials,
    /// A profile operation while signed out.
    NoActiveSession,
    /// The session points at an account id missing from the registry — a
    /// consistency fault, not an expected path.
    AccountNotFound,
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::DuplicateUsername => "SESSION_DUPLICATE_USERNAME",
            SessionError::InvalidCredentials => "SESSION_INVALID_CREDENTIALS",
            SessionError::NoActiveSession => "SESSION_NOT_SIGNED_IN",
            SessionError::AccountNotFound => "SESSION_ACCOUNT_MISSING",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::DuplicateUsername => "That username is already taken.",
            SessionError::InvalidCredentials => "Username or password is incorrect.",
            SessionError::NoActiveSession => "Sign in to continue.",
            SessionError::AccountNotFound => "Your account record could not be found.",
        }
    }
}

/// Fields a profile update may change; unset fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub profile_picture: Option<String>,
}

/// Owns the in-memory active session and mediates every read and write of
/// the accounts collection. The collection itself lives in the store and is
/// re-read before each mutation (read-modify-write), so operations observe
/// a total order equal to call order.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<SessionUser>,
}

impl SessionManager {
    /// Restores the persisted session, if any. Run once at process start.
    pub fn hydrate(store: &dyn KeyValueStore) -> Self {
        Self {
            current: kv::get_typed(store, SESSION_KEY),
        }
    }

    pub fn current(&self) -> Option<&SessionUser> {
        self.current.as_ref()
    }

    /// Registers a new account and signs it in. On `DuplicateUsername` the
    /// accounts collection is left unchanged.
    pub fn register(
        &mut self,
        store: &mut dyn KeyValueStore,
        username: &str,
        password: &str,
    ) -> Result<SessionUser, SessionError> {
        let mut accounts = load_accounts(store);
        if accounts.iter().any(|account| account.username == username) {
            return Err(SessionError::DuplicateUsername);
        }

        let account = Account::new(username, password);
        let view = account.session_view();
        accounts.push(account);
        kv::set_typed(store, ACCOUNTS_KEY, &accounts);

        self.activate(store, view.clone());
        tracing::info!(code = "SESSION_REGISTERED", username, "account created and signed in");
        Ok(view)
    }

    /// Signs in an existing account. Both fields must match exactly.
    pub fn login(
        &mut self,
        store: &mut dyn KeyValueStore,
        username: &str,
        password: &str,
    ) -> Result<SessionUser, SessionError> {
        let accounts = load_accounts(store);
        let account = accounts
            .iter()
            .find(|account| account.username == username && account.password == password)
            .ok_or(SessionError::InvalidCredentials)?;

        let view = account.session_view();
        self.activate(store, view.clone());
        tracing::info!(code = "SESSION_SIGNED_IN", username, "signed in");
        Ok(view)
    }

    /// Clears the persisted and in-memory session. Safe to call signed out.
    pub fn logout(&mut self, store: &mut dyn KeyValueStore) {
        store.remove(SESSION_KEY);
        self.current = None;
    }

    /// Merges `patch` into the signed-in account and into the session
    /// record, persisting both. Username uniqueness is only enforced at
    /// registration.
    pub fn update_profile(
        &mut self,
        store: &mut dyn KeyValueStore,
        patch: ProfilePatch,
    ) -> Result<SessionUser, SessionError> {
        let session = self.current.clone().ok_or(SessionError::NoActiveSession)?;

        let mut accounts = load_accounts(store);
        let account = accounts
            .iter_mut()
            .find(|account| account.id == session.id)
            .ok_or(SessionError::AccountNotFound)?;

        if let Some(username) = patch.username {
            account.username = username;
        }
        if let Some(profile_picture) = patch.profile_picture {
            account.profile_picture = profile_picture;
        }

        let view = account.session_view();
        kv::set_typed(store, ACCOUNTS_KEY, &accounts);
        self.activate(store, view.clone());
        Ok(view)
    }

    /// Every registered account except the signed-in one, as public views.
    /// Empty while signed out.
    pub fn peers(&self, store: &dyn KeyValueStore) -> Vec<SessionUser> {
        let Some(session) = &self.current else {
            return Vec::new();
        };

        load_accounts(store)
            .iter()
            .filter(|account| account.id != session.id)
            .map(Account::session_view)
            .collect()
    }

    fn activate(&mut self, store: &mut dyn KeyValueStore, view: SessionUser) {
        kv::set_typed(store, SESSION_KEY, &view);
        self.current = Some(view);
    }
}

fn load_accounts(store: &dyn KeyValueStore) -> Vec<Account> {
    kv::get_typed(store, ACCOUNTS_KEY).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infra::kv::MemoryStore;

    #[test]
    fn register_signs_in_and_persists_account_and_session() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();

        let view = sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");

        assert_eq!(view.username, "alice");
        assert_eq!(sessions.current().map(|user| user.username.as_str()), Some("alice"));

        let accounts: Vec<Account> =
            kv::get_typed(&store, ACCOUNTS_KEY).expect("accounts should be persisted");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, view.id);

        let persisted: SessionUser =
            kv::get_typed(&store, SESSION_KEY).expect("session should be persisted");
        assert_eq!(persisted, view);
    }

    #[test]
    fn register_rejects_a_taken_username_and_changes_nothing() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("first registration should succeed");

        let before = store.get(ACCOUNTS_KEY);
        let result = sessions.register(&mut store, "alice", "p2");

        assert_eq!(result, Err(SessionError::DuplicateUsername));
        assert_eq!(store.get(ACCOUNTS_KEY), before);
    }

    #[test]
    fn username_collision_check_is_case_sensitive() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");

        let result = sessions.register(&mut store, "Alice", "p2");

        assert!(result.is_ok());
    }

    #[test]
    fn login_requires_both_fields_to_match() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");
        sessions.logout(&mut store);

        assert_eq!(
            sessions.login(&mut store, "alice", "wrong"),
            Err(SessionError::InvalidCredentials)
        );
        assert_eq!(
            sessions.login(&mut store, "bob", "p1"),
            Err(SessionError::InvalidCredentials)
        );
        assert!(sessions.current().is_none());

        let view = sessions
            .login(&mut store, "alice", "p1")
            .expect("sign-in should succeed");
        assert_eq!(view.username, "alice");
        assert!(kv::get_typed::<SessionUser>(&store, SESSION_KEY).is_some());
    }

    #[test]
    fn logout_is_idempotent() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");

        sessions.logout(&mut store);
        sessions.logout(&mut store);

        assert!(sessions.current().is_none());
        assert_eq!(store.get(SESSION_KEY), None);
    }

    #[test]
    fn hydrate_restores_the_persisted_session() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        let view = sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");

        let rehydrated = SessionManager::hydrate(&store);

        assert_eq!(rehydrated.current(), Some(&view));
    }

    #[test]
    fn hydrate_treats_a_corrupt_session_record_as_signed_out() {
        let mut store = MemoryStore::default();
        store.set(SESSION_KEY, json!(42));

        let sessions = SessionManager::hydrate(&store);

        assert!(sessions.current().is_none());
    }

    #[test]
    fn update_profile_requires_an_active_session() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();

        let result = sessions.update_profile(&mut store, ProfilePatch::default());

        assert_eq!(result, Err(SessionError::NoActiveSession));
    }

    #[test]
    fn update_profile_reports_a_missing_account_record() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");
        store.set(ACCOUNTS_KEY, json!([]));

        let result = sessions.update_profile(&mut store, ProfilePatch::default());

        assert_eq!(result, Err(SessionError::AccountNotFound));
    }

    #[test]
    fn update_profile_merges_into_account_and_session() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        let view = sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");

        let updated = sessions
            .update_profile(
                &mut store,
                ProfilePatch {
                    username: Some("alice2".to_owned()),
                    profile_picture: Some("data:image/png;base64,AAAA".to_owned()),
                },
            )
            .expect("update should succeed");

        assert_eq!(updated.id, view.id);
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.profile_picture, "data:image/png;base64,AAAA");

        let accounts: Vec<Account> =
            kv::get_typed(&store, ACCOUNTS_KEY).expect("accounts should be persisted");
        assert_eq!(accounts[0].username, "alice2");
        assert_eq!(accounts[0].password, "p1");

        let persisted: SessionUser =
            kv::get_typed(&store, SESSION_KEY).expect("session should be persisted");
        assert_eq!(persisted, updated);
    }

    #[test]
    fn partial_patch_leaves_other_fields_untouched() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");
        sessions
            .update_profile(
                &mut store,
                ProfilePatch {
                    username: None,
                    profile_picture: Some("pic".to_owned()),
                },
            )
            .expect("update should succeed");

        let updated = sessions
            .update_profile(
                &mut store,
                ProfilePatch {
                    username: Some("alice2".to_owned()),
                    profile_picture: None,
                },
            )
            .expect("update should succeed");

        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.profile_picture, "pic");
    }

    #[test]
    fn profile_update_does_not_recheck_username_uniqueness() {
        // Deliberate: renaming onto a taken username is accepted, matching
        // the registry's registration-time-only enforcement.
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");
        sessions.logout(&mut store);
        sessions
            .register(&mut store, "bob", "p2")
            .expect("registration should succeed");

        let result = sessions.update_profile(
            &mut store,
            ProfilePatch {
                username: Some("alice".to_owned()),
                profile_picture: None,
            },
        );

        assert_eq!(result.map(|view| view.username), Ok("alice".to_owned()));
    }

    #[test]
    fn peers_lists_everyone_but_the_signed_in_account() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");
        sessions.logout(&mut store);
        sessions
            .register(&mut store, "bob", "p2")
            .expect("registration should succeed");

        let peers = sessions.peers(&store);

        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].username, "alice");
    }

    #[test]
    fn peers_is_empty_while_signed_out() {
        let mut store = MemoryStore::default();
        let mut sessions = SessionManager::default();
        sessions
            .register(&mut store, "alice", "p1")
            .expect("registration should succeed");
        sessions.logout(&mut store);

        assert!(sessions.peers(&store).is_empty());
    }

    #[test]
    fn corrupt_accounts_value_reads_as_an_empty_registry() {
        let mut store = MemoryStore::default();
        store.set(ACCOUNTS_KEY, json!("not-a-list"));
        let mut sessions = SessionManager::default();

        let result = sessions.register(&mut store, "alice", "p1");

        assert!(result.is_ok());
    }
}
