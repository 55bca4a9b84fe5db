use contracts::system::auth::Session;
use web_sys::window;

const CREDENTIAL_KEY: &str = "siem_auth_token";
const USERNAME_KEY: &str = "siem_username";

/// Where the session lives between page loads.
pub trait SessionStore {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Session kept in the browser's localStorage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageSession;

impl SessionStore for LocalStorageSession {
    fn load(&self) -> Option<Session> {
        let storage = get_local_storage()?;
        let credential = storage.get_item(CREDENTIAL_KEY).ok()??;
        let username = storage.get_item(USERNAME_KEY).ok()??;
        if credential.is_empty() || username.is_empty() {
            return None;
        }
        Some(Session {
            credential,
            username,
        })
    }

    fn save(&self, session: &Session) {
        if let Some(storage) = get_local_storage() {
            let _ = storage.set_item(CREDENTIAL_KEY, &session.credential);
            let _ = storage.set_item(USERNAME_KEY, &session.username);
        }
    }

    fn clear(&self) {
        if let Some(storage) = get_local_storage() {
            let _ = storage.remove_item(CREDENTIAL_KEY);
            let _ = storage.remove_item(USERNAME_KEY);
        }
    }
}
