use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use log::{info, warn};

use crate::error::{PortalError, Result};
use crate::http::auth_middleware::TokenFn;
use crate::model::session::Session;

/// The signed-in user's session, shared with the auth middleware and
/// persisted as JSON so a restart keeps it.
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    pub fn load(path: &Path) -> Self {
        let session = if path.exists() {
            match File::open(path) {
                Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
                    Ok(session) => Some(session),
                    Err(err) => {
                        warn!("ignoring unreadable session file {}: {err}", path.display());
                        None
                    }
                },
                Err(err) => {
                    warn!("could not open session file {}: {err}", path.display());
                    None
                }
            }
        } else {
            None
        };

        Self {
            current: Arc::new(RwLock::new(session)),
            path: Some(path.to_path_buf()),
        }
    }

    pub fn in_memory(session: Option<Session>) -> Self {
        Self {
            current: Arc::new(RwLock::new(session)),
            path: None,
        }
    }

    /// The session if one exists and has not expired.
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|session| !session.is_expired())
    }

    pub fn token(&self) -> Result<String> {
        self.current()
            .map(|session| session.token)
            .ok_or(PortalError::Unauthenticated)
    }

    pub fn token_fn(&self) -> TokenFn {
        let store = self.clone();
        Arc::new(move || store.current().map(|session| session.token))
    }

    pub fn set(&self, session: Session) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &session)?;
            info!("session for {} saved", session.email);
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session(expires_in: i64) -> Session {
        Session {
            name: "Admin".into(),
            email: "admin@example.com".into(),
            role: Some("admin".into()),
            token: "tok".into(),
            expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
        }
    }

    #[test]
    fn expired_session_counts_as_missing() {
        let store = SessionStore::in_memory(Some(session(-5)));
        assert!(store.current().is_none());
        assert!(matches!(store.token(), Err(PortalError::Unauthenticated)));
        assert_eq!((store.token_fn())(), None);
    }

    #[test]
    fn session_survives_reload_and_clear_removes_file() {
        let path = std::env::temp_dir().join(format!(
            "campus-portal-session-{}.json",
            std::process::id()
        ));
        let store = SessionStore::load(&path);
        assert!(store.current().is_none());

        store.set(session(3600)).unwrap();
        let reloaded = SessionStore::load(&path);
        assert_eq!(reloaded.token().unwrap(), "tok");

        reloaded.clear().unwrap();
        assert!(!path.exists());
        assert!(reloaded.current().is_none());
    }
}
