//! Client-held session identity.

use crate::utils::{generate_session_token, is_valid_session_token};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Opaque correlation token for upvotes and reports.
///
/// Unauthenticated and trivially forgeable. It only groups a browser
/// profile's actions; it never proves who anyone is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persistent storage for the one session key.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, token: &str) -> io::Result<()>;
}

/// Stores the token in a single file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, token)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> io::Result<Option<String>> {
        let token = self
            .token
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "session store poisoned"))?;
        Ok(token.clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "session store poisoned"))?;
        *slot = Some(token.to_string());
        Ok(())
    }
}

pub struct SessionIdentityProvider {
    store: Box<dyn SessionStore>,
}

impl SessionIdentityProvider {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::default())
    }

    /// Return the persisted token, creating and persisting one on first use.
    ///
    /// Never fails. If storage is unusable a fresh token is returned on every
    /// call, so "already upvoted" state is lost but nothing breaks.
    pub fn get_or_create_session_id(&self) -> SessionId {
        match self.store.load() {
            Ok(Some(token)) if is_valid_session_token(&token) => return SessionId(token),
            Ok(_) => {}
            Err(e) => tracing::warn!("Session storage unreadable, issuing a new id: {}", e),
        }

        let token = generate_session_token();
        if let Err(e) = self.store.save(&token) {
            tracing::warn!("Session storage unwritable, id will not persist: {}", e);
        }
        SessionId(token)
    }
}
