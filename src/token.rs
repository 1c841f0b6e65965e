use crate::error::TokenStoreError;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn user_id(&self) -> Option<String>;
    fn save_token(&self, token: &str) -> Result<(), TokenStoreError>;
    fn save_user_id(&self, user_id: &str) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Session>,
}

impl MemoryTokenStore {
    pub fn new() -> MemoryTokenStore {
        MemoryTokenStore::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        lock(&self.session).token.clone()
    }

    fn user_id(&self) -> Option<String> {
        lock(&self.session).user_id.clone()
    }

    fn save_token(&self, token: &str) -> Result<(), TokenStoreError> {
        lock(&self.session).token = Some(token.to_string());
        Ok(())
    }

    fn save_user_id(&self, user_id: &str) -> Result<(), TokenStoreError> {
        lock(&self.session).user_id = Some(user_id.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *lock(&self.session) = Session::default();
        Ok(())
    }
}

/// Keeps the session in a RON file. The file is read once on construction
/// and rewritten on every change.
pub struct FileTokenStore {
    path: PathBuf,
    session: Mutex<Session>,
}

impl FileTokenStore {
    pub fn new(config: &Config) -> FileTokenStore {
        let session = match read_session(&config.path) {
            Ok(session) => session,
            Err(err) => {
                warn!(
                    "Ignoring unreadable session file {}: {}",
                    config.path.display(),
                    err
                );
                Session::default()
            }
        };

        debug!(
            "Constructing file token store at {}, session present: {}.",
            config.path.display(),
            session.token.is_some()
        );

        FileTokenStore {
            path: config.path.clone(),
            session: Mutex::new(session),
        }
    }

    fn update<F: FnOnce(&mut Session)>(&self, change: F) -> Result<(), TokenStoreError> {
        let mut session = lock(&self.session);
        change(&mut session);
        write_session(&self.path, &session)
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        lock(&self.session).token.clone()
    }

    fn user_id(&self) -> Option<String> {
        lock(&self.session).user_id.clone()
    }

    fn save_token(&self, token: &str) -> Result<(), TokenStoreError> {
        self.update(|session| session.token = Some(token.to_string()))
    }

    fn save_user_id(&self, user_id: &str) -> Result<(), TokenStoreError> {
        self.update(|session| session.user_id = Some(user_id.to_string()))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *lock(&self.session) = Session::default();

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        info!("Cleared session at {}.", self.path.display());

        Ok(())
    }
}

fn lock(session: &Mutex<Session>) -> std::sync::MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read_session(path: &Path) -> Result<Session, TokenStoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Session::default()),
        Err(err) => return Err(err.into()),
    };

    Ok(ron::de::from_str(&contents)?)
}

fn write_session(path: &Path, session: &Session) -> Result<(), TokenStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let serialised = ron::ser::to_string_pretty(session, ron::ser::PrettyConfig::default())?;
    fs::write(path, serialised)?;

    debug!("Wrote session to {}.", path.display());

    Ok(())
}
