// src/client/token.rs

use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::{
    error::AppError,
    utils::jwt::{is_expired, now_secs},
};

/// Holds the bearer token used for backend calls.
///
/// Kept in memory and, when a path is configured, mirrored to a file so a
/// login survives restarts.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    pub fn in_memory(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
            path: None,
        }
    }

    /// Opens a file-backed store. An explicit `initial` token wins over the file.
    pub fn open(initial: Option<String>, path: Option<PathBuf>) -> Result<Self, AppError> {
        let token = match (&initial, &path) {
            (Some(_), _) => initial,
            (None, Some(p)) => read_token_file(p)?,
            (None, None) => None,
        };
        Ok(Self {
            token: RwLock::new(token),
            path,
        })
    }

    /// The current token, if any and not expired. An expired JWT is dropped.
    pub fn get(&self) -> Option<String> {
        let current = self
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()?;

        if is_expired(&current, now_secs()) {
            tracing::info!("Stored token has expired, clearing it");
            self.clear();
            return None;
        }
        Some(current)
    }

    pub fn set(&self, token: String) -> Result<(), AppError> {
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, &token)?;
        }
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(())
    }

    /// Forgets the token. Removing the backing file is best effort.
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Some(path) = &self.path {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove token file {:?}: {}", path, e);
                }
            }
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

fn read_token_file(path: &Path) -> Result<Option<String>, AppError> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let token = raw.trim().to_string();
            Ok(if token.is_empty() { None } else { Some(token) })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::make_token;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("codeforge-token-{}", uuid::Uuid::new_v4()))
            .join("token")
    }

    #[test]
    fn set_persists_and_clear_removes() {
        let path = temp_path();
        let store = TokenStore::open(None, Some(path.clone())).unwrap();
        assert!(!store.is_set());

        store.set("abc".to_string()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "abc");

        let reopened = TokenStore::open(None, Some(path.clone())).unwrap();
        assert_eq!(reopened.get().as_deref(), Some("abc"));

        reopened.clear();
        assert!(!path.exists());
        assert_eq!(reopened.get(), None);
    }

    #[test]
    fn explicit_token_beats_file() {
        let path = temp_path();
        TokenStore::open(None, Some(path.clone()))
            .unwrap()
            .set("from-file".to_string())
            .unwrap();
        let store = TokenStore::open(Some("explicit".to_string()), Some(path)).unwrap();
        assert_eq!(store.get().as_deref(), Some("explicit"));
    }

    #[test]
    fn expired_jwt_is_cleared_on_read() {
        let store = TokenStore::in_memory(Some(make_token(1)));
        assert_eq!(store.get(), None);
        assert!(!store.is_set());

        let fresh = make_token(now_secs() + 3600);
        let store = TokenStore::in_memory(Some(fresh.clone()));
        assert_eq!(store.get(), Some(fresh));
    }
}
