//! JSON-file-backed user accounts, keyed by email.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("email, username and password are all required")]
    MissingFields,

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error("failed to save user store: {0}")]
    Persist(#[from] anyhow::Error),
}

/// A registered account as handed to callers; never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub username: String,
    pub created_at: String,
}

/// On-disk record, stored under the email key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    username: String,
    password_hash: String,
    created_at: String,
}

impl UserRecord {
    fn to_user(&self, email: &str) -> User {
        User {
            email: email.to_string(),
            username: self.username.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    users: BTreeMap<String, UserRecord>,
}

impl UserStore {
    /// Open the store at `path`. A missing, unreadable or corrupt file gives
    /// an empty store; the problem is logged, not returned.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let users = load_users(&path);
        Self { path, users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn register(
        &mut self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, RegistrationError> {
        let email = email.trim();
        let username = username.trim();

        if email.is_empty() || username.is_empty() || password.is_empty() {
            warn!("registration attempt with missing fields");
            return Err(RegistrationError::MissingFields);
        }

        if self.users.contains_key(email) {
            warn!(email, "registration attempt with existing email");
            return Err(RegistrationError::EmailTaken(email.to_string()));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            warn!(email, "registration attempt with weak password");
            return Err(RegistrationError::WeakPassword);
        }

        let record = UserRecord {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
        };
        let user = record.to_user(email);

        self.users.insert(email.to_string(), record);
        if let Err(e) = self.save() {
            self.users.remove(email);
            return Err(e.into());
        }

        info!(email, "new user registered");
        Ok(user)
    }

    /// The matching user, or `None` for missing credentials, an unknown email
    /// or a wrong password.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            warn!("authentication attempt with missing credentials");
            return None;
        }

        debug!(email, "authentication attempt");
        let Some(record) = self.users.get(email) else {
            warn!(email, "authentication failed: user not found");
            return None;
        };

        if verify_password(password, &record.password_hash) {
            info!(email, "successful authentication");
            Some(record.to_user(email))
        } else {
            warn!(email, "authentication failed: invalid password");
            None
        }
    }

    pub fn user_exists(&self, email: &str) -> bool {
        self.users.contains_key(email.trim())
    }

    pub fn get_user(&self, email: &str) -> Option<User> {
        let email = email.trim();
        self.users.get(email).map(|record| record.to_user(email))
    }

    fn save(&self) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create user store directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&self.users)
            .context("Failed to serialize user store to JSON")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write user store: {}", self.path.display()))?;

        debug!(path = %self.path.display(), users = self.users.len(), "user store saved");
        Ok(())
    }
}

fn load_users(path: &Path) -> BTreeMap<String, UserRecord> {
    if !path.exists() {
        info!(path = %path.display(), "user store does not exist yet, starting empty");
        return BTreeMap::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read user store");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(users) => {
            info!(path = %path.display(), "loaded user store");
            users
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to decode user store");
            BTreeMap::new()
        }
    }
}

fn hash_password(password: &str) -> Result<String, RegistrationError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RegistrationError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(error = %e, "stored password hash is not valid PHC");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> UserStore {
        UserStore::open(dir.path().join("users.json"))
    }

    #[test]
    fn register_then_authenticate() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let user = store.register("ada@example.com", "ada", "hunter22").unwrap();
        assert_eq!(user.username, "ada");

        let authed = store.authenticate("ada@example.com", "hunter22");
        assert_eq!(authed.map(|u| u.email), Some("ada@example.com".to_string()));
        assert!(store.authenticate("ada@example.com", "wrong-pass").is_none());
        assert!(store.authenticate("bob@example.com", "hunter22").is_none());
        assert!(store.authenticate("", "").is_none());
    }

    #[test]
    fn users_survive_reopen_and_passwords_are_hashed() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = store_in(&dir);
            store.register("ada@example.com", "ada", "hunter22").unwrap();
        }

        let raw = fs::read_to_string(dir.path().join("users.json")).unwrap();
        assert!(!raw.contains("hunter22"));
        assert!(raw.contains("$argon2"));

        let store = store_in(&dir);
        assert!(store.user_exists("ada@example.com"));
        assert_eq!(store.get_user("ada@example.com").unwrap().username, "ada");
        assert!(store.authenticate("ada@example.com", "hunter22").is_some());
    }

    #[test]
    fn rejects_duplicates_weak_passwords_and_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.register("ada@example.com", "ada", "hunter22").unwrap();

        assert!(matches!(
            store.register("ada@example.com", "other", "secret99"),
            Err(RegistrationError::EmailTaken(_))
        ));
        assert!(matches!(
            store.register("bob@example.com", "bob", "12345"),
            Err(RegistrationError::WeakPassword)
        ));
        assert!(matches!(
            store.register("  ", "bob", "secret99"),
            Err(RegistrationError::MissingFields)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "{ not json").unwrap();

        let store = UserStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_hash_never_authenticates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(
            &path,
            r#"{"eve@example.com":{"username":"eve","password_hash":"plain","created_at":"2024-01-01 00:00:00"}}"#,
        )
        .unwrap();

        let store = UserStore::open(&path);
        assert!(store.user_exists("eve@example.com"));
        assert!(store.authenticate("eve@example.com", "plain").is_none());
    }
}
