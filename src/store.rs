//! High score and account persistence.
//!
//! Reads are forgiving: a missing or unreadable file behaves like an empty
//! one. Writes report a [`StoreError`] and leave the old file intact.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes `data` next to `path` and renames it over the target.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, data).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

/// Where the frame driver keeps the best score between runs.
pub trait ScoreStore {
    /// Never fails; anything unreadable counts as 0.
    fn load_high_score(&mut self) -> u32;
    fn save_high_score(&mut self, score: u32) -> Result<(), StoreError>;
}

/// A plain text file holding one integer.
#[derive(Clone, Debug)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for HighScoreFile {
    fn load_high_score(&mut self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(text) => text.trim().parse().unwrap_or_else(|_| {
                warn!(path = %self.path.display(), "high score file is corrupt, starting from 0");
                0
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read high score");
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        write_atomic(&self.path, score.to_string().as_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    /// SHA-256 of the UTF-8 password, base64 encoded.
    pub password: String,
    pub name: String,
    /// Base64 image bytes, empty when unset.
    #[serde(default)]
    pub avatar: String,
    pub created_at: DateTime<Local>,
    #[serde(default)]
    pub high_score: u32,
}

impl Account {
    pub fn new(email: &str, password: &str, name: &str) -> Self {
        Self {
            email: email.trim().to_owned(),
            password: password.to_owned(),
            name: name.trim().to_owned(),
            avatar: String::new(),
            created_at: Local::now(),
            high_score: 0,
        }
    }

    pub fn set_avatar(&mut self, bytes: &[u8]) {
        self.avatar = STANDARD.encode(bytes);
    }

    pub fn avatar_bytes(&self) -> Option<Vec<u8>> {
        if self.avatar.is_empty() {
            return None;
        }
        STANDARD.decode(&self.avatar).ok()
    }
}

pub fn hash_password(password: &str) -> String {
    STANDARD.encode(Sha256::digest(password.as_bytes()))
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Accounts kept as a pretty-printed JSON list, loaded on first use.
#[derive(Debug)]
pub struct AccountRepo {
    path: PathBuf,
    accounts: Option<Vec<Account>>,
}

impl AccountRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            accounts: None,
        }
    }

    fn accounts(&mut self) -> &mut Vec<Account> {
        let path = &self.path;
        self.accounts.get_or_insert_with(|| match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "accounts file is corrupt, starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        })
    }

    /// Writes `accounts` and only then makes them the cached view.
    fn commit(&mut self, accounts: Vec<Account>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(&accounts).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &data)?;
        self.accounts = Some(accounts);
        Ok(())
    }

    /// Adds an account with a freshly hashed password. Returns `Ok(false)`
    /// for blank fields, a malformed email or an email already taken.
    pub fn register(&mut self, mut account: Account) -> Result<bool, StoreError> {
        if account.email.is_empty()
            || !account.email.contains('@')
            || account.name.is_empty()
            || account.password.is_empty()
        {
            return Ok(false);
        }
        if self.get_by_email(&account.email).is_some() {
            return Ok(false);
        }
        account.password = hash_password(&account.password);
        let email = account.email.clone();
        let mut accounts = self.accounts().clone();
        accounts.push(account);
        self.commit(accounts)?;
        debug!(%email, "account registered");
        Ok(true)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Option<Account> {
        let hashed = hash_password(password);
        self.accounts()
            .iter()
            .find(|a| same_email(&a.email, email) && a.password == hashed)
            .cloned()
    }

    pub fn get_by_email(&mut self, email: &str) -> Option<Account> {
        self.accounts()
            .iter()
            .find(|a| same_email(&a.email, email))
            .cloned()
    }

    /// Replaces the stored account with the same email.
    ///
    /// An empty password, or one equal to the stored hash, keeps the stored
    /// hash. Anything else is treated as a new plain password.
    pub fn update_account(&mut self, mut account: Account) -> Result<bool, StoreError> {
        let mut accounts = self.accounts().clone();
        let Some(existing) = accounts
            .iter_mut()
            .find(|a| same_email(&a.email, &account.email))
        else {
            return Ok(false);
        };
        if account.password.is_empty() || account.password == existing.password {
            account.password = existing.password.clone();
        } else {
            account.password = hash_password(&account.password);
        }
        *existing = account;
        self.commit(accounts)?;
        Ok(true)
    }

    /// Raises the stored best. Lower scores are accepted and ignored.
    pub fn update_high_score(&mut self, email: &str, score: u32) -> Result<bool, StoreError> {
        let Some(mut account) = self.get_by_email(email) else {
            return Ok(false);
        };
        if score <= account.high_score {
            return Ok(true);
        }
        account.high_score = score;
        self.update_account(account)
    }

    /// Accounts with a positive best, highest first, older accounts first on
    /// ties.
    pub fn get_top_scores(&mut self, n: usize) -> Vec<Account> {
        let mut ranked: Vec<Account> = self
            .accounts()
            .iter()
            .filter(|a| a.high_score > 0)
            .cloned()
            .collect();
        ranked.sort_by(|a, b| {
            b.high_score
                .cmp(&a.high_score)
                .then(a.created_at.cmp(&b.created_at))
        });
        ranked.truncate(n);
        ranked
    }
}

/// Keeps the high score on one player's account.
#[derive(Debug)]
pub struct AccountScores {
    repo: AccountRepo,
    email: String,
}

impl AccountScores {
    pub fn new(repo: AccountRepo, email: impl Into<String>) -> Self {
        Self {
            repo,
            email: email.into(),
        }
    }
}

impl ScoreStore for AccountScores {
    fn load_high_score(&mut self) -> u32 {
        self.repo
            .get_by_email(&self.email)
            .map_or(0, |a| a.high_score)
    }

    fn save_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        if !self.repo.update_high_score(&self.email, score)? {
            warn!(email = %self.email, "no such account, high score not saved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_base64_sha256() {
        assert_eq!(
            hash_password("abc"),
            "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0="
        );
    }

    #[test]
    fn avatar_round_trips_through_base64() {
        let mut account = Account::new("a@b.c", "pw", "A");
        assert_eq!(account.avatar_bytes(), None);
        account.set_avatar(&[0x89, b'P', b'N', b'G']);
        assert_eq!(account.avatar, "iVBORw==");
        assert_eq!(account.avatar_bytes(), Some(vec![0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn email_match_ignores_case() {
        assert!(same_email("Bird@Example.com", "bird@example.COM"));
        assert!(!same_email("bird@example.com", "bird@example.org"));
    }
}
