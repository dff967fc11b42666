use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::debug;

pub const HOME_ENV: &str = "LEETCLI_HOME";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine your home directory")]
    NoHomeDir,
    #[error("leetcli is not initialized ({path:?} is missing). Run `leetcli init` first.")]
    NotInitialized { path: PathBuf },
    #[error("Config file {path:?} is corrupt (fix it by hand or run `leetcli init` again)")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("No LeetCode session found. Run `leetcli login` first.")]
    NotLoggedIn,
    #[error("No Gemini API key found. Use `leetcli config set-gemini-key <your-key>` first.")]
    MissingGeminiKey,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub problems_dir: PathBuf,
    pub lang: String,
    #[serde(default)]
    pub leetcode_session: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_key: Option<String>,
}

/// Cookie pair that proves a logged-in browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub session: String,
    pub csrf_token: String,
}

impl Config {
    pub fn new(problems_dir: PathBuf, lang: String) -> Self {
        Self {
            problems_dir,
            lang,
            leetcode_session: String::new(),
            csrf_token: String::new(),
            gemini_key: None,
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if self.leetcode_session.is_empty() || self.csrf_token.is_empty() {
            return Err(ConfigError::NotLoggedIn);
        }
        Ok(Credentials {
            session: self.leetcode_session.clone(),
            csrf_token: self.csrf_token.clone(),
        })
    }

    pub fn gemini_key(&self) -> Result<&str, ConfigError> {
        match self.gemini_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingGeminiKey),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    /// Folder name relative to the problems directory.
    pub folder: String,
    pub fetched_at: DateTime<Utc>,
}

/// Slug to folder mapping kept next to the config, so that local operations
/// can skip the id/title lookup.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemIndex {
    #[serde(default)]
    pub problems: IndexMap<String, IndexEntry>,
}

impl ProblemIndex {
    pub fn get(&self, slug: &str) -> Option<&IndexEntry> {
        self.problems.get(slug)
    }

    pub fn record(&mut self, slug: &str, id: &str, title: &str, folder: &str) {
        self.problems.insert(
            slug.to_string(),
            IndexEntry {
                id: id.to_string(),
                title: title.to_string(),
                folder: folder.to_string(),
                fetched_at: Utc::now(),
            },
        );
    }

    pub fn invalidate(&mut self, slug: &str) -> Option<IndexEntry> {
        self.problems.shift_remove(slug)
    }

    pub fn find_by_folder(&self, folder: &str) -> Option<(&String, &IndexEntry)> {
        self.problems.iter().find(|(_, entry)| entry.folder == folder)
    }
}

/// The `.leetcli` directory and the files inside it.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$LEETCLI_HOME` if set, `~/.leetcli` otherwise.
    pub fn locate() -> Result<Self, ConfigError> {
        if let Some(root) = std::env::var_os(HOME_ENV) {
            return Ok(Self::new(root));
        }
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        path.push(".leetcli");
        Ok(Self::new(path))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let path = self.config_path();
        let text = match fs_err::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotInitialized { path });
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Corrupt { path, source })
    }

    pub fn save_config(&self, config: &Config) -> Result<(), ConfigError> {
        self.write_json(&self.config_path(), config)
    }

    /// A missing or unreadable index is treated as empty; the judge stays the
    /// source of truth.
    pub fn load_index(&self) -> ProblemIndex {
        let path = self.index_path();
        let Ok(text) = fs_err::read_to_string(&path) else {
            return ProblemIndex::default();
        };
        match serde_json::from_str(&text) {
            Ok(index) => index,
            Err(err) => {
                debug!("Ignoring unreadable index {:?}: {}", path, err);
                ProblemIndex::default()
            }
        }
    }

    pub fn save_index(&self, index: &ProblemIndex) -> Result<(), ConfigError> {
        self.write_json(&self.index_path(), index)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), ConfigError> {
        fs_err::create_dir_all(&self.root)?;
        let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
        fs_err::write(path, text)?;
        debug!("Saved {:?}", path);
        Ok(())
    }
}
