//! Persisted preferences, loaded once at startup.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of undo steps kept per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawUndoLimit", into = "RawUndoLimit")]
pub enum UndoLimit {
    Limited(usize),
    #[default]
    Unlimited,
}

impl UndoLimit {
    /// Stack depth to use: at least one, `usize::MAX` when unlimited.
    pub fn depth(self) -> usize {
        match self {
            Self::Limited(n) => n.max(1),
            Self::Unlimited => usize::MAX,
        }
    }
}

impl fmt::Display for UndoLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str(UNLIMITED),
        }
    }
}

const UNLIMITED: &str = "unlimited";

/// On-disk form: a plain number or the word "unlimited".
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawUndoLimit {
    Count(usize),
    Word(String),
}

impl TryFrom<RawUndoLimit> for UndoLimit {
    type Error = ConfigError;

    fn try_from(raw: RawUndoLimit) -> Result<Self, Self::Error> {
        match raw {
            RawUndoLimit::Count(n) => Ok(Self::Limited(n)),
            RawUndoLimit::Word(word) if word.trim().eq_ignore_ascii_case(UNLIMITED) => Ok(Self::Unlimited),
            RawUndoLimit::Word(word) => Err(ConfigError::InvalidUndoLimit(word)),
        }
    }
}

impl From<UndoLimit> for RawUndoLimit {
    fn from(limit: UndoLimit) -> Self {
        match limit {
            UndoLimit::Limited(n) => Self::Count(n),
            UndoLimit::Unlimited => Self::Word(UNLIMITED.to_owned()),
        }
    }
}

/// User preferences that affect the interaction core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Preferences {
    pub undo_limit: UndoLimit,
}

impl Preferences {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Loads preferences, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No preferences at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(prefs) => prefs,
            Err(err) => {
                log::warn!("Ignoring preferences at {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}
