//! Record identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LOCAL_ID_PREFIX: &str = "local-";

/// Identifier assigned on this device while offline, using UUID v7.
///
/// Rendered as `local-<uuid>` so it can never collide with a numeric
/// server-assigned id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalId(Uuid);

impl LocalId {
    /// Create a new unique local id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LOCAL_ID_PREFIX}{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .strip_prefix(LOCAL_ID_PREFIX)
            .ok_or_else(|| IdParseError(s.to_string()))?;
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

impl TryFrom<String> for LocalId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LocalId> for String {
    fn from(value: LocalId) -> Self {
        value.to_string()
    }
}

/// Identifier of a record within its resource kind.
///
/// Server ids are JSON numbers, local ids are `local-` prefixed strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Server(i64),
    Local(LocalId),
}

impl RecordId {
    /// Allocate a fresh local-only id
    #[must_use]
    pub fn new_local() -> Self {
        Self::Local(LocalId::new())
    }

    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Path segment used in detail endpoints (`/crops/<id>/`)
    pub fn path_segment(&self) -> String {
        self.to_string()
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Server(value)
    }
}

impl From<LocalId> for RecordId {
    fn from(value: LocalId) -> Self {
        Self::Local(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "{id}"),
            Self::Local(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(Self::Server(id));
        }
        trimmed.parse::<LocalId>().map(Self::Local)
    }
}

/// A string that is neither a numeric id nor a `local-<uuid>` id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid record id: {0:?}")]
pub struct IdParseError(String);
