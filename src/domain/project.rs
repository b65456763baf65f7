use super::issue::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a space
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceId(String);

impl SpaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SpaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SpaceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column on a project's board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusColumn {
    /// Key stored on issues, e.g. `IN_PROGRESS`
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StatusColumn {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// To Do, In Progress, Done
    pub fn defaults() -> Vec<StatusColumn> {
        vec![
            StatusColumn::new("TODO", "To Do").with_color("bg-slate-500"),
            StatusColumn::new("IN_PROGRESS", "In Progress").with_color("bg-blue-500"),
            StatusColumn::new("DONE", "Done").with_color("bg-green-500"),
        ]
    }
}

/// A project owns a board of issues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Short uppercase key, e.g. `WEB`
    pub key: String,
    pub description: Option<String>,
    pub owner: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<SpaceId>,
    pub statuses: Vec<StatusColumn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, key: &str, owner: UserId, statuses: Vec<StatusColumn>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name,
            key: key.to_uppercase(),
            description: None,
            owner,
            space_id: None,
            statuses,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the column configuration for a status key
    pub fn get_status(&self, status: &str) -> Option<&StatusColumn> {
        self.statuses.iter().find(|col| col.id == status)
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.get_status(status).is_some()
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    pub fn set_key(&mut self, key: &str) {
        self.key = key.to_uppercase();
        self.updated_at = Utc::now();
    }
}

/// Groups projects; deleting a space leaves its projects standalone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
    pub description: Option<String>,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Space {
    pub fn new(name: String, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: SpaceId::new(),
            name,
            description: None,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}
