use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskboardError>;

#[derive(Debug, Error)]
pub enum TaskboardError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Worklog not found: {0}")]
    WorklogNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Space not found: {0}")]
    SpaceNotFound(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Unknown status '{status}' for project {project}")]
    UnknownStatus { status: String, project: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TaskboardError {
    /// True for every "id does not resolve" failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::IssueNotFound(_)
                | Self::WorklogNotFound(_)
                | Self::ProjectNotFound(_)
                | Self::SpaceNotFound(_)
        )
    }

    /// True for input rejected before anything was written
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration(_)
                | Self::InvalidDateRange { .. }
                | Self::UnknownStatus { .. }
                | Self::Validation(_)
        )
    }
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for TaskboardError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
