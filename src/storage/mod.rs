use crate::{
    domain::{
        board::OrderUpdate,
        issue::{Issue, IssueId},
        project::{Project, ProjectId, Space, SpaceId},
    },
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Storage trait for persisting projects, spaces and issues.
///
/// Each issue is one document with its worklogs embedded. Writes are
/// last-write-wins; no version checks happen at this layer.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Checks if the backend has been initialized
    async fn is_initialized(&self) -> bool;

    /// Saves a project, replacing any previous version
    async fn save_project(&self, project: &Project) -> Result<()>;

    /// Loads a project by ID
    async fn load_project(&self, id: &ProjectId) -> Result<Project>;

    /// Lists all projects
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Deletes a project record (its issues are not touched)
    async fn delete_project(&self, id: &ProjectId) -> Result<()>;

    /// Saves a space, replacing any previous version
    async fn save_space(&self, space: &Space) -> Result<()>;

    /// Loads a space by ID
    async fn load_space(&self, id: &SpaceId) -> Result<Space>;

    /// Lists all spaces
    async fn list_spaces(&self) -> Result<Vec<Space>>;

    /// Deletes a space record
    async fn delete_space(&self, id: &SpaceId) -> Result<()>;

    /// Issues of a project, optionally limited to one status, ascending by order
    async fn find_issues(&self, project_id: &ProjectId, status: Option<&str>)
        -> Result<Vec<Issue>>;

    /// Loads an issue, `None` when the id does not resolve
    async fn find_issue(&self, id: &IssueId) -> Result<Option<Issue>>;

    /// Every stored issue, in no particular order
    async fn list_issues(&self) -> Result<Vec<Issue>>;

    /// Stores a new issue and returns it as persisted
    async fn create_issue(&self, issue: Issue) -> Result<Issue>;

    /// Saves an existing issue document
    async fn save_issue(&self, issue: &Issue) -> Result<()>;

    /// Deletes an issue together with its worklogs
    async fn delete_issue(&self, id: &IssueId) -> Result<()>;

    /// Applies independent status/order writes, one per issue
    async fn bulk_update(&self, updates: &[OrderUpdate]) -> Result<()>;
}
