use crate::{
    domain::{
        board::OrderUpdate,
        issue::{Issue, IssueId},
        project::{Project, ProjectId, Space, SpaceId},
    },
    error::{Result, TaskboardError},
    storage::Storage,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: one pretty-printed JSON document per record
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".taskboard";
    const PROJECTS_DIR: &'static str = "projects";
    const SPACES_DIR: &'static str = "spaces";
    const ISSUES_DIR: &'static str = "issues";

    /// Creates a new FileStorage instance rooted in the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().join(Self::DATA_DIR),
        }
    }

    fn projects_dir(&self) -> PathBuf {
        self.root_path.join(Self::PROJECTS_DIR)
    }

    fn spaces_dir(&self) -> PathBuf {
        self.root_path.join(Self::SPACES_DIR)
    }

    fn issues_dir(&self) -> PathBuf {
        self.root_path.join(Self::ISSUES_DIR)
    }

    /// Path of a record file; ids must be plain file names
    fn record_file(dir: PathBuf, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(TaskboardError::StorageError(format!(
                "invalid record id: {}",
                id
            )));
        }
        Ok(dir.join(format!("{}.json", id)))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_record<T: Serialize>(&self, dir: PathBuf, id: &str, record: &T) -> Result<()> {
        self.ensure_directory_exists(&dir).await?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(Self::record_file(dir, id)?, json).await?;
        Ok(())
    }

    async fn read_record<T: DeserializeOwned>(&self, dir: PathBuf, id: &str) -> Result<Option<T>> {
        let path = Self::record_file(dir, id)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn remove_record(&self, dir: PathBuf, id: &str) -> Result<bool> {
        let path = Self::record_file(dir, id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).await?;
        Ok(true)
    }

    async fn read_all<T: DeserializeOwned>(&self, dir: PathBuf) -> Result<Vec<T>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let contents = fs::read_to_string(&path).await?;
                records.push(serde_json::from_str(&contents)?);
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.projects_dir()).await?;
        self.ensure_directory_exists(&self.spaces_dir()).await?;
        self.ensure_directory_exists(&self.issues_dir()).await?;

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Local caches\n*.db\n*.db-*\n").await?;
        }

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.issues_dir().exists()
    }

    async fn save_project(&self, project: &Project) -> Result<()> {
        self.write_record(self.projects_dir(), project.id.as_str(), project)
            .await
    }

    async fn load_project(&self, id: &ProjectId) -> Result<Project> {
        self.read_record(self.projects_dir(), id.as_str())
            .await?
            .ok_or_else(|| TaskboardError::ProjectNotFound(id.to_string()))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.read_all(self.projects_dir()).await
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        if !self.remove_record(self.projects_dir(), id.as_str()).await? {
            return Err(TaskboardError::ProjectNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_space(&self, space: &Space) -> Result<()> {
        self.write_record(self.spaces_dir(), space.id.as_str(), space)
            .await
    }

    async fn load_space(&self, id: &SpaceId) -> Result<Space> {
        self.read_record(self.spaces_dir(), id.as_str())
            .await?
            .ok_or_else(|| TaskboardError::SpaceNotFound(id.to_string()))
    }

    async fn list_spaces(&self) -> Result<Vec<Space>> {
        self.read_all(self.spaces_dir()).await
    }

    async fn delete_space(&self, id: &SpaceId) -> Result<()> {
        if !self.remove_record(self.spaces_dir(), id.as_str()).await? {
            return Err(TaskboardError::SpaceNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn find_issues(
        &self,
        project_id: &ProjectId,
        status: Option<&str>,
    ) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .read_all::<Issue>(self.issues_dir())
            .await?
            .into_iter()
            .filter(|i| &i.project_id == project_id)
            .filter(|i| status.map_or(true, |s| i.status == s))
            .collect();

        // Directory order is arbitrary; creation time keeps equal ranks stable
        issues.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
        Ok(issues)
    }

    async fn find_issue(&self, id: &IssueId) -> Result<Option<Issue>> {
        self.read_record(self.issues_dir(), id.as_str()).await
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        self.read_all(self.issues_dir()).await
    }

    async fn create_issue(&self, issue: Issue) -> Result<Issue> {
        self.write_record(self.issues_dir(), issue.id.as_str(), &issue)
            .await?;
        Ok(issue)
    }

    async fn save_issue(&self, issue: &Issue) -> Result<()> {
        self.write_record(self.issues_dir(), issue.id.as_str(), issue)
            .await
    }

    async fn delete_issue(&self, id: &IssueId) -> Result<()> {
        if !self.remove_record(self.issues_dir(), id.as_str()).await? {
            return Err(TaskboardError::IssueNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn bulk_update(&self, updates: &[OrderUpdate]) -> Result<()> {
        for update in updates {
            let mut issue = self
                .find_issue(&update.id)
                .await?
                .ok_or_else(|| TaskboardError::IssueNotFound(update.id.to_string()))?;
            issue.set_position(&update.status, update.order);
            self.save_issue(&issue).await?;
        }
        Ok(())
    }
}
