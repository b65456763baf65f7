use crate::{
    auth::AuthContext,
    domain::project::{Project, ProjectId, Space, SpaceId, StatusColumn},
    error::{Result, TaskboardError},
    storage::Storage,
};
use chrono::Utc;

/// Fields for creating or editing a project
#[derive(Debug, Clone, Default)]
pub struct ProjectFields {
    pub name: String,
    pub key: String,
    pub description: Option<String>,
}

/// Fields for creating or editing a space
#[derive(Debug, Clone, Default)]
pub struct SpaceFields {
    pub name: String,
    pub description: Option<String>,
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TaskboardError::Validation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

/// Projects and spaces, each visible only to its owner.
///
/// Records owned by someone else are reported as not found.
pub struct ProjectService<'a> {
    storage: &'a dyn Storage,
    default_statuses: Vec<StatusColumn>,
}

impl<'a> ProjectService<'a> {
    pub fn new(storage: &'a dyn Storage, default_statuses: Vec<StatusColumn>) -> Self {
        Self {
            storage,
            default_statuses,
        }
    }

    pub async fn create_project(
        &self,
        ctx: &AuthContext,
        fields: ProjectFields,
        space_id: Option<&SpaceId>,
    ) -> Result<Project> {
        let user = ctx.require_user()?;
        require_non_empty("name", &fields.name)?;
        require_non_empty("key", &fields.key)?;
        if let Some(space_id) = space_id {
            self.get_space(ctx, space_id).await?;
        }

        let mut project = Project::new(
            fields.name,
            &fields.key,
            user.clone(),
            self.default_statuses.clone(),
        );
        project.description = fields.description;
        project.space_id = space_id.cloned();

        self.storage.save_project(&project).await?;
        tracing::info!(project = %project.id, key = %project.key, owner = %user, "created project");
        Ok(project)
    }

    /// Owned projects, newest first
    pub async fn list_projects(&self, ctx: &AuthContext) -> Result<Vec<Project>> {
        let user = ctx.require_user()?;
        let mut projects: Vec<Project> = self
            .storage
            .list_projects()
            .await?
            .into_iter()
            .filter(|p| p.is_owned_by(user))
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    pub async fn get_project(&self, ctx: &AuthContext, id: &ProjectId) -> Result<Project> {
        let user = ctx.require_user()?;
        let project = self.storage.load_project(id).await?;
        if !project.is_owned_by(user) {
            return Err(TaskboardError::ProjectNotFound(id.to_string()));
        }
        Ok(project)
    }

    pub async fn update_project(
        &self,
        ctx: &AuthContext,
        id: &ProjectId,
        fields: ProjectFields,
    ) -> Result<Project> {
        let mut project = self.get_project(ctx, id).await?;
        require_non_empty("name", &fields.name)?;
        require_non_empty("key", &fields.key)?;

        project.name = fields.name;
        project.description = fields.description;
        project.set_key(&fields.key);
        self.storage.save_project(&project).await?;
        tracing::info!(project = %project.id, "updated project");
        Ok(project)
    }

    /// Deletes a project and every issue on its board
    pub async fn delete_project(&self, ctx: &AuthContext, id: &ProjectId) -> Result<()> {
        let project = self.get_project(ctx, id).await?;

        let issues = self.storage.find_issues(&project.id, None).await?;
        for issue in &issues {
            self.storage.delete_issue(&issue.id).await?;
        }
        self.storage.delete_project(&project.id).await?;
        tracing::info!(project = %project.id, issues = issues.len(), "deleted project");
        Ok(())
    }

    /// Owned projects grouped under a space
    pub async fn projects_in_space(
        &self,
        ctx: &AuthContext,
        space_id: &SpaceId,
    ) -> Result<Vec<Project>> {
        self.get_space(ctx, space_id).await?;
        Ok(self
            .list_projects(ctx)
            .await?
            .into_iter()
            .filter(|p| p.space_id.as_ref() == Some(space_id))
            .collect())
    }

    pub async fn create_space(&self, ctx: &AuthContext, fields: SpaceFields) -> Result<Space> {
        let user = ctx.require_user()?;
        require_non_empty("name", &fields.name)?;

        let mut space = Space::new(fields.name, user.clone());
        space.description = fields.description;
        self.storage.save_space(&space).await?;
        tracing::info!(space = %space.id, owner = %user, "created space");
        Ok(space)
    }

    /// Owned spaces, newest first
    pub async fn list_spaces(&self, ctx: &AuthContext) -> Result<Vec<Space>> {
        let user = ctx.require_user()?;
        let mut spaces: Vec<Space> = self
            .storage
            .list_spaces()
            .await?
            .into_iter()
            .filter(|s| s.is_owned_by(user))
            .collect();
        spaces.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(spaces)
    }

    pub async fn get_space(&self, ctx: &AuthContext, id: &SpaceId) -> Result<Space> {
        let user = ctx.require_user()?;
        let space = self.storage.load_space(id).await?;
        if !space.is_owned_by(user) {
            return Err(TaskboardError::SpaceNotFound(id.to_string()));
        }
        Ok(space)
    }

    pub async fn update_space(
        &self,
        ctx: &AuthContext,
        id: &SpaceId,
        fields: SpaceFields,
    ) -> Result<Space> {
        let mut space = self.get_space(ctx, id).await?;
        require_non_empty("name", &fields.name)?;

        space.name = fields.name;
        space.description = fields.description;
        space.updated_at = Utc::now();
        self.storage.save_space(&space).await?;
        Ok(space)
    }

    /// Deletes a space; its projects stay, detached from it
    pub async fn delete_space(&self, ctx: &AuthContext, id: &SpaceId) -> Result<()> {
        let space = self.get_space(ctx, id).await?;

        let mut detached = 0;
        for mut project in self.storage.list_projects().await? {
            if project.space_id.as_ref() == Some(&space.id) {
                project.space_id = None;
                project.updated_at = Utc::now();
                self.storage.save_project(&project).await?;
                detached += 1;
            }
        }
        self.storage.delete_space(&space.id).await?;
        tracing::info!(space = %space.id, detached, "deleted space");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::issue::{Issue, UserId};
    use crate::storage::file_storage::FileStorage;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.initialize().await.unwrap();
        (dir, storage)
    }

    fn alice() -> AuthContext {
        AuthContext::new(UserId::from("alice"))
    }

    fn bob() -> AuthContext {
        AuthContext::new(UserId::from("bob"))
    }

    fn project_fields(name: &str, key: &str) -> ProjectFields {
        ProjectFields {
            name: name.to_string(),
            key: key.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_project_with_default_statuses() {
        let (_dir, storage) = storage().await;
        let service = ProjectService::new(&storage, StatusColumn::defaults());

        let project = service
            .create_project(&alice(), project_fields("Website", "web"), None)
            .await
            .unwrap();
        assert_eq!(project.key, "WEB");
        assert_eq!(project.statuses.len(), 3);
        assert_eq!(project.owner, UserId::from("alice"));
    }

    #[tokio::test]
    async fn test_projects_are_private_to_owner() {
        let (_dir, storage) = storage().await;
        let service = ProjectService::new(&storage, StatusColumn::defaults());

        let project = service
            .create_project(&alice(), project_fields("Website", "WEB"), None)
            .await
            .unwrap();

        assert!(service.list_projects(&bob()).await.unwrap().is_empty());
        assert!(matches!(
            service.get_project(&bob(), &project.id).await,
            Err(TaskboardError::ProjectNotFound(_))
        ));
        assert!(service.delete_project(&bob(), &project.id).await.is_err());
        assert_eq!(service.list_projects(&alice()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_project() {
        let (_dir, storage) = storage().await;
        let service = ProjectService::new(&storage, StatusColumn::defaults());

        let project = service
            .create_project(&alice(), project_fields("Website", "WEB"), None)
            .await
            .unwrap();
        let updated = service
            .update_project(&alice(), &project.id, project_fields("Site", "site"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Site");
        assert_eq!(updated.key, "SITE");

        assert!(service
            .update_project(&alice(), &project.id, project_fields("", "X"))
            .await
            .unwrap_err()
            .is_validation());
    }

    #[tokio::test]
    async fn test_delete_project_removes_issues() {
        let (_dir, storage) = storage().await;
        let service = ProjectService::new(&storage, StatusColumn::defaults());

        let project = service
            .create_project(&alice(), project_fields("Website", "WEB"), None)
            .await
            .unwrap();
        let issue = Issue::new(
            project.id.clone(),
            "a".to_string(),
            "TODO".to_string(),
            UserId::from("alice"),
        );
        storage.create_issue(issue).await.unwrap();

        service.delete_project(&alice(), &project.id).await.unwrap();
        assert!(storage.list_issues().await.unwrap().is_empty());
        assert!(storage.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_space_detaches_projects() {
        let (_dir, storage) = storage().await;
        let service = ProjectService::new(&storage, StatusColumn::defaults());

        let space = service
            .create_space(
                &alice(),
                SpaceFields {
                    name: "Team".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let project = service
            .create_project(&alice(), project_fields("Website", "WEB"), Some(&space.id))
            .await
            .unwrap();
        assert_eq!(
            service.projects_in_space(&alice(), &space.id).await.unwrap().len(),
            1
        );

        service.delete_space(&alice(), &space.id).await.unwrap();

        let reloaded = service.get_project(&alice(), &project.id).await.unwrap();
        assert!(reloaded.space_id.is_none());
        assert!(service.list_spaces(&alice()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cannot_use_someone_elses_space() {
        let (_dir, storage) = storage().await;
        let service = ProjectService::new(&storage, StatusColumn::defaults());

        let space = service
            .create_space(
                &alice(),
                SpaceFields {
                    name: "Team".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let err = service
            .create_project(&bob(), project_fields("Mine", "MINE"), Some(&space.id))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskboardError::SpaceNotFound(_)));
        assert!(service.delete_space(&bob(), &space.id).await.is_err());
    }
}
