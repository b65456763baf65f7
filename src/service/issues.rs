use crate::{
    auth::AuthContext,
    domain::{
        issue::{Issue, IssueId, IssueType, Priority},
        project::ProjectId,
        sorting::{sort_issues, SortField, SortOrder},
    },
    error::{Result, TaskboardError},
    storage::Storage,
};
use chrono::{DateTime, Utc};

/// Fields for a new issue
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: Priority,
    pub issue_type: IssueType,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Minutes
    pub original_estimate: u32,
}

/// Editable issue fields; every field is written as given
#[derive(Debug, Clone, Default)]
pub struct IssueDetails {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub issue_type: IssueType,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// `None` leaves the estimate alone
    pub original_estimate: Option<u32>,
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TaskboardError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Issue lifecycle: create, list, edit, delete
pub struct IssueService<'a> {
    storage: &'a dyn Storage,
}

impl<'a> IssueService<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Creates an issue at the bottom of its column, reported by and assigned to the actor
    pub async fn create_issue(
        &self,
        ctx: &AuthContext,
        project_id: &ProjectId,
        fields: NewIssue,
    ) -> Result<Issue> {
        let user = ctx.require_user()?;
        require_title(&fields.title)?;

        let project = self.storage.load_project(project_id).await?;
        if !project.has_status(&fields.status) {
            return Err(TaskboardError::UnknownStatus {
                status: fields.status,
                project: project_id.to_string(),
            });
        }

        let mut issue = Issue::new(
            project_id.clone(),
            fields.title,
            fields.status,
            user.clone(),
        );
        issue.description = fields.description;
        issue.priority = fields.priority;
        issue.issue_type = fields.issue_type;
        issue.set_dates(fields.start_date, fields.end_date)?;
        issue.original_estimate = fields.original_estimate;
        issue.remaining_estimate = fields.original_estimate;

        let column = self
            .storage
            .find_issues(project_id, Some(issue.status.as_str()))
            .await?;
        issue.order = column
            .iter()
            .map(|i| i.order)
            .max()
            .map_or(0, |max| max.saturating_add(1));

        let issue = self.storage.create_issue(issue).await?;
        tracing::info!(
            issue = %issue.id,
            project = %project_id,
            status = %issue.status,
            order = issue.order,
            "created issue"
        );
        Ok(issue)
    }

    /// All issues of a project, ascending by rank
    pub async fn list_issues(&self, ctx: &AuthContext, project_id: &ProjectId) -> Result<Vec<Issue>> {
        ctx.require_user()?;
        self.storage.find_issues(project_id, None).await
    }

    pub async fn get_issue(&self, ctx: &AuthContext, issue_id: &IssueId) -> Result<Issue> {
        ctx.require_user()?;
        self.storage
            .find_issue(issue_id)
            .await?
            .ok_or_else(|| TaskboardError::IssueNotFound(issue_id.to_string()))
    }

    /// Rewrites the editable fields. A changed original estimate resets the
    /// remaining estimate to what is left of it; an unchanged one keeps any
    /// manual adjustment.
    pub async fn update_issue_details(
        &self,
        ctx: &AuthContext,
        issue_id: &IssueId,
        details: IssueDetails,
    ) -> Result<Issue> {
        let mut issue = self.get_issue(ctx, issue_id).await?;
        require_title(&details.title)?;

        issue.set_dates(details.start_date, details.end_date)?;
        issue.title = details.title;
        issue.description = details.description;
        issue.priority = details.priority;
        issue.issue_type = details.issue_type;
        let reestimated = details
            .original_estimate
            .map_or(false, |minutes| issue.set_original_estimate(minutes));

        self.storage.save_issue(&issue).await?;
        tracing::info!(issue = %issue.id, reestimated, "updated issue details");
        Ok(issue)
    }

    pub async fn delete_issue(&self, ctx: &AuthContext, issue_id: &IssueId) -> Result<()> {
        let issue = self.get_issue(ctx, issue_id).await?;
        self.storage.delete_issue(&issue.id).await?;
        tracing::info!(issue = %issue.id, project = %issue.project_id, "deleted issue");
        Ok(())
    }

    /// Issues the actor is assigned to or reported, earliest start first
    pub async fn assigned_issues(&self, ctx: &AuthContext) -> Result<Vec<Issue>> {
        let user = ctx.require_user()?;

        let mut issues: Vec<Issue> = self
            .storage
            .list_issues()
            .await?
            .into_iter()
            .filter(|i| i.assignee_id.as_ref() == Some(user) || &i.reporter_id == user)
            .collect();

        sort_issues(&mut issues, SortField::Start, SortOrder::Ascending);
        Ok(issues)
    }
}
