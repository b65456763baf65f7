use crate::{
    auth::AuthContext,
    domain::{
        issue::{Issue, IssueId, Worklog, WorklogId},
        project::ProjectId,
    },
    error::{Result, TaskboardError},
    storage::Storage,
};
use chrono::{DateTime, Utc};

/// Input for logging work against an issue
#[derive(Debug, Clone, Default)]
pub struct NewWorklog {
    /// Minutes, must be positive
    pub time_spent: u32,
    pub description: Option<String>,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
}

impl NewWorklog {
    pub fn minutes(time_spent: u32) -> Self {
        Self {
            time_spent,
            ..Self::default()
        }
    }
}

/// A worklog together with the issue it belongs to
#[derive(Debug, Clone)]
pub struct UserWorklog {
    pub worklog: Worklog,
    pub issue_id: IssueId,
    pub issue_title: String,
    pub project_id: ProjectId,
}

/// Work-log accounting against stored issues.
///
/// Every operation loads one issue document, applies the change in
/// memory and saves the whole document back. Failures leave the stored
/// issue untouched.
pub struct TimeTracker<'a> {
    storage: &'a dyn Storage,
}

impl<'a> TimeTracker<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    async fn load(&self, id: &IssueId) -> Result<Issue> {
        self.storage
            .find_issue(id)
            .await?
            .ok_or_else(|| TaskboardError::IssueNotFound(id.to_string()))
    }

    pub async fn log_work(
        &self,
        ctx: &AuthContext,
        issue_id: &IssueId,
        entry: NewWorklog,
    ) -> Result<Issue> {
        let user = ctx.require_user()?;
        if entry.time_spent == 0 {
            return Err(TaskboardError::InvalidDuration(
                "logged time must be positive".to_string(),
            ));
        }

        let mut issue = self.load(issue_id).await?;
        let worklog_id = issue.log_work(user, entry.time_spent, entry.description, entry.date)?;
        self.storage.save_issue(&issue).await?;

        tracing::info!(
            issue = %issue.id,
            worklog = %worklog_id,
            user = %user,
            minutes = entry.time_spent,
            remaining = issue.remaining_estimate,
            "logged work"
        );
        Ok(issue)
    }

    pub async fn update_worklog(
        &self,
        ctx: &AuthContext,
        issue_id: &IssueId,
        worklog_id: &WorklogId,
        time_spent: u32,
        description: Option<String>,
    ) -> Result<Issue> {
        let user = ctx.require_user()?;
        if time_spent == 0 {
            return Err(TaskboardError::InvalidDuration(
                "logged time must be positive".to_string(),
            ));
        }
        let mut issue = self.load(issue_id).await?;

        if let Err(err) = issue.update_worklog(user, worklog_id, time_spent, description) {
            if matches!(err, TaskboardError::Unauthorized) {
                tracing::warn!(issue = %issue_id, worklog = %worklog_id, user = %user, "worklog edit by non-author");
            }
            return Err(err);
        }
        self.storage.save_issue(&issue).await?;

        tracing::info!(
            issue = %issue.id,
            worklog = %worklog_id,
            minutes = time_spent,
            time_spent = issue.time_spent,
            remaining = issue.remaining_estimate,
            "updated worklog"
        );
        Ok(issue)
    }

    pub async fn delete_worklog(
        &self,
        ctx: &AuthContext,
        issue_id: &IssueId,
        worklog_id: &WorklogId,
    ) -> Result<Issue> {
        let user = ctx.require_user()?;
        let mut issue = self.load(issue_id).await?;

        let removed = match issue.delete_worklog(user, worklog_id) {
            Ok(removed) => removed,
            Err(err) => {
                if matches!(err, TaskboardError::Unauthorized) {
                    tracing::warn!(issue = %issue_id, worklog = %worklog_id, user = %user, "worklog delete by non-author");
                }
                return Err(err);
            }
        };
        self.storage.save_issue(&issue).await?;

        tracing::info!(
            issue = %issue.id,
            worklog = %worklog_id,
            restored = removed.time_spent,
            remaining = issue.remaining_estimate,
            "deleted worklog"
        );
        Ok(issue)
    }

    /// Overwrites either estimate as given, without recomputing the other
    pub async fn update_estimates(
        &self,
        ctx: &AuthContext,
        issue_id: &IssueId,
        original_estimate: Option<u32>,
        remaining_estimate: Option<u32>,
    ) -> Result<Issue> {
        let user = ctx.require_user()?;
        let mut issue = self.load(issue_id).await?;

        if let Some(original) = original_estimate {
            issue.original_estimate = original;
            issue.updated_at = Utc::now();
        }
        if let Some(remaining) = remaining_estimate {
            issue.set_remaining_estimate(remaining);
        }
        self.storage.save_issue(&issue).await?;

        tracing::info!(
            issue = %issue.id,
            user = %user,
            original = issue.original_estimate,
            remaining = issue.remaining_estimate,
            "updated estimates"
        );
        Ok(issue)
    }

    /// Every worklog the acting user authored, newest work date first
    pub async fn user_worklogs(&self, ctx: &AuthContext) -> Result<Vec<UserWorklog>> {
        let user = ctx.require_user()?;

        let mut logs: Vec<UserWorklog> = self
            .storage
            .list_issues()
            .await?
            .into_iter()
            .flat_map(|issue| {
                issue
                    .worklogs
                    .iter()
                    .filter(|w| w.is_authored_by(user))
                    .map(|w| UserWorklog {
                        worklog: w.clone(),
                        issue_id: issue.id.clone(),
                        issue_title: issue.title.clone(),
                        project_id: issue.project_id.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        logs.sort_by(|a, b| b.worklog.date.cmp(&a.worklog.date));
        tracing::debug!(user = %user, count = logs.len(), "loaded user worklogs");
        Ok(logs)
    }
}
