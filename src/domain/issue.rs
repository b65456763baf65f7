use super::project::ProjectId;
use crate::error::{Result, TaskboardError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of an acting or recorded user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssueId(String);

impl IssueId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a worklog, unique within its issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorklogId(String);

impl WorklogId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorklogId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for WorklogId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorklogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueType {
    #[default]
    Task,
    Bug,
    Story,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "TASK"),
            Self::Bug => write!(f, "BUG"),
            Self::Story => write!(f, "STORY"),
        }
    }
}

/// A single recorded interval of work on an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worklog {
    pub id: WorklogId,
    pub user_id: UserId,
    /// Minutes, always positive
    pub time_spent: u32,
    /// Day the work applies to; may differ from `created_at`
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Worklog {
    pub fn new(user_id: UserId, time_spent: u32, date: DateTime<Utc>) -> Self {
        Self {
            id: WorklogId::new(),
            user_id,
            time_spent,
            date,
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

/// Worklogs owned by one issue, addressed by id rather than position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Worklogs(Vec<Worklog>);

impl Worklogs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, worklog: Worklog) {
        self.0.push(worklog);
    }

    pub fn find_by_id(&self, id: &WorklogId) -> Option<&Worklog> {
        self.0.iter().find(|w| &w.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: &WorklogId) -> Option<&mut Worklog> {
        self.0.iter_mut().find(|w| &w.id == id)
    }

    pub fn remove_by_id(&mut self, id: &WorklogId) -> Option<Worklog> {
        let pos = self.0.iter().position(|w| &w.id == id)?;
        Some(self.0.remove(pos))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Worklog> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every entry's minutes
    pub fn total_minutes(&self) -> u32 {
        self.0
            .iter()
            .fold(0u32, |acc, w| acc.saturating_add(w.time_spent))
    }

    /// Newest work date first, for display
    pub fn sorted_by_date(&self) -> Vec<&Worklog> {
        let mut logs: Vec<&Worklog> = self.0.iter().collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        logs
    }
}

impl<'a> IntoIterator for &'a Worklogs {
    type Item = &'a Worklog;
    type IntoIter = std::slice::Iter<'a, Worklog>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A trackable unit of work shown as a card on a project board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    /// Key of the project column this issue sits in
    pub status: String,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Rank within `(project_id, status)`; lower sorts first
    pub order: u32,
    pub reporter_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(default)]
    pub original_estimate: u32,
    #[serde(default)]
    pub time_spent: u32,
    #[serde(default)]
    pub remaining_estimate: u32,
    #[serde(default)]
    pub worklogs: Worklogs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Creates an issue in the given column with no estimate and no work logged
    pub fn new(project_id: ProjectId, title: String, status: String, reporter: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: IssueId::new(),
            project_id,
            title,
            description: None,
            status,
            priority: Priority::default(),
            issue_type: IssueType::default(),
            order: 0,
            assignee_id: Some(reporter.clone()),
            reporter_id: reporter,
            original_estimate: 0,
            time_spent: 0,
            remaining_estimate: 0,
            worklogs: Worklogs::new(),
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_in_column(&self, project_id: &ProjectId, status: &str) -> bool {
        &self.project_id == project_id && self.status == status
    }

    /// Records work, drawing the remaining estimate down to no lower than zero
    pub fn log_work(
        &mut self,
        user: &UserId,
        minutes: u32,
        description: Option<String>,
        date: Option<DateTime<Utc>>,
    ) -> Result<WorklogId> {
        if minutes == 0 {
            return Err(TaskboardError::InvalidDuration(
                "logged time must be positive".to_string(),
            ));
        }

        let mut worklog = Worklog::new(user.clone(), minutes, date.unwrap_or_else(Utc::now));
        worklog.description = description;
        let id = worklog.id.clone();

        self.worklogs.push(worklog);
        self.time_spent = self.time_spent.saturating_add(minutes);
        self.remaining_estimate = self.remaining_estimate.saturating_sub(minutes);
        self.updated_at = Utc::now();
        Ok(id)
    }

    /// Changes a worklog's minutes, moving the difference through both aggregates.
    ///
    /// The remaining estimate absorbs `new - old` and is floored at zero at
    /// that moment; time floored away by earlier logging is not restored.
    /// A `None` description keeps the stored one.
    pub fn update_worklog(
        &mut self,
        user: &UserId,
        worklog_id: &WorklogId,
        minutes: u32,
        description: Option<String>,
    ) -> Result<()> {
        if minutes == 0 {
            return Err(TaskboardError::InvalidDuration(
                "logged time must be positive".to_string(),
            ));
        }

        let worklog = self
            .worklogs
            .find_by_id_mut(worklog_id)
            .ok_or_else(|| TaskboardError::WorklogNotFound(worklog_id.to_string()))?;

        if !worklog.is_authored_by(user) {
            return Err(TaskboardError::Unauthorized);
        }

        let old = worklog.time_spent;
        worklog.time_spent = minutes;
        if description.is_some() {
            worklog.description = description;
        }

        let diff = i64::from(minutes) - i64::from(old);
        self.time_spent = self.time_spent.saturating_sub(old).saturating_add(minutes);
        self.remaining_estimate = clamp_minutes(i64::from(self.remaining_estimate) - diff);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Removes a worklog and hands all of its minutes back to the remaining estimate
    pub fn delete_worklog(&mut self, user: &UserId, worklog_id: &WorklogId) -> Result<Worklog> {
        let worklog = self
            .worklogs
            .find_by_id(worklog_id)
            .ok_or_else(|| TaskboardError::WorklogNotFound(worklog_id.to_string()))?;

        if !worklog.is_authored_by(user) {
            return Err(TaskboardError::Unauthorized);
        }

        let removed = self
            .worklogs
            .remove_by_id(worklog_id)
            .ok_or_else(|| TaskboardError::WorklogNotFound(worklog_id.to_string()))?;

        self.time_spent = self.time_spent.saturating_sub(removed.time_spent);
        self.remaining_estimate = self.remaining_estimate.saturating_add(removed.time_spent);
        self.updated_at = Utc::now();
        Ok(removed)
    }

    /// Re-baselines the estimate. Returns false, touching nothing, when unchanged
    pub fn set_original_estimate(&mut self, minutes: u32) -> bool {
        if minutes == self.original_estimate {
            return false;
        }
        self.original_estimate = minutes;
        self.remaining_estimate = minutes.saturating_sub(self.time_spent);
        self.updated_at = Utc::now();
        true
    }

    /// Manual override of the remaining estimate
    pub fn set_remaining_estimate(&mut self, minutes: u32) {
        self.remaining_estimate = minutes;
        self.updated_at = Utc::now();
    }

    /// Percentage of the original estimate already spent, capped at 100
    pub fn progress(&self) -> f64 {
        if self.original_estimate == 0 {
            return 0.0;
        }
        let pct = f64::from(self.time_spent) / f64::from(self.original_estimate) * 100.0;
        pct.min(100.0)
    }

    /// Whether `time_spent` agrees with the worklog ledger
    pub fn is_consistent(&self) -> bool {
        self.time_spent == self.worklogs.total_minutes()
    }

    /// Sets both dates, rejecting an end before the start
    pub fn set_dates(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(TaskboardError::InvalidDateRange {
                    start: start.to_rfc3339(),
                    end: end.to_rfc3339(),
                });
            }
        }
        self.start_date = start;
        self.end_date = end;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Moves the card to a column position
    pub fn set_position(&mut self, status: &str, order: u32) {
        self.status = status.to_string();
        self.order = order;
        self.updated_at = Utc::now();
    }
}

fn clamp_minutes(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
