use crate::{
    auth::AuthContext,
    domain::{
        board::{BoardState, OrderUpdate},
        issue::{Issue, IssueId},
        project::ProjectId,
    },
    error::{Result, TaskboardError},
    storage::Storage,
};
use std::collections::HashSet;

/// Board loading and column re-ranking against storage
pub struct BoardService<'a> {
    storage: &'a dyn Storage,
}

impl<'a> BoardService<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Current board of a project, for the client to drag on
    pub async fn load_board(&self, ctx: &AuthContext, project_id: &ProjectId) -> Result<BoardState> {
        ctx.require_user()?;
        let issues = self.storage.find_issues(project_id, None).await?;
        Ok(BoardState::new(issues))
    }

    /// Moves an issue to `position` in `target_status` and persists the
    /// re-ranked target column. Returns the writes made, empty for a no-op.
    pub async fn move_issue(
        &self,
        ctx: &AuthContext,
        issue_id: &IssueId,
        target_status: &str,
        position: usize,
    ) -> Result<Vec<OrderUpdate>> {
        let user = ctx.require_user()?;

        let issue = self
            .storage
            .find_issue(issue_id)
            .await?
            .ok_or_else(|| TaskboardError::IssueNotFound(issue_id.to_string()))?;
        let project = self.storage.load_project(&issue.project_id).await?;
        if !project.has_status(target_status) {
            return Err(TaskboardError::UnknownStatus {
                status: target_status.to_string(),
                project: project.id.to_string(),
            });
        }

        let mut board = BoardState::new(self.storage.find_issues(&project.id, None).await?);
        let Some(updates) = board.move_issue(issue_id, target_status, position) else {
            tracing::debug!(issue = %issue_id, status = target_status, position, "move is a no-op");
            return Ok(Vec::new());
        };

        self.storage.bulk_update(&updates).await?;
        tracing::info!(
            issue = %issue_id,
            user = %user,
            from = %issue.status,
            to = target_status,
            column_size = updates.len(),
            "moved issue"
        );
        Ok(updates)
    }

    /// Persists a column commit computed by the client.
    ///
    /// The batch must be one whole column: a single known status, every
    /// issue already in that column plus at most one card dragged in from
    /// elsewhere, and ranks `0..n` with no repeats. Nothing is written
    /// otherwise.
    pub async fn apply_column_order(
        &self,
        ctx: &AuthContext,
        project_id: &ProjectId,
        updates: &[OrderUpdate],
    ) -> Result<()> {
        ctx.require_user()?;
        let Some(first) = updates.first() else {
            return Ok(());
        };

        let project = self.storage.load_project(project_id).await?;
        if !project.has_status(&first.status) {
            return Err(TaskboardError::UnknownStatus {
                status: first.status.clone(),
                project: project_id.to_string(),
            });
        }

        let issues = self.storage.find_issues(project_id, None).await?;
        validate_column_batch(&first.status, updates, &issues)?;

        self.storage.bulk_update(updates).await?;
        tracing::info!(
            project = %project_id,
            status = %first.status,
            count = updates.len(),
            "applied column order"
        );
        Ok(())
    }
}

/// Checks that `updates` re-ranks exactly one column of `issues`
fn validate_column_batch(status: &str, updates: &[OrderUpdate], issues: &[Issue]) -> Result<()> {
    if let Some(other) = updates.iter().find(|u| u.status != status) {
        return Err(TaskboardError::Validation(format!(
            "column order mixes statuses {} and {}",
            status, other.status
        )));
    }

    let mut ids = HashSet::new();
    if let Some(dup) = updates.iter().find(|u| !ids.insert(&u.id)) {
        return Err(TaskboardError::Validation(format!(
            "issue {} appears twice in column order",
            dup.id
        )));
    }

    let mut ranks: Vec<u32> = updates.iter().map(|u| u.order).collect();
    ranks.sort_unstable();
    if ranks.iter().enumerate().any(|(idx, &rank)| rank as usize != idx) {
        return Err(TaskboardError::Validation(format!(
            "ranks in {} must run 0..{} without repeats",
            status,
            updates.len()
        )));
    }

    let mut entrants = 0;
    for update in updates {
        match issues.iter().find(|i| i.id == update.id) {
            None => return Err(TaskboardError::IssueNotFound(update.id.to_string())),
            Some(issue) if issue.status != status => entrants += 1,
            Some(_) => {}
        }
    }
    if entrants > 1 {
        return Err(TaskboardError::Validation(format!(
            "{} issues moved into {} at once",
            entrants, status
        )));
    }

    if let Some(left_out) = issues
        .iter()
        .find(|i| i.status == status && !ids.contains(&i.id))
    {
        return Err(TaskboardError::Validation(format!(
            "column order for {} leaves out issue {}",
            status, left_out.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        board::DropTarget,
        issue::UserId,
        project::{Project, StatusColumn},
    };
    use crate::storage::file_storage::FileStorage;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        storage: FileStorage,
        project: ProjectId,
    }

    async fn setup() -> Fixture {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.initialize().await.unwrap();

        let project = Project::new(
            "Web".to_string(),
            "WEB",
            UserId::from("alice"),
            StatusColumn::defaults(),
        );
        storage.save_project(&project).await.unwrap();
        Fixture {
            _dir: dir,
            storage,
            project: project.id,
        }
    }

    async fn add(fx: &Fixture, title: &str, status: &str, order: u32) -> IssueId {
        let mut issue = Issue::new(
            fx.project.clone(),
            title.to_string(),
            status.to_string(),
            UserId::from("alice"),
        );
        issue.order = order;
        fx.storage.create_issue(issue).await.unwrap().id
    }

    async fn column(fx: &Fixture, status: &str) -> Vec<(String, u32)> {
        fx.storage
            .find_issues(&fx.project, Some(status))
            .await
            .unwrap()
            .into_iter()
            .map(|i| (i.title, i.order))
            .collect()
    }

    fn alice() -> AuthContext {
        AuthContext::new(UserId::from("alice"))
    }

    #[tokio::test]
    async fn test_move_to_empty_column() {
        let fx = setup().await;
        add(&fx, "a", "TODO", 0).await;
        add(&fx, "b", "TODO", 1).await;
        let c = add(&fx, "c", "TODO", 2).await;

        let service = BoardService::new(&fx.storage);
        let updates = service
            .move_issue(&alice(), &c, "IN_PROGRESS", 0)
            .await
            .unwrap();
        assert_eq!(updates.len(), 1);

        assert_eq!(
            column(&fx, "TODO").await,
            vec![("a".to_string(), 0), ("b".to_string(), 1)]
        );
        assert_eq!(column(&fx, "IN_PROGRESS").await, vec![("c".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_move_to_same_spot_writes_nothing() {
        let fx = setup().await;
        add(&fx, "a", "TODO", 0).await;
        let b = add(&fx, "b", "TODO", 4).await;

        let service = BoardService::new(&fx.storage);
        let updates = service.move_issue(&alice(), &b, "TODO", 1).await.unwrap();
        assert!(updates.is_empty());
        assert_eq!(
            column(&fx, "TODO").await,
            vec![("a".to_string(), 0), ("b".to_string(), 4)]
        );
    }

    #[tokio::test]
    async fn test_move_rejects_unknown_status() {
        let fx = setup().await;
        let a = add(&fx, "a", "TODO", 0).await;

        let service = BoardService::new(&fx.storage);
        let err = service
            .move_issue(&alice(), &a, "ARCHIVED", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskboardError::UnknownStatus { .. }));
        assert_eq!(column(&fx, "TODO").await, vec![("a".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_move_requires_user() {
        let fx = setup().await;
        let a = add(&fx, "a", "TODO", 0).await;

        let service = BoardService::new(&fx.storage);
        assert!(matches!(
            service
                .move_issue(&AuthContext::anonymous(), &a, "DONE", 0)
                .await,
            Err(TaskboardError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_client_drag_then_apply() {
        let fx = setup().await;
        let a = add(&fx, "a", "TODO", 0).await;
        add(&fx, "x", "DONE", 0).await;
        let y = add(&fx, "y", "DONE", 1).await;

        let service = BoardService::new(&fx.storage);
        let mut board = service.load_board(&alice(), &fx.project).await.unwrap();
        let updates = board.drop_on(&a, &DropTarget::Issue(y));

        service
            .apply_column_order(&alice(), &fx.project, &updates)
            .await
            .unwrap();
        assert_eq!(
            column(&fx, "DONE").await,
            vec![
                ("x".to_string(), 0),
                ("y".to_string(), 1),
                ("a".to_string(), 2)
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_foreign_issue() {
        let fx = setup().await;
        let a = add(&fx, "a", "TODO", 0).await;

        let service = BoardService::new(&fx.storage);
        let updates = vec![
            OrderUpdate {
                id: a.clone(),
                order: 1,
                status: "TODO".to_string(),
            },
            OrderUpdate {
                id: IssueId::from("elsewhere"),
                order: 0,
                status: "TODO".to_string(),
            },
        ];
        let err = service
            .apply_column_order(&alice(), &fx.project, &updates)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(column(&fx, "TODO").await, vec![("a".to_string(), 0)]);
    }

    fn update(id: &IssueId, order: u32, status: &str) -> OrderUpdate {
        OrderUpdate {
            id: id.clone(),
            order,
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn test_apply_rejects_mixed_statuses() {
        let fx = setup().await;
        let a = add(&fx, "a", "TODO", 0).await;
        let x = add(&fx, "x", "DONE", 0).await;

        let service = BoardService::new(&fx.storage);
        let err = service
            .apply_column_order(&alice(), &fx.project, &[update(&a, 0, "DONE"), update(&x, 0, "TODO")])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(column(&fx, "TODO").await, vec![("a".to_string(), 0)]);
        assert_eq!(column(&fx, "DONE").await, vec![("x".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_apply_rejects_partial_column() {
        let fx = setup().await;
        let a = add(&fx, "a", "TODO", 0).await;
        add(&fx, "x", "DONE", 0).await;
        add(&fx, "y", "DONE", 1).await;

        // Moving `a` to the top of DONE without re-ranking x and y would collide with x
        let service = BoardService::new(&fx.storage);
        let err = service
            .apply_column_order(&alice(), &fx.project, &[update(&a, 0, "DONE")])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(column(&fx, "TODO").await, vec![("a".to_string(), 0)]);
        assert_eq!(
            column(&fx, "DONE").await,
            vec![("x".to_string(), 0), ("y".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_repeated_or_gapped_ranks() {
        let fx = setup().await;
        let x = add(&fx, "x", "DONE", 0).await;
        let y = add(&fx, "y", "DONE", 1).await;

        let service = BoardService::new(&fx.storage);
        for batch in [
            vec![update(&x, 0, "DONE"), update(&y, 0, "DONE")],
            vec![update(&x, 0, "DONE"), update(&y, 2, "DONE")],
            vec![update(&x, 0, "DONE"), update(&x, 1, "DONE")],
        ] {
            let err = service
                .apply_column_order(&alice(), &fx.project, &batch)
                .await
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(
            column(&fx, "DONE").await,
            vec![("x".to_string(), 0), ("y".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_two_entrants() {
        let fx = setup().await;
        let a = add(&fx, "a", "TODO", 0).await;
        let b = add(&fx, "b", "TODO", 1).await;
        let x = add(&fx, "x", "DONE", 0).await;

        let service = BoardService::new(&fx.storage);
        let batch = [update(&x, 0, "DONE"), update(&a, 1, "DONE"), update(&b, 2, "DONE")];
        let err = service
            .apply_column_order(&alice(), &fx.project, &batch)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            column(&fx, "TODO").await,
            vec![("a".to_string(), 0), ("b".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_apply_reorders_within_column() {
        let fx = setup().await;
        let x = add(&fx, "x", "DONE", 0).await;
        let y = add(&fx, "y", "DONE", 3).await;

        let service = BoardService::new(&fx.storage);
        service
            .apply_column_order(&alice(), &fx.project, &[update(&y, 0, "DONE"), update(&x, 1, "DONE")])
            .await
            .unwrap();
        assert_eq!(
            column(&fx, "DONE").await,
            vec![("y".to_string(), 0), ("x".to_string(), 1)]
        );
    }
}
