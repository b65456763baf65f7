use taskboard_core::{
    format_duration, parse_duration,
    service::{IssueService, NewIssue, NewWorklog, ProjectFields, ProjectService, TimeTracker},
    storage::file_storage::FileStorage,
    AuthContext, BoardService, Issue, IssueId, ProjectId, StatusColumn, Storage, UserId,
};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    storage: FileStorage,
    project: ProjectId,
}

fn alice() -> AuthContext {
    AuthContext::new(UserId::from("alice"))
}

async fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path());
    storage.initialize().await.unwrap();

    let project = ProjectService::new(&storage, StatusColumn::defaults())
        .create_project(
            &alice(),
            ProjectFields {
                name: "Website".to_string(),
                key: "WEB".to_string(),
                description: None,
            },
            None,
        )
        .await
        .unwrap();

    Workspace {
        _dir: dir,
        storage,
        project: project.id,
    }
}

async fn create(ws: &Workspace, title: &str, status: &str, estimate: u32) -> Issue {
    IssueService::new(&ws.storage)
        .create_issue(
            &alice(),
            &ws.project,
            NewIssue {
                title: title.to_string(),
                status: status.to_string(),
                original_estimate: estimate,
                ..NewIssue::default()
            },
        )
        .await
        .unwrap()
}

async fn stored(ws: &Workspace, id: &IssueId) -> Issue {
    ws.storage.find_issue(id).await.unwrap().unwrap()
}

#[tokio::test]
async fn log_update_delete_keep_totals_consistent() {
    let ws = workspace().await;
    let tracker = TimeTracker::new(&ws.storage);
    let issue = create(&ws, "Checkout page", "TODO", 120).await;
    assert_eq!(issue.remaining_estimate, 120);

    let after_first = tracker
        .log_work(&alice(), &issue.id, NewWorklog::minutes(60))
        .await
        .unwrap();
    assert_eq!(after_first.time_spent, 60);
    assert_eq!(after_first.remaining_estimate, 60);
    let first_log = after_first.worklogs.iter().next().unwrap().id.clone();

    let after_second = tracker
        .log_work(&alice(), &issue.id, NewWorklog::minutes(90))
        .await
        .unwrap();
    assert_eq!(after_second.time_spent, 150);
    assert_eq!(after_second.remaining_estimate, 0);
    assert!(after_second.is_consistent());

    let after_delete = tracker
        .delete_worklog(&alice(), &issue.id, &first_log)
        .await
        .unwrap();
    assert_eq!(after_delete.time_spent, 90);
    assert_eq!(after_delete.remaining_estimate, 60);

    let reloaded = stored(&ws, &issue.id).await;
    assert!(reloaded.is_consistent());
    assert_eq!(reloaded.worklogs.len(), 1);
}

#[tokio::test]
async fn shrinking_a_worklog_gives_time_back() {
    let ws = workspace().await;
    let tracker = TimeTracker::new(&ws.storage);
    let issue = create(&ws, "Fix login", "TODO", 30).await;

    let logged = tracker
        .log_work(&alice(), &issue.id, NewWorklog::minutes(30))
        .await
        .unwrap();
    assert_eq!(logged.remaining_estimate, 0);
    let log_id = logged.worklogs.iter().next().unwrap().id.clone();

    let updated = tracker
        .update_worklog(&alice(), &issue.id, &log_id, 10, Some("less".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.remaining_estimate, 20);
    assert_eq!(updated.time_spent, 10);
    assert!(stored(&ws, &issue.id).await.is_consistent());
}

#[tokio::test]
async fn unparsable_duration_reads_as_zero_and_is_rejected() {
    let ws = workspace().await;
    let tracker = TimeTracker::new(&ws.storage);
    let issue = create(&ws, "Docs", "TODO", 0).await;

    let minutes = parse_duration("abc");
    assert_eq!(minutes, 0);

    let err = tracker
        .log_work(&alice(), &issue.id, NewWorklog::minutes(minutes))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn dragging_to_empty_column_reranks_only_that_column() {
    let ws = workspace().await;
    create(&ws, "first", "TODO", 0).await;
    create(&ws, "second", "TODO", 0).await;
    let third = create(&ws, "third", "TODO", 0).await;
    assert_eq!(third.order, 2);

    BoardService::new(&ws.storage)
        .move_issue(&alice(), &third.id, "IN_PROGRESS", 0)
        .await
        .unwrap();

    let todo: Vec<u32> = ws
        .storage
        .find_issues(&ws.project, Some("TODO"))
        .await
        .unwrap()
        .iter()
        .map(|i| i.order)
        .collect();
    assert_eq!(todo, vec![0, 1]);

    let in_progress = ws
        .storage
        .find_issues(&ws.project, Some("IN_PROGRESS"))
        .await
        .unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, third.id);
    assert_eq!(in_progress[0].order, 0);
}

#[tokio::test]
async fn dropping_in_place_changes_nothing() {
    let ws = workspace().await;
    create(&ws, "first", "TODO", 0).await;
    let second = create(&ws, "second", "TODO", 0).await;

    let before = ws.storage.find_issues(&ws.project, None).await.unwrap();
    let updates = BoardService::new(&ws.storage)
        .move_issue(&alice(), &second.id, "TODO", 1)
        .await
        .unwrap();
    assert!(updates.is_empty());

    let after = ws.storage.find_issues(&ws.project, None).await.unwrap();
    let snapshot = |issues: &[Issue]| -> Vec<(IssueId, String, u32)> {
        issues
            .iter()
            .map(|i| (i.id.clone(), i.status.clone(), i.order))
            .collect()
    };
    assert_eq!(snapshot(&before), snapshot(&after));
}

#[test]
fn duration_text_round_trips() {
    assert_eq!(format_duration(150), "2h 30m");
    assert_eq!(parse_duration("2h 30m"), 150);
    for minutes in 0..=600 {
        assert_eq!(parse_duration(&format_duration(minutes)), minutes);
    }
}
