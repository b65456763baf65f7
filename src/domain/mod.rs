pub mod board;
pub mod duration;
pub mod issue;
pub mod project;
pub mod sorting;

pub use board::{BoardState, DropTarget, OrderUpdate};
pub use duration::{format_duration, parse_duration, parse_duration_strict};
pub use issue::{Issue, IssueId, IssueType, Priority, UserId, Worklog, WorklogId, Worklogs};
pub use project::{Project, ProjectId, Space, SpaceId, StatusColumn};
pub use sorting::{sort_issues, SortField, SortOrder};
