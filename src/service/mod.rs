//! Request-scoped operations: authorize, load, validate, mutate, persist.

pub mod board;
pub mod issues;
pub mod projects;
pub mod time_tracking;

pub use board::BoardService;
pub use issues::{IssueDetails, IssueService, NewIssue};
pub use projects::{ProjectFields, ProjectService, SpaceFields};
pub use time_tracking::{NewWorklog, TimeTracker, UserWorklog};
