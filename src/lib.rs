//! # Taskboard Core
//!
//! Domain logic for a multi-project kanban tracker.
//!
//! Two pieces carry real invariants: time accounting, which keeps an
//! issue's spent and remaining minutes consistent with its worklogs, and
//! board ordering, which re-ranks a column whenever a card is dropped into
//! it. Everything runs against the [`Storage`] trait with the acting user
//! passed in explicitly through [`AuthContext`].

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use auth::AuthContext;
pub use config::{Config, StorageBackend};
pub use domain::{
    board::{BoardState, DropTarget, OrderUpdate},
    duration::{format_duration, parse_duration, parse_duration_strict},
    issue::{Issue, IssueId, IssueType, Priority, UserId, Worklog, WorklogId},
    project::{Project, ProjectId, Space, SpaceId, StatusColumn},
};
pub use error::{Result, TaskboardError};
pub use service::{BoardService, IssueService, ProjectService, TimeTracker};
pub use storage::Storage;
