//! Optimistic board state for drag-and-drop reordering.
//!
//! A board holds every issue of one project in a single list ordered by
//! rank. While a card is dragged the list is rearranged provisionally; on
//! drop the column the card landed in is re-ranked `0..n` and the result
//! is returned as a batch of [`OrderUpdate`]s. Other columns are untouched.

use super::issue::{Issue, IssueId};
use serde::{Deserialize, Serialize};

/// One per-issue write produced by a column commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: IssueId,
    pub order: u32,
    pub status: String,
}

/// Where a dragged card is currently hovering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Issue(IssueId),
    Column(String),
}

/// Project board as seen by the dragging client
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    issues: Vec<Issue>,
    /// Set once the active card has moved since the last commit
    dragged: bool,
}

impl BoardState {
    /// Builds the board from a project's issues, sorted by rank.
    ///
    /// The sort is stable, so issues sharing a rank keep their input order.
    pub fn new(mut issues: Vec<Issue>) -> Self {
        issues.sort_by_key(|issue| issue.order);
        Self {
            issues,
            dragged: false,
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Issues of one column in display order
    pub fn column(&self, status: &str) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.status == status).collect()
    }

    pub fn find(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.iter().find(|i| &i.id == id)
    }

    fn index_of(&self, id: &IssueId) -> Option<usize> {
        self.issues.iter().position(|i| &i.id == id)
    }

    /// Provisional move while dragging. Returns whether anything changed
    pub fn drag_over(&mut self, active: &IssueId, target: &DropTarget) -> bool {
        match target {
            DropTarget::Issue(over) => self.drag_over_issue(active, over),
            DropTarget::Column(status) => self.drag_over_column(active, status),
        }
    }

    /// Takes the hovered card's column and splices the active card into its slot
    pub fn drag_over_issue(&mut self, active: &IssueId, over: &IssueId) -> bool {
        if active == over {
            return false;
        }
        let (Some(from), Some(to)) = (self.index_of(active), self.index_of(over)) else {
            return false;
        };

        let over_status = self.issues[to].status.clone();
        if self.issues[from].status != over_status {
            self.issues[from].status = over_status;
        }

        let moving = self.issues.remove(from);
        self.issues.insert(to, moving);
        self.dragged = true;
        true
    }

    /// Hovering an empty column area only changes the card's status
    pub fn drag_over_column(&mut self, active: &IssueId, status: &str) -> bool {
        match self.index_of(active) {
            Some(idx) if self.issues[idx].status != status => {
                self.issues[idx].status = status.to_string();
                self.dragged = true;
                true
            }
            _ => false,
        }
    }

    /// Finishes a drag gesture on `target`.
    ///
    /// A card that never left its slot, including one dropped on itself,
    /// produces an empty batch and keeps every rank as it was. Otherwise the
    /// column it landed in is committed.
    pub fn drop_on(&mut self, active: &IssueId, target: &DropTarget) -> Vec<OrderUpdate> {
        self.drag_over(active, target);
        if !self.dragged {
            return Vec::new();
        }
        self.commit(active)
    }

    /// Re-ranks the column the active card now sits in.
    ///
    /// Every card of that column gets `order = index` and the column's
    /// status, both locally and in the returned batch.
    pub fn commit(&mut self, active: &IssueId) -> Vec<OrderUpdate> {
        self.dragged = false;
        let Some(idx) = self.index_of(active) else {
            return Vec::new();
        };
        let target_status = self.issues[idx].status.clone();

        let mut updates = Vec::new();
        let mut rank = 0u32;
        for issue in self.issues.iter_mut().filter(|i| i.status == target_status) {
            issue.order = rank;
            updates.push(OrderUpdate {
                id: issue.id.clone(),
                order: rank,
                status: target_status.clone(),
            });
            rank += 1;
        }
        updates
    }

    /// Moves a card to `position` within `target_status` and commits that column.
    ///
    /// Positions past the end append. Returns `None` when the card is
    /// missing or already sits at that spot.
    pub fn move_issue(
        &mut self,
        id: &IssueId,
        target_status: &str,
        position: usize,
    ) -> Option<Vec<OrderUpdate>> {
        let from = self.index_of(id)?;

        let current_slot = self
            .issues
            .iter()
            .filter(|i| i.status == target_status)
            .position(|i| &i.id == id);
        let column_len = self.column(target_status).len();
        if let Some(slot) = current_slot {
            if slot == position.min(column_len.saturating_sub(1)) {
                return None;
            }
        }

        let mut moving = self.issues.remove(from);
        moving.status = target_status.to_string();

        let insert_at = self.global_index_for(target_status, position);
        self.issues.insert(insert_at, moving);
        Some(self.commit(id))
    }

    /// Index in the flat list that lands a card at `position` within a column
    fn global_index_for(&self, status: &str, position: usize) -> usize {
        let mut seen = 0;
        let mut last_in_column = None;
        for (idx, issue) in self.issues.iter().enumerate() {
            if issue.status != status {
                continue;
            }
            if seen == position {
                return idx;
            }
            seen += 1;
            last_in_column = Some(idx);
        }
        last_in_column.map_or(self.issues.len(), |idx| idx + 1)
    }
}
