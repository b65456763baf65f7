use crate::domain::issue::{Issue, Priority};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting issue lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Order,
    Title,
    Priority,
    Created,
    Updated,
    Start,
    End,
    Progress,
    TimeSpent,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "order" => Ok(SortField::Order),
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            "start" => Ok(SortField::Start),
            "end" => Ok(SortField::End),
            "progress" => Ok(SortField::Progress),
            "time-spent" => Ok(SortField::TimeSpent),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: order, title, priority, created, updated, start, end, progress, time-spent",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts issues in place by the given field and direction.
///
/// The sort is stable. Issues without a start or end date always sort
/// last when sorting by that date, whichever the direction.
///
/// # Examples
/// ```
/// use taskboard_core::domain::issue::{Issue, UserId};
/// use taskboard_core::domain::project::ProjectId;
/// use taskboard_core::domain::sorting::{sort_issues, SortField, SortOrder};
///
/// let new = |title: &str| {
///     Issue::new(ProjectId::from("p1"), title.to_string(), "TODO".to_string(), UserId::from("u1"))
/// };
/// let mut issues = vec![new("b"), new("a")];
///
/// sort_issues(&mut issues, SortField::Title, SortOrder::Ascending);
/// assert_eq!(issues[0].title, "a");
/// ```
pub fn sort_issues(issues: &mut [Issue], field: SortField, order: SortOrder) {
    issues.sort_by(|a, b| {
        let directed = |cmp: Ordering| match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        };

        match field {
            SortField::Order => directed(a.order.cmp(&b.order)),
            SortField::Title => directed(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            SortField::Priority => directed(priority_rank(a.priority).cmp(&priority_rank(b.priority))),
            SortField::Created => directed(a.created_at.cmp(&b.created_at)),
            SortField::Updated => directed(a.updated_at.cmp(&b.updated_at)),
            SortField::Start => compare_option_dates(a.start_date, b.start_date, directed),
            SortField::End => compare_option_dates(a.end_date, b.end_date, directed),
            SortField::Progress => directed(
                a.progress()
                    .partial_cmp(&b.progress())
                    .unwrap_or(Ordering::Equal),
            ),
            SortField::TimeSpent => directed(a.time_spent.cmp(&b.time_spent)),
        }
    });
}

fn priority_rank(p: Priority) -> u8 {
    match p {
        Priority::Low => 0,
        Priority::Medium => 1,
        Priority::High => 2,
    }
}

/// Dated issues compare by date in the requested direction; undated ones go last
fn compare_option_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    directed: impl Fn(Ordering) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => directed(a_date.cmp(&b_date)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
