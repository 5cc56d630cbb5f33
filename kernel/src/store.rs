//! Candidate Store: groups of labeled tasks, each with an ordered candidate list.
//!
//! Tasks are stored flat in first-seen order. A group is a contiguous range of
//! that flat list, so every task has a stable *global index* used by the
//! search layer to record per-task diagnostics.
//!
//! # Invariants
//!
//! - Every task has at least one candidate.
//! - Every group has at least one task.
//! - Group order is first-seen order; task order within a group is input order.

use std::collections::HashMap;
use std::ops::Range;

/// Separator for candidate lists supplied as a single string (`"Paris|Lyon"`).
pub const CANDIDATE_DELIMITER: char = '|';

/// Typed failure while normalizing raw input into a [`CandidateStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A task ended up with no candidates (neither selected nor offered).
    EmptyCandidates { label: String },
    /// A group was supplied with zero tasks.
    EmptyGroup { group: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCandidates { label } => {
                write!(f, "task {label:?} has no candidates")
            }
            Self::EmptyGroup { group } => write!(f, "group {group:?} has no tasks"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A label with its ordered candidate values. Exactly one candidate is
/// authoritative; the store does not know which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    label: String,
    candidates: Vec<String>,
}

impl Task {
    /// Construct a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCandidates`] if `candidates` is empty.
    pub fn new(label: impl Into<String>, candidates: Vec<String>) -> Result<Self, StoreError> {
        let label = label.into();
        if candidates.is_empty() {
            return Err(StoreError::EmptyCandidates { label });
        }
        Ok(Self { label, candidates })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Number of candidates (the task's odometer base).
    #[must_use]
    pub fn base(&self) -> usize {
        self.candidates.len()
    }
}

/// A raw input row: one task tagged with the group it belongs to.
///
/// `selected` is the caller's narrowed choice. An empty selection means
/// "no preference" and the full `offered` list stands in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub group: String,
    pub label: String,
    pub offered: Vec<String>,
    pub selected: Vec<String>,
}

impl TaskRow {
    /// Row with no narrowed selection.
    #[must_use]
    pub fn new(group: impl Into<String>, label: impl Into<String>, offered: Vec<String>) -> Self {
        Self {
            group: group.into(),
            label: label.into(),
            offered,
            selected: Vec::new(),
        }
    }

    /// Row whose candidate lists are pipe-delimited strings.
    #[must_use]
    pub fn from_delimited(group: &str, label: &str, offered: &str, selected: &str) -> Self {
        Self {
            group: group.to_string(),
            label: label.to_string(),
            offered: split_candidates(offered),
            selected: split_candidates(selected),
        }
    }

    /// The candidates this row contributes to the search.
    #[must_use]
    pub fn effective_candidates(&self) -> &[String] {
        if self.selected.is_empty() {
            &self.offered
        } else {
            &self.selected
        }
    }
}

/// Split a pipe-delimited candidate list. Empty segments are dropped, so
/// `""` yields an empty list.
#[must_use]
pub fn split_candidates(raw: &str) -> Vec<String> {
    raw.split(CANDIDATE_DELIMITER)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A group: the unit of subset selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: String,
    tasks: Range<usize>,
}

impl Group {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Global task indices belonging to this group.
    #[must_use]
    pub fn task_range(&self) -> Range<usize> {
        self.tasks.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Normalized search input: tasks grouped for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStore {
    tasks: Vec<Task>,
    groups: Vec<Group>,
    /// Group index of every task, parallel to `tasks`.
    task_group: Vec<usize>,
}

impl CandidateStore {
    /// Group flat rows by group id, preserving first-seen group order and
    /// within-group row order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCandidates`] if any row has no effective
    /// candidates.
    pub fn from_rows(rows: &[TaskRow]) -> Result<Self, StoreError> {
        let mut order: Vec<&str> = Vec::new();
        let mut members: HashMap<&str, Vec<&TaskRow>> = HashMap::new();
        for row in rows {
            let bucket = members.entry(row.group.as_str()).or_insert_with(|| {
                order.push(row.group.as_str());
                Vec::new()
            });
            bucket.push(row);
        }

        let mut builder = StoreBuilder::default();
        for id in order {
            let group_rows = members.remove(id).unwrap_or_default();
            let tasks = group_rows
                .into_iter()
                .map(|row| Task::new(row.label.clone(), row.effective_candidates().to_vec()))
                .collect::<Result<Vec<_>, _>>()?;
            builder.push_group(id.to_string(), tasks)?;
        }
        Ok(builder.finish())
    }

    /// Build from already-grouped `(label, candidates)` pairs. Group ids are
    /// the 1-based group positions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a group has no tasks or a task has no candidates.
    pub fn from_groups<L, C>(groups: Vec<Vec<(L, Vec<C>)>>) -> Result<Self, StoreError>
    where
        L: Into<String>,
        C: Into<String>,
    {
        let mut builder = StoreBuilder::default();
        for (i, group) in groups.into_iter().enumerate() {
            let tasks = group
                .into_iter()
                .map(|(label, candidates)| {
                    Task::new(label, candidates.into_iter().map(Into::into).collect())
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder.push_group((i + 1).to_string(), tasks)?;
        }
        Ok(builder.finish())
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// All tasks in global index order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Task by global index.
    #[must_use]
    pub fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    /// Tasks of one group.
    #[must_use]
    pub fn group_tasks(&self, group: usize) -> &[Task] {
        &self.tasks[self.groups[group].task_range()]
    }

    /// Group index owning the task at `task_index`.
    #[must_use]
    pub fn group_of(&self, task_index: usize) -> usize {
        self.task_group[task_index]
    }

    /// Candidate counts per task, grouped. The estimator only needs shape.
    #[must_use]
    pub fn shape(&self) -> Vec<Vec<usize>> {
        (0..self.group_count())
            .map(|g| self.group_tasks(g).iter().map(Task::base).collect())
            .collect()
    }
}

#[derive(Default)]
struct StoreBuilder {
    tasks: Vec<Task>,
    groups: Vec<Group>,
    task_group: Vec<usize>,
}

impl StoreBuilder {
    fn push_group(&mut self, id: String, tasks: Vec<Task>) -> Result<(), StoreError> {
        if tasks.is_empty() {
            return Err(StoreError::EmptyGroup { group: id });
        }
        let start = self.tasks.len();
        let group_index = self.groups.len();
        self.task_group
            .extend(std::iter::repeat(group_index).take(tasks.len()));
        self.tasks.extend(tasks);
        self.groups.push(Group {
            id,
            tasks: start..self.tasks.len(),
        });
        Ok(())
    }

    fn finish(self) -> CandidateStore {
        CandidateStore {
            tasks: self.tasks,
            groups: self.groups,
            task_group: self.task_group,
        }
    }
}
