use crate::task::{has_reason, Kwork, Status};
use chrono::{DateTime, Local};

/// The three display columns, borrowed from the cache.
#[derive(Debug, Default, PartialEq)]
pub struct Groups<'a> {
    pub new: Vec<&'a Kwork>,
    pub rejected: Vec<&'a Kwork>,
    pub favorite: Vec<&'a Kwork>,
}

impl<'a> Groups<'a> {
    pub fn get(&self, status: Status) -> &[&'a Kwork] {
        match status {
            Status::New => &self.new,
            Status::Rejected => &self.rejected,
            Status::Favorite => &self.favorite,
        }
    }
}

pub fn in_group(task: &Kwork, group: Status) -> bool {
    match group {
        Status::Rejected => has_reason(&task.reason) && task.status() != Status::Favorite,
        Status::New => !has_reason(&task.reason) && task.status() == Status::New,
        Status::Favorite => task.status() == Status::Favorite,
    }
}

pub fn groups_of(tasks: &[Kwork]) -> Groups<'_> {
    Groups {
        new: tasks.iter().filter(|t| in_group(t, Status::New)).collect(),
        rejected: tasks.iter().filter(|t| in_group(t, Status::Rejected)).collect(),
        favorite: tasks.iter().filter(|t| in_group(t, Status::Favorite)).collect(),
    }
}

/// In-memory cache of the remote list plus the board selection.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub tasks: Vec<Kwork>,
    pub selected_status: usize,
    pub selected_task: usize,
    /// Load failure shown as a banner until the next successful load
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Local>>,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, tasks: Vec<Kwork>) {
        tracing::info!(count = tasks.len(), "cache replaced");
        self.tasks = tasks;
        self.error = None;
        self.loaded_at = Some(Local::now());
        self.clamp_selection();
    }

    pub fn load_failed(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn apply_created(&mut self, task: Kwork) {
        tracing::debug!(id = task.id, "append");
        self.tasks.push(task);
    }

    pub fn apply_updated(&mut self, task: Kwork) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                tracing::debug!(id = task.id, "replace");
                *slot = task;
            }
            None => tracing::warn!(id = task.id, "updated record not in cache"),
        }
        self.clamp_selection();
    }

    pub fn apply_removed(&mut self, id: u64) {
        self.tasks.retain(|t| t.id != id);
        self.clamp_selection();
    }

    pub fn groups(&self) -> Groups<'_> {
        groups_of(&self.tasks)
    }

    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Kwork> {
        self.tasks.iter().filter(|t| in_group(t, status)).collect()
    }

    /// Moves the card at `from` to `to` inside `group`.
    ///
    /// The cache becomes every task outside the group followed by the
    /// reordered group. Returns false and leaves the cache alone when there is
    /// no destination or `from` is out of range.
    pub fn reorder(&mut self, group: Status, from: usize, to: Option<usize>) -> bool {
        let Some(to) = to else {
            return false;
        };
        if from >= self.get_tasks_by_status(group).len() {
            return false;
        }

        let (mut items, rest): (Vec<Kwork>, Vec<Kwork>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| in_group(t, group));

        let moved = items.remove(from);
        let to = to.min(items.len());
        items.insert(to, moved);

        self.tasks = rest;
        self.tasks.extend(items);
        true
    }

    pub fn selected_column(&self) -> Status {
        Status::ALL[self.selected_status.min(Status::ALL.len() - 1)]
    }

    pub fn selected(&self) -> Option<&Kwork> {
        self.get_tasks_by_status(self.selected_column())
            .get(self.selected_task)
            .copied()
    }

    pub fn move_column(&mut self, direction: isize) {
        self.selected_status = (self.selected_status as isize + direction)
            .clamp(0, Status::ALL.len() as isize - 1) as usize;
        self.clamp_selection();
    }

    pub fn move_selection(&mut self, direction: isize) {
        let len = self.get_tasks_by_status(self.selected_column()).len();
        if len == 0 {
            self.selected_task = 0;
            return;
        }
        self.selected_task =
            (self.selected_task as isize + direction).clamp(0, len as isize - 1) as usize;
    }

    pub fn select(&mut self, status: Status, index: usize) {
        self.selected_status = status.index();
        self.selected_task = index;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.get_tasks_by_status(self.selected_column()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }
}
