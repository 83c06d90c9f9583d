//! Non-interactive `list` and `stats` commands.

use crate::error::StoreError;
use crate::kanban_board::{groups_of, Groups};
use crate::store::KworkStore;
use crate::task::{Kwork, Status};

fn card_line(status: Status, task: &Kwork) -> String {
    let reason = if status == Status::Rejected {
        format!(" - {}", task.reason)
    } else {
        String::new()
    };
    format!(
        "- [#{}] {} ({} ₽){} {}\n",
        task.id, task.title, task.price, reason, task.link
    )
}

pub fn format_list(groups: &Groups<'_>) -> String {
    Status::ALL
        .iter()
        .map(|status| {
            let cards: String = groups
                .get(*status)
                .iter()
                .map(|task| card_line(*status, task))
                .collect();
            format!("{}:\n{}", status.title(), cards)
        })
        .collect()
}

pub fn format_stats(groups: &Groups<'_>) -> String {
    Status::ALL
        .iter()
        .map(|status| format!("{}: {}\n", status.as_str(), groups.get(*status).len()))
        .collect()
}

pub fn list_tasks(store: &dyn KworkStore) -> Result<(), StoreError> {
    let tasks = store.list()?;
    print!("{}", format_list(&groups_of(&tasks)));
    Ok(())
}

pub fn show_stats(store: &dyn KworkStore) -> Result<(), StoreError> {
    let tasks = store.list()?;
    print!("{}", format_stats(&groups_of(&tasks)));
    Ok(())
}
