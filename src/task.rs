use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    New,
    #[serde(alias = "reason")]
    Rejected,
    Favorite,
}

impl Status {
    /// Column order on the board.
    pub const ALL: [Status; 3] = [Status::New, Status::Rejected, Status::Favorite];

    /// Favorite wins, then a non-empty reason, otherwise new.
    pub fn derive(reason: &str, favorite: bool) -> Self {
        if favorite {
            Status::Favorite
        } else if has_reason(reason) {
            Status::Rejected
        } else {
            Status::New
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Status::New => "Новые заказы",
            Status::Rejected => "Причина отказа",
            Status::Favorite => "Избранное",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Rejected => "rejected",
            Status::Favorite => "favorite",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Status::New => 0,
            Status::Rejected => 1,
            Status::Favorite => 2,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whitespace-only text counts as no reason.
pub fn has_reason(reason: &str) -> bool {
    !reason.trim().is_empty()
}

/// A tracked freelance lead.
///
/// The reason text and the favorite flag are the stored facts; the status is
/// always computed from them, see [`Kwork::status`]. On the wire the record
/// carries a `status` field which is decoded into `favorite` and re-derived on
/// the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "KworkRecord", into = "KworkRecord")]
pub struct Kwork {
    pub id: u64,
    pub link: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub reason: String,
    pub favorite: bool,
}

impl Kwork {
    pub fn status(&self) -> Status {
        Status::derive(&self.reason, self.favorite)
    }
}

#[derive(Serialize, Deserialize)]
struct KworkRecord {
    id: u64,
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    reason: Option<String>,
}

impl From<KworkRecord> for Kwork {
    fn from(record: KworkRecord) -> Self {
        Self {
            id: record.id,
            link: record.link,
            title: record.title,
            description: record.description,
            price: record.price,
            reason: record.reason.unwrap_or_default(),
            favorite: record.status == Status::Favorite,
        }
    }
}

impl From<Kwork> for KworkRecord {
    fn from(kwork: Kwork) -> Self {
        let status = kwork.status();
        Self {
            id: kwork.id,
            link: kwork.link,
            title: kwork.title,
            description: kwork.description,
            price: kwork.price,
            status,
            reason: Some(kwork.reason),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(id: u64, reason: &str, favorite: bool) -> Kwork {
    Kwork {
        id,
        link: format!("http://example.com/{}", id),
        title: format!("Task {}", id),
        description: "desc".to_string(),
        price: 1000.0,
        reason: reason.to_string(),
        favorite,
    }
}
