//! Shared create/edit dialog state.

use thiserror::Error;

use crate::store::{KworkPatch, NewKwork};
use crate::task::{Kwork, Status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Title,
    Link,
    Description,
    Reason,
    Price,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Link,
        Field::Description,
        Field::Reason,
        Field::Price,
    ];

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Title => "Заголовок задачи",
            Field::Link => "Ссылка",
            Field::Description => "Описание задачи",
            Field::Reason => "Причина отказа (если есть)",
            Field::Price => "Бюджет ₽",
        }
    }

    fn position(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Field::ALL[(self.position() + 1) % Field::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Field::ALL[(self.position() + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Заполните все поля")]
    MissingFields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(NewKwork),
    Update { id: u64, patch: KworkPatch },
}

/// Pending values of the dialog. `editing_id` is `None` in create mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KworkForm {
    pub editing_id: Option<u64>,
    pub title: String,
    pub link: String,
    pub description: String,
    pub reason: String,
    pub price: String,
    pub favorite: bool,
    pub status: Status,
    pub focus: Field,
}

impl KworkForm {
    pub fn for_create() -> Self {
        Self::default()
    }

    pub fn for_edit(kwork: &Kwork) -> Self {
        Self {
            editing_id: Some(kwork.id),
            title: kwork.title.clone(),
            link: kwork.link.clone(),
            description: kwork.description.clone(),
            reason: kwork.reason.clone(),
            price: kwork.price.to_string(),
            favorite: kwork.favorite,
            status: kwork.status(),
            focus: Field::default(),
        }
    }

    pub fn is_create(&self) -> bool {
        self.editing_id.is_none()
    }

    pub fn title_text(&self) -> &'static str {
        if self.is_create() {
            "Создание новой задачи"
        } else {
            "Редактирование задачи"
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Link => &self.link,
            Field::Description => &self.description,
            Field::Reason => &self.reason,
            Field::Price => &self.price,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::Reason => &mut self.reason,
            Field::Price => &mut self.price,
        }
    }

    /// Reason edits drive the pending status; favorite still wins.
    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
        self.status = Status::derive(&self.reason, self.favorite);
    }

    pub fn insert_char(&mut self, c: char) {
        let field = self.focus;
        if field == Field::Reason {
            let mut reason = std::mem::take(&mut self.reason);
            reason.push(c);
            self.set_reason(reason);
        } else {
            self.value_mut(field).push(c);
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focus;
        if field == Field::Reason {
            let mut reason = std::mem::take(&mut self.reason);
            reason.pop();
            self.set_reason(reason);
        } else {
            self.value_mut(field).pop();
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Required-field check, then the request body for the current mode.
    pub fn validate(&self) -> Result<Submission, ValidationError> {
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p != 0.0);

        if self.title.is_empty() || self.description.is_empty() || self.link.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        let Some(price) = price else {
            return Err(ValidationError::MissingFields);
        };

        let submission = match self.editing_id {
            None => Submission::Create(NewKwork {
                title: self.title.clone(),
                description: self.description.clone(),
                price,
                link: self.link.clone(),
                status: self.status,
                reason: self.reason.clone(),
            }),
            Some(id) => Submission::Update {
                id,
                patch: KworkPatch {
                    title: Some(self.title.clone()),
                    description: Some(self.description.clone()),
                    price: Some(price),
                    status: Some(self.status),
                    link: Some(self.link.clone()),
                    reason: Some(self.reason.clone()),
                },
            },
        };
        Ok(submission)
    }
}
