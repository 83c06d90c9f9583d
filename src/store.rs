//! REST store for kwork records.
//!
//! `GET/POST /kwork`, `PATCH/DELETE /kwork/{id}`, JSON both ways.

use std::time::Duration;

use serde::Serialize;

use crate::error::StoreError;
use crate::task::{Kwork, Status};

/// Body of `POST /kwork`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewKwork {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub link: String,
    pub status: Status,
    pub reason: String,
}

/// Body of `PATCH /kwork/{id}`; unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KworkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl KworkPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Remote source of truth for kwork records.
pub trait KworkStore: Send + Sync {
    fn list(&self) -> Result<Vec<Kwork>, StoreError>;
    fn create(&self, kwork: &NewKwork) -> Result<Kwork, StoreError>;
    fn update(&self, id: u64, patch: &KworkPatch) -> Result<Kwork, StoreError>;
    fn delete(&self, id: u64) -> Result<(), StoreError>;
}

pub struct HttpStore {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/kwork", self.base_url)
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/kwork/{}", self.base_url, id)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T, StoreError> {
    response.into_json().map_err(StoreError::Decode)
}

impl KworkStore for HttpStore {
    fn list(&self) -> Result<Vec<Kwork>, StoreError> {
        let url = self.collection_url();
        tracing::debug!(%url, "GET");
        let response = self.agent.get(&url).call()?;
        read_json(response)
    }

    fn create(&self, kwork: &NewKwork) -> Result<Kwork, StoreError> {
        let url = self.collection_url();
        tracing::debug!(%url, "POST");
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(kwork)?;
        read_json(response)
    }

    fn update(&self, id: u64, patch: &KworkPatch) -> Result<Kwork, StoreError> {
        let url = self.item_url(id);
        tracing::debug!(%url, "PATCH");
        let response = self
            .agent
            .request("PATCH", &url)
            .set("Content-Type", "application/json")
            .send_json(patch)?;
        read_json(response)
    }

    fn delete(&self, id: u64) -> Result<(), StoreError> {
        let url = self.item_url(id);
        tracing::debug!(%url, "DELETE");
        self.agent
            .delete(&url)
            .set("Content-Type", "application/json")
            .call()?;
        Ok(())
    }
}
