//! Storage backends for survey responses.
//!
//! The survey only ever creates and reads responses; there is no update and
//! no delete. Every backend takes a [`ValidResponse`] on `create`, so
//! admission cannot be bypassed by talking to a store directly.
//!
//! - `file` - JSON document on local disk
//! - `http` - the survey REST API
//! - `MemoryStore` - in-process, for tests and previews

mod file;
mod http;

pub use file::JsonFileStore;
pub use http::{HttpStore, HttpStoreConfig};

use chrono::Utc;

use crate::error::{Result, SurveyError};
use crate::response::SurveyResponse;
use crate::submission::ValidResponse;

/// Create/read access to stored responses
pub trait ResponseStore {
    /// Persist an admitted response and return the stored record
    fn create(&mut self, response: ValidResponse) -> Result<SurveyResponse>;

    /// All stored responses in creation order
    fn list(&self) -> Result<Vec<SurveyResponse>>;

    /// One response by id
    fn get(&self, id: u64) -> Result<SurveyResponse>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    responses: Vec<SurveyResponse>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseStore for MemoryStore {
    fn create(&mut self, response: ValidResponse) -> Result<SurveyResponse> {
        let id = self.responses.last().map_or(1, |r| r.id + 1);
        let record = response.into_record(id, Utc::now());
        self.responses.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<SurveyResponse>> {
        Ok(self.responses.clone())
    }

    fn get(&self, id: u64) -> Result<SurveyResponse> {
        self.responses
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(SurveyError::NotFound(id))
    }
}
