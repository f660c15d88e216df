//! JSON file store.
//!
//! The whole store is one JSON document, rewritten on every create through a
//! sibling temp file and a rename so a crash never leaves a half-written file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ResponseStore;
use crate::error::{Result, SurveyError};
use crate::response::SurveyResponse;
use crate::submission::ValidResponse;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    next_id: u64,
    responses: Vec<SurveyResponse>,
}

/// Responses kept in a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file missing, starting empty");
                return Ok(StoreDocument {
                    next_id: 1,
                    responses: Vec::new(),
                });
            }
            Err(e) => {
                return Err(SurveyError::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let mut document: StoreDocument = serde_json::from_str(&content).map_err(|e| {
            SurveyError::storage(format!("Corrupt store {}: {}", self.path.display(), e))
        })?;

        let highest = document.responses.iter().map(|r| r.id).max().unwrap_or(0);
        document.next_id = document.next_id.max(highest + 1);
        Ok(document)
    }

    fn save(&self, document: &StoreDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| SurveyError::storage(format!("Failed to encode store: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                SurveyError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            SurveyError::storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            SurveyError::storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

impl ResponseStore for JsonFileStore {
    fn create(&mut self, response: ValidResponse) -> Result<SurveyResponse> {
        let mut document = self.load()?;

        let id = document.next_id;
        let record = response.into_record(id, Utc::now());
        document.next_id = id + 1;
        document.responses.push(record.clone());

        self.save(&document)?;
        info!(id, path = %self.path.display(), "Response written to store");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<SurveyResponse>> {
        Ok(self.load()?.responses)
    }

    fn get(&self, id: u64) -> Result<SurveyResponse> {
        self.load()?
            .responses
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(SurveyError::NotFound(id))
    }
}
