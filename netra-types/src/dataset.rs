use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::time::now_timestamp;

/// Store-assigned dataset identity.
pub type DatasetId = i64;

/// Risk level stored until a report step assigns a real one.
pub const RISK_NOT_COMPUTED: &str = "Run Report to Generate";

/// Separator used for the original-files audit trail column.
const FILES_SEPARATOR: char = ';';

/// One ingested batch of scan results for a company/client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// `None` until the dataset has been persisted.
    pub id: Option<DatasetId>,
    pub company_name: String,
    pub scan_date: NaiveDate,
    pub total_assets: usize,
    /// Assets with at least one open port.
    pub active_assets: usize,
    /// Ranked, comma-joined list of the most frequent services.
    pub all_services: String,
    pub scans_processed: usize,
    pub risk_level: String,
    pub last_modified: NaiveDateTime,
    pub file_notes: String,
    /// Source file paths, kept for auditing only.
    pub original_files: Vec<String>,
    pub created_date: NaiveDateTime,
}

impl Dataset {
    /// A fresh, unsaved dataset stamped with the current time.
    pub fn new(company_name: impl Into<String>, scan_date: NaiveDate) -> Self {
        let now = now_timestamp();
        Self {
            id: None,
            company_name: company_name.into(),
            scan_date,
            total_assets: 0,
            active_assets: 0,
            all_services: String::new(),
            scans_processed: 0,
            risk_level: RISK_NOT_COMPUTED.to_string(),
            last_modified: now,
            file_notes: String::new(),
            original_files: Vec::new(),
            created_date: now,
        }
    }

    /// Whether a report step has replaced the placeholder risk level.
    pub fn risk_computed(&self) -> bool {
        let risk = self.risk_level.trim();
        !risk.is_empty() && risk != RISK_NOT_COMPUTED
    }

    pub fn original_files_joined(&self) -> String {
        self.original_files.join(&FILES_SEPARATOR.to_string())
    }

    /// Inverse of [`original_files_joined`](Self::original_files_joined).
    pub fn split_original_files(joined: &str) -> Vec<String> {
        joined
            .split(FILES_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}
