//! Lead persistence.
//!
//! Stores are injected into the HTTP layer and only ever see a finished
//! projection; nothing in `core` knows they exist.

mod rest;

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{HorizonYears, Projection, RiskProfile, ScenarioTier, Submission};

pub use rest::RestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store rejected the record with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("store did not answer within {0} ms")]
    Timeout(u128),
    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

/// One row in the calculations table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    pub age: u32,
    pub current_investment: f64,
    pub monthly_investment: f64,
    pub profile: RiskProfile,
    pub years_real: HorizonYears,
    pub years_optimized: HorizonYears,
    pub scenario: ScenarioTier,
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    pub fn new(submission: &Submission, projection: &Projection) -> Self {
        Self::with_identity(submission, projection, Uuid::new_v4(), Utc::now())
    }

    pub fn with_identity(
        submission: &Submission,
        projection: &Projection,
        id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        CalculationRecord {
            id,
            name: submission.name.clone(),
            email: submission.email.clone(),
            whatsapp: submission.whatsapp.clone(),
            age: submission.age,
            current_investment: submission.starting_capital,
            monthly_investment: submission.monthly_contribution,
            profile: submission.profile,
            years_real: projection.result.baseline_years,
            years_optimized: projection.result.optimized_years,
            scenario: projection.result.tier,
            created_at,
        }
    }
}

#[async_trait]
pub trait CalculationStore: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn save(&self, record: &CalculationRecord) -> Result<(), StoreError>;
}

/// Keeps records in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CalculationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CalculationRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl CalculationStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, record: &CalculationRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluate;
    use chrono::TimeZone;

    fn sample_submission() -> Submission {
        Submission {
            name: "Beatriz".to_string(),
            age: 41,
            starting_capital: 0.0,
            monthly_contribution: 0.0,
            profile: RiskProfile::Conservative,
            email: Some("bia@example.com".to_string()),
            whatsapp: None,
        }
    }

    #[test]
    fn record_serializes_table_columns_and_null_for_unreachable() {
        let submission = sample_submission();
        let projection = evaluate(&submission);
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record =
            CalculationRecord::with_identity(&submission, &projection, Uuid::nil(), created_at);

        let json = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Beatriz");
        assert_eq!(json["email"], "bia@example.com");
        assert!(json.get("whatsapp").is_none());
        assert_eq!(json["age"], 41);
        assert_eq!(json["profile"], "conservative");
        assert_eq!(json["scenario"], "iniciante");
        assert!(json["years_real"].is_null());
        assert!(json["years_optimized"].is_null());
        assert_eq!(json["created_at"], "2026-03-01T12:00:00Z");
    }

    #[test]
    fn new_records_get_distinct_ids() {
        let submission = sample_submission();
        let projection = evaluate(&submission);
        let a = CalculationRecord::new(&submission, &projection);
        let b = CalculationRecord::new(&submission, &projection);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn memory_store_keeps_saved_records() {
        let store = MemoryStore::new();
        let submission = sample_submission();
        let record = CalculationRecord::new(&submission, &evaluate(&submission));

        store.save(&record).await.expect("save should succeed");
        assert_eq!(store.records(), vec![record]);
        assert_eq!(store.name(), "memory");
    }
}
