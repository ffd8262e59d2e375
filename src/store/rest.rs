use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use super::{CalculationRecord, CalculationStore, StoreError};
use crate::config::StoreConfig;

/// Inserts records into a PostgREST table (`/rest/v1/<table>`) using an
/// anonymous API key.
pub struct RestStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Self {
        RestStore {
            client: Client::new(),
            endpoint: endpoint_for(&config.url, &config.table),
            api_key: config.api_key.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint_for(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

#[async_trait]
impl CalculationStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn save(&self, record: &CalculationRecord) -> Result<(), StoreError> {
        debug!("POST {} id={}", self.endpoint, record.id);

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Stored calculation {}", record.id);
        Ok(())
    }
}
