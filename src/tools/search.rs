use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::AgentError;

const FOOD_DATASET_ID: &str = "pet_food_products";
const SUPPLEMENT_DATASET_ID: &str = "pet_supplement_products";

/// A named external product catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Food,
    Supplement,
}

impl Dataset {
    pub fn dataset_id(&self) -> &'static str {
        match self {
            Dataset::Food => FOOD_DATASET_ID,
            Dataset::Supplement => SUPPLEMENT_DATASET_ID,
        }
    }
}

#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// One search round-trip. Any transport, status, or decoding failure is
    /// folded into `AgentError::Search`; there is no retry and no partial
    /// result.
    async fn search(
        &self,
        dataset: Dataset,
        query: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Value, AgentError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    page_number: u64,
    page_size: u64,
    dataset_id: &'static str,
    user_id: &'a str,
}

#[derive(Clone)]
pub struct HttpProductSearch {
    client: reqwest::Client,
    endpoint: String,
    user_id: String,
}

impl HttpProductSearch {
    pub fn new(cfg: &SearchConfig) -> Result<Self, AgentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", cfg.bearer_token))
                .map_err(|e| AgentError::Search(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| AgentError::Search(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            user_id: cfg.user_id.clone(),
        })
    }
}

#[async_trait]
impl ProductSearch for HttpProductSearch {
    async fn search(
        &self,
        dataset: Dataset,
        query: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Value, AgentError> {
        let request = SearchRequest {
            query,
            page_number,
            page_size,
            dataset_id: dataset.dataset_id(),
            user_id: &self.user_id,
        };

        debug!(dataset = request.dataset_id, query, "product search");
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Search(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_else(|_| "".to_string());
            return Err(AgentError::Search(format!(
                "search endpoint returned {status}: {body}"
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| AgentError::Search(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_ids_are_fixed() {
        assert_eq!(Dataset::Food.dataset_id(), "pet_food_products");
        assert_eq!(Dataset::Supplement.dataset_id(), "pet_supplement_products");
    }

    #[test]
    fn request_payload_uses_camel_case_keys() {
        let request = SearchRequest {
            query: "high fiber senior cat food",
            page_number: 1,
            page_size: 10,
            dataset_id: Dataset::Food.dataset_id(),
            user_id: "u-1",
        };
        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(payload["pageNumber"], 1);
        assert_eq!(payload["pageSize"], 10);
        assert_eq!(payload["datasetId"], "pet_food_products");
        assert_eq!(payload["userId"], "u-1");
        assert_eq!(payload["query"], "high fiber senior cat food");
    }
}
