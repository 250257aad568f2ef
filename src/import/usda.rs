//! Client for the USDA FoodData Central search endpoint.
//!
//! Search results are mapped into [`FoodDraft`]s with a 100 g serving, the
//! basis FoodData Central reports nutrients on.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::draft::FoodDraft;
use crate::config::UsdaConfig;
use crate::error::CoreError;

const PAGE_SIZE: &str = "20";
const DATA_TYPES: &str = "Foundation,Branded";

/// A searchable source of public food data.
#[async_trait]
pub trait PublicFoodSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<FoodDraft>, UsdaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UsdaError {
    #[error("USDA_API_KEY environment variable is not set")]
    MissingApiKey,

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("USDA API error: {status} - {body}")]
    Api { status: u16, body: String },
}

impl From<UsdaError> for CoreError {
    fn from(e: UsdaError) -> Self {
        CoreError::Upstream(format!("Failed to search foods: {e}"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    description: String,
    #[serde(default)]
    brand_owner: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<UsdaNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsdaNutrient {
    nutrient_name: String,
    #[serde(default)]
    value: Option<f64>,
}

impl SearchResult {
    /// First nutrient with exactly this name; absent counts as zero.
    fn nutrient(&self, name: &str) -> f64 {
        self.food_nutrients
            .iter()
            .find(|n| n.nutrient_name == name)
            .and_then(|n| n.value)
            .unwrap_or(0.0)
    }

    fn into_draft(self) -> FoodDraft {
        FoodDraft {
            calories: Some(self.nutrient("Energy")),
            protein: Some(self.nutrient("Protein")),
            fat: Some(self.nutrient("Total lipid (fat)")),
            carbs: Some(self.nutrient("Carbohydrate, by difference")),
            fiber: Some(self.nutrient("Total dietary fiber")),
            sugar: Some(self.nutrient("Total Sugars")),
            name: Some(self.description),
            brand: self.brand_owner,
            description: None,
            image: None,
            serving_size: Some(100.0),
            serving_unit: Some("g".into()),
        }
    }
}

/// Maps a raw search response, dropping candidates without macro data.
fn drafts_from(response: SearchResponse) -> Vec<FoodDraft> {
    response
        .foods
        .into_iter()
        .map(SearchResult::into_draft)
        .filter(FoodDraft::has_macro_data)
        .collect()
}

pub struct UsdaClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl UsdaClient {
    pub fn new(config: &UsdaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl PublicFoodSource for UsdaClient {
    async fn search(&self, query: &str) -> Result<Vec<FoodDraft>, UsdaError> {
        let api_key = self.api_key.as_deref().ok_or(UsdaError::MissingApiKey)?;

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("api_key", api_key),
                ("query", query),
                ("pageSize", PAGE_SIZE),
                ("dataType", DATA_TYPES),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".into());
            warn!(status = status.as_u16(), "usda search failed");
            return Err(UsdaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: SearchResponse = response.json().await?;
        let drafts = drafts_from(data);
        debug!(query, results = drafts.len(), "usda search");
        Ok(drafts)
    }
}
