use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::UsdaConfig;

/// Search results are capped at one page of this size; the upstream API
/// allows up to 200 but the clients only ever render the first screen.
const SEARCH_PAGE_SIZE: u32 = 25;

#[derive(Debug, Error)]
pub enum FoodLookupError {
    #[error("food database returned HTTP {0}")]
    Status(u16),
    #[error("food database request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Detail record for a single food, as returned by the FoodData Central
/// per-id endpoint. Only the fields the diary needs are decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand_owner: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodNutrient {
    #[serde(default)]
    pub nutrient: Option<NutrientInfo>,
    /// Amount per 100 units (g or ml) of the food.
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NutrientInfo {
    #[serde(default)]
    pub name: String,
}

/// Outbound lookups against the external nutrition database. A trait seam
/// so the diary service can run against a canned client in tests.
#[async_trait]
pub trait FoodDataClient: Send + Sync {
    /// Text search. Returns the raw food records untouched; callers decide
    /// what to show. `query` is assumed non-empty (handlers check).
    async fn search_foods(&self, query: &str) -> Result<Vec<serde_json::Value>, FoodLookupError>;

    /// Fetch the detail record for one food by its FDC id.
    async fn fetch_food(&self, fdc_id: i64) -> Result<FoodRecord, FoodLookupError>;
}

/// USDA FoodData Central client. No caching, no rate limiting, no retries:
/// a failing upstream call fails only the request that made it.
pub struct UsdaClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl UsdaClient {
    pub fn new(config: &UsdaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<serde_json::Value>,
}

#[async_trait]
impl FoodDataClient for UsdaClient {
    async fn search_foods(&self, query: &str) -> Result<Vec<serde_json::Value>, FoodLookupError> {
        let url = format!("{}/foods/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query.to_string()),
                ("pageSize", SEARCH_PAGE_SIZE.to_string()),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FoodLookupError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        debug!(query, count = body.foods.len(), "food search completed");
        Ok(body.foods)
    }

    async fn fetch_food(&self, fdc_id: i64) -> Result<FoodRecord, FoodLookupError> {
        let url = format!("{}/food/{fdc_id}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FoodLookupError::Status(status.as_u16()));
        }

        let record: FoodRecord = response.json().await?;
        debug!(fdc_id, description = ?record.description, "food details fetched");
        Ok(record)
    }
}

/// Canned client for tests: a couple of known foods, 404 for the rest.
#[cfg(test)]
pub struct FakeFoodData {
    foods: std::collections::HashMap<i64, FoodRecord>,
}

#[cfg(test)]
impl FakeFoodData {
    pub fn new() -> Self {
        let nutrient = |name: &str, amount: f64| FoodNutrient {
            nutrient: Some(NutrientInfo { name: name.into() }),
            amount: Some(amount),
        };

        let mut foods = std::collections::HashMap::new();
        foods.insert(
            171_688,
            FoodRecord {
                description: Some("Apples, raw, with skin".into()),
                brand_owner: None,
                food_nutrients: vec![
                    nutrient("Energy", 52.0),
                    nutrient("Protein", 0.26),
                    nutrient("Carbohydrate, by difference", 13.81),
                    nutrient("Total lipid (fat)", 0.17),
                    nutrient("Fiber, total dietary", 2.4),
                    nutrient("Sugars, total including NLEA", 10.39),
                    nutrient("Sodium, Na", 1.0),
                ],
            },
        );
        foods.insert(
            171_477,
            FoodRecord {
                description: Some("Chicken, breast, meat only, cooked, roasted".into()),
                brand_owner: None,
                food_nutrients: vec![
                    nutrient("Energy", 165.0),
                    nutrient("Protein", 31.02),
                    nutrient("Total lipid (fat)", 3.57),
                ],
            },
        );
        Self { foods }
    }
}

#[cfg(test)]
#[async_trait]
impl FoodDataClient for FakeFoodData {
    async fn search_foods(&self, query: &str) -> Result<Vec<serde_json::Value>, FoodLookupError> {
        let query = query.to_lowercase();
        Ok(self
            .foods
            .iter()
            .filter(|(_, record)| {
                record
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query))
            })
            .map(|(fdc_id, record)| {
                serde_json::json!({ "fdcId": fdc_id, "description": record.description })
            })
            .collect())
    }

    async fn fetch_food(&self, fdc_id: i64) -> Result<FoodRecord, FoodLookupError> {
        self.foods
            .get(&fdc_id)
            .cloned()
            .ok_or(FoodLookupError::Status(404))
    }
}
